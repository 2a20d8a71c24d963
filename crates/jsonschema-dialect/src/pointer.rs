//! JSON Pointer (RFC 6901) helpers.
//!
//! Pointers here never carry the leading `#`: the document root is the empty
//! string and children look like `/properties/name`.

use alloc::borrow::Cow;

/// Escape a reference token (`~` -> `~0`, `/` -> `~1`).
pub fn escape(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Reverse of [`escape`].
pub fn unescape(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Append one reference token to `pointer`.
pub fn push(pointer: &str, token: &str) -> String {
    format!("{pointer}/{}", escape(token))
}

/// Split a pointer into its unescaped reference tokens.
pub fn tokens(pointer: &str) -> impl Iterator<Item = Cow<'_, str>> {
    pointer
        .strip_prefix('/')
        .into_iter()
        .flat_map(|rest| rest.split('/'))
        .map(unescape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_escapes_separators() {
        assert_eq!(push("", "properties"), "/properties");
        assert_eq!(push("/properties", "a/b"), "/properties/a~1b");
        assert_eq!(push("/properties", "~x"), "/properties/~0x");
    }

    #[test]
    fn tokens_unescape() {
        let toks: Vec<_> = tokens("/properties/a~1b/~0x").collect();
        assert_eq!(toks, vec!["properties", "a/b", "~x"]);
    }

    #[test]
    fn root_has_no_tokens() {
        assert_eq!(tokens("").count(), 0);
    }

    #[test]
    fn unescape_order() {
        // `~01` is a literal `~1`, not `/`.
        assert_eq!(unescape("~01"), "~1");
    }
}
