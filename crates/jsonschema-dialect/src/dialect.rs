use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// A JSON Schema dialect, identified by its `$schema` meta-schema URL.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    /// `http://json-schema.org/draft-04/schema#`
    Draft04,
    /// `http://json-schema.org/draft-06/schema#`
    Draft06,
    /// `http://json-schema.org/draft-07/schema#`
    Draft07,
    /// `https://json-schema.org/draft/2019-09/schema`
    Draft2019_09,
    /// `https://json-schema.org/draft/2020-12/schema`
    Draft2020_12,
}

impl Dialect {
    /// The `$schema` value that identifies this dialect.
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Draft04 => "http://json-schema.org/draft-04/schema#",
            Self::Draft06 => "http://json-schema.org/draft-06/schema#",
            Self::Draft07 => "http://json-schema.org/draft-07/schema#",
            Self::Draft2019_09 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft2020_12 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Short human-readable name (`draft-07`, `2020-12`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Draft04 => "draft-04",
            Self::Draft06 => "draft-06",
            Self::Draft07 => "draft-07",
            Self::Draft2019_09 => "2019-09",
            Self::Draft2020_12 => "2020-12",
        }
    }

    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Draft04 => &["draft-04", "draft04", "draft4", "4"],
            Self::Draft06 => &["draft-06", "draft06", "draft6", "6"],
            Self::Draft07 => &["draft-07", "draft07", "draft7", "7"],
            Self::Draft2019_09 => &["2019-09", "draft-2019-09", "draft2019-09"],
            Self::Draft2020_12 => &["2020-12", "draft-2020-12", "draft2020-12"],
        }
    }

    /// Match a `$schema` value against the dialect signatures.
    ///
    /// A trailing empty fragment and the `http`/`https` distinction are
    /// ignored, so `https://json-schema.org/draft-07/schema` matches draft-07.
    pub fn from_signature(schema: &str) -> Option<Self> {
        let wanted = normalize_signature(schema);
        Self::iter().find(|d| normalize_signature(d.signature()) == wanted)
    }
}

/// Strip the scheme and any trailing `#` from a meta-schema URL.
pub(crate) fn normalize_signature(schema: &str) -> &str {
    let schema = schema.trim_end_matches('#');
    schema
        .strip_prefix("https://")
        .or_else(|| schema.strip_prefix("http://"))
        .unwrap_or(schema)
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}', expected one of: draft-04, draft-06, draft-07, 2019-09, 2020-12")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::iter()
            .find(|d| d.aliases().contains(&lower.as_str()))
            .or_else(|| Self::from_signature(s.trim()))
            .ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

impl TryFrom<String> for Dialect {
    type Error = UnknownDialect;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_round_trip() {
        for dialect in Dialect::iter() {
            assert_eq!(Dialect::from_signature(dialect.signature()), Some(dialect));
        }
    }

    #[test]
    fn signature_ignores_scheme_and_empty_fragment() {
        assert_eq!(
            Dialect::from_signature("https://json-schema.org/draft-07/schema"),
            Some(Dialect::Draft07)
        );
        assert_eq!(
            Dialect::from_signature("http://json-schema.org/draft/2020-12/schema#"),
            Some(Dialect::Draft2020_12)
        );
    }

    #[test]
    fn unknown_signature() {
        assert_eq!(
            Dialect::from_signature("https://example.com/custom-schema"),
            None
        );
    }

    #[test]
    fn parse_short_names() {
        assert_eq!("draft-04".parse(), Ok(Dialect::Draft04));
        assert_eq!("Draft7".parse(), Ok(Dialect::Draft07));
        assert_eq!("2019-09".parse(), Ok(Dialect::Draft2019_09));
        assert_eq!("2020-12".parse(), Ok(Dialect::Draft2020_12));
    }

    #[test]
    fn parse_signature_url() {
        assert_eq!(
            "http://json-schema.org/draft-06/schema#".parse(),
            Ok(Dialect::Draft06)
        );
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            "draft-03".parse::<Dialect>(),
            Err(UnknownDialect("draft-03".to_string()))
        );
    }

    #[test]
    fn display_uses_short_name() {
        assert_eq!(Dialect::Draft2019_09.to_string(), "2019-09");
    }

    #[test]
    fn deserializes_from_string() -> Result<(), serde_json::Error> {
        let dialect: Dialect = serde_json::from_str(r#""draft-07""#)?;
        assert_eq!(dialect, Dialect::Draft07);
        assert!(serde_json::from_str::<Dialect>(r#""nope""#).is_err());
        Ok(())
    }
}
