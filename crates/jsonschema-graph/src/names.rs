use std::collections::HashSet;

use jsonschema_dialect::pointer;
use url::Url;

use crate::SchemaGraph;
use crate::graph::{NodeRecord, RootRecord};

/// Keywords whose entries are named by their key; the keyword itself does
/// not contribute to a type name.
const NAMED_CONTAINERS: &[&str] = &[
    "$defs",
    "definitions",
    "properties",
    "patternProperties",
    "dependentSchemas",
    "dependencies",
];

impl<R> SchemaGraph<R> {
    /// Suggested type names for every node, in index order.
    ///
    /// Names are PascalCase, built from the root document's file name and the
    /// name-bearing segments of the node's pointer. They are unique within one
    /// iteration: a collision gets a numeric suffix starting at 2.
    pub fn type_names(&self) -> TypeNames<'_> {
        TypeNames {
            nodes: self.nodes.iter(),
            roots: &self.roots,
            used: HashSet::new(),
        }
    }
}

/// Iterator returned by [`SchemaGraph::type_names`].
#[derive(Debug)]
pub struct TypeNames<'g> {
    nodes: indexmap::map::Iter<'g, Url, NodeRecord>,
    roots: &'g [RootRecord],
    used: HashSet<String>,
}

impl<'g> Iterator for TypeNames<'g> {
    type Item = (&'g Url, String);

    fn next(&mut self) -> Option<Self::Item> {
        let (url, record) = self.nodes.next()?;
        let base = suggest_name(&self.roots[record.root.0].canonical_url, &record.pointer);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.used.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.used.insert(name.clone());
        Some((url, name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

/// Name for the node at `pointer` inside the document at `root_url`, before
/// collision handling.
pub fn suggest_name(root_url: &Url, pointer: &str) -> String {
    let mut words = vec![document_word(root_url)];
    let mut named_entry = false;
    for token in pointer::tokens(pointer) {
        if !named_entry && NAMED_CONTAINERS.contains(&token.as_ref()) {
            named_entry = true;
            continue;
        }
        named_entry = false;
        words.push(token.into_owned());
    }

    let name: String = words.iter().map(|word| pascal_case(word)).collect();
    match name.chars().next() {
        None => "Schema".to_string(),
        Some(c) if c.is_alphabetic() => name,
        Some(_) => format!("T{name}"),
    }
}

/// Last path segment of `url` up to its first `.`, or the host for URLs
/// without a path.
fn document_word(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|segment| segment.split('.').next().unwrap_or_default())
        .filter(|word| !word.is_empty())
        .or_else(|| url.host_str())
        .unwrap_or_default()
        .to_string()
}

fn pascal_case(word: &str) -> String {
    word.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn name(url: &str, pointer: &str) -> String {
        suggest_name(&Url::parse(url).unwrap(), pointer)
    }

    #[test]
    fn root_document_name() {
        assert_eq!(name("https://example.com/schemas/person.schema.json", ""), "Person");
        assert_eq!(name("file:///tmp/my_types.json", ""), "MyTypes");
        assert_eq!(name("https://example.com/", ""), "ExampleCom");
    }

    #[test]
    fn map_keywords_are_skipped() {
        assert_eq!(name("https://example.com/root.json", "/properties/foo"), "RootFoo");
        assert_eq!(
            name("https://example.com/root.json", "/$defs/address/properties/street-name"),
            "RootAddressStreetName"
        );
        assert_eq!(
            name("https://example.com/root.json", "/properties/properties"),
            "RootProperties"
        );
    }

    #[test]
    fn single_and_array_keywords_are_kept() {
        assert_eq!(name("https://example.com/root.json", "/items"), "RootItems");
        assert_eq!(name("https://example.com/root.json", "/allOf/1"), "RootAllOf1");
    }

    #[test]
    fn leading_digit_gets_prefix() {
        assert_eq!(name("https://example.com/2020.json", ""), "T2020");
    }
}
