//! Draft 4: `id` declares base URIs and, in fragment form, anchors. Boolean
//! schemas are only accepted as `additionalProperties`/`additionalItems`.

use serde_json::{Map, Value};

use crate::shape::{self, ShapeError};
use crate::{BooleanSchemas, Dialect, DialectStrategy, Vocabulary};

static VOCABULARY: Vocabulary = Vocabulary {
    id: "id",
    anchor: None,
    fragment_id_anchors: true,
    // Only the document root re-bases in draft-04; nested `id` URLs are
    // left to the enclosing document.
    nested_ids: false,
    boolean_schemas: BooleanSchemas::Only(&["additionalProperties", "additionalItems"]),
    subschema: &["additionalProperties", "items", "additionalItems", "not"],
    subschema_map: &[
        "definitions",
        "properties",
        "patternProperties",
        "dependencies",
    ],
    subschema_array: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Draft04;

impl DialectStrategy for Draft04 {
    fn dialect(&self) -> Dialect {
        Dialect::Draft04
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(&VOCABULARY, map, pointer)?;
        shape::check_boolean_bounds(map, pointer)?;
        shape::check_non_empty(map, "required", pointer)?;
        shape::check_non_empty(map, "enum", pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_keyword_is_bare() {
        let node = json!({"id": "http://example.com/a.json", "$id": "ignored.json"});
        assert_eq!(Draft04.select_id(&node), Some("http://example.com/a.json"));
    }

    #[test]
    fn no_nested_ids() {
        assert!(!Draft04.supports_nested_ids());
        assert!(!Draft04.allows_boolean_schemas());
    }

    #[test]
    fn no_dynamic_references() {
        let node = json!({"$recursiveRef": "#", "$dynamicRef": "#x"});
        assert_eq!(Draft04.select_dynamic_ref(&node), None);
    }

    #[test]
    fn tuple_items_and_additional_items() {
        let node = json!({
            "items": [{"type": "string"}, {"type": "number"}],
            "additionalItems": false
        });
        let pointers: Vec<_> = Draft04
            .select_children(&node, "")
            .into_iter()
            .map(|c| c.pointer)
            .collect();
        assert_eq!(pointers, vec!["/items/0", "/items/1", "/additionalItems"]);
    }

    #[test]
    fn dependencies_schema_entries_only() {
        let node = json!({"dependencies": {"a": ["b"], "c": {"type": "object"}}});
        let children = Draft04.select_children(&node, "");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].pointer, "/dependencies/c");
    }

    #[test]
    fn required_must_not_be_empty() {
        assert!(Draft04.validate_shape(&json!({"required": []})).is_err());
    }
}
