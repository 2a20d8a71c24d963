//! Draft 2020-12: `prefixItems` takes over tuple validation and named
//! `$dynamicAnchor`/`$dynamicRef` replace the recursive keywords.

use serde_json::{Map, Value};

use crate::shape::{self, ShapeError};
use crate::{BooleanSchemas, Dialect, DialectStrategy, DynamicAnchor, Vocabulary};

static VOCABULARY: Vocabulary = Vocabulary {
    id: "$id",
    anchor: Some("$anchor"),
    fragment_id_anchors: false,
    nested_ids: true,
    boolean_schemas: BooleanSchemas::Anywhere,
    subschema: &[
        "additionalProperties",
        "items",
        "not",
        "contains",
        "propertyNames",
        "if",
        "then",
        "else",
        "unevaluatedProperties",
        "unevaluatedItems",
    ],
    subschema_map: &[
        "$defs",
        "definitions",
        "properties",
        "patternProperties",
        "dependentSchemas",
    ],
    subschema_array: &["prefixItems", "allOf", "anyOf", "oneOf"],
    tuple_items: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Draft2020_12;

impl DialectStrategy for Draft2020_12 {
    fn dialect(&self) -> Dialect {
        Dialect::Draft2020_12
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn select_dynamic_ref<'a>(&self, node: &'a Value) -> Option<&'a str> {
        node.get("$dynamicRef").and_then(Value::as_str)
    }

    fn select_dynamic_anchor<'a>(&self, node: &'a Value) -> Option<DynamicAnchor<'a>> {
        node.get("$dynamicAnchor")
            .and_then(Value::as_str)
            .map(DynamicAnchor::Named)
    }

    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(&VOCABULARY, map, pointer)?;
        shape::check_numeric_bounds(map, pointer)?;
        shape::check_anchor_name(map, "$dynamicAnchor", pointer)?;
        shape::check_string(map, "$dynamicRef", pointer)?;
        shape::check_dependent_required(map, pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dynamic_keywords() {
        let node = json!({"$dynamicAnchor": "node", "$dynamicRef": "#node"});
        assert_eq!(
            Draft2020_12.select_dynamic_anchor(&node),
            Some(DynamicAnchor::Named("node"))
        );
        assert_eq!(Draft2020_12.select_dynamic_ref(&node), Some("#node"));
    }

    #[test]
    fn prefix_items_then_items() {
        let node = json!({"prefixItems": [{"type": "string"}], "items": false});
        let pointers: Vec<_> = Draft2020_12
            .select_children(&node, "")
            .into_iter()
            .map(|c| c.pointer)
            .collect();
        assert_eq!(pointers, vec!["/items", "/prefixItems/0"]);
    }

    #[test]
    fn array_items_are_not_children() {
        let node = json!({"items": [{"type": "string"}]});
        assert!(Draft2020_12.select_children(&node, "").is_empty());
    }

    #[test]
    fn recursive_keywords_ignored() {
        let node = json!({"$recursiveRef": "#", "$recursiveAnchor": true});
        assert_eq!(Draft2020_12.select_dynamic_ref(&node), None);
        assert_eq!(Draft2020_12.select_dynamic_anchor(&node), None);
    }

    #[test]
    fn dynamic_anchor_name_checked() {
        assert!(
            Draft2020_12
                .validate_shape(&json!({"$dynamicAnchor": "not valid"}))
                .is_err()
        );
    }
}
