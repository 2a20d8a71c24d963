//! Draft 2019-09: `$anchor`, `$defs`, the applicator split of `dependencies`
//! and the `$recursiveRef`/`$recursiveAnchor` pair.

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
        "additionalItems",
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
        "dependencies",
    ],
    subschema_array: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Draft2019_09;

impl DialectStrategy for Draft2019_09 {
    fn dialect(&self) -> Dialect {
        Dialect::Draft2019_09
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn select_dynamic_ref<'a>(&self, node: &'a Value) -> Option<&'a str> {
        node.get("$recursiveRef").and_then(Value::as_str)
    }

    fn select_dynamic_anchor<'a>(&self, node: &'a Value) -> Option<DynamicAnchor<'a>> {
        node.get("$recursiveAnchor")
            .and_then(Value::as_bool)
            .filter(|&on| on)
            .map(|_| DynamicAnchor::Recursive)
    }

    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(&VOCABULARY, map, pointer)?;
        shape::check_numeric_bounds(map, pointer)?;
        shape::check_bool(map, "$recursiveAnchor", pointer)?;
        shape::check_string(map, "$recursiveRef", pointer)?;
        shape::check_dependent_required(map, pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recursive_anchor_only_when_true() {
        assert_eq!(
            Draft2019_09.select_dynamic_anchor(&json!({"$recursiveAnchor": true})),
            Some(DynamicAnchor::Recursive)
        );
        assert_eq!(
            Draft2019_09.select_dynamic_anchor(&json!({"$recursiveAnchor": false})),
            None
        );
    }

    #[test]
    fn recursive_ref_is_dynamic() {
        let node = json!({"$recursiveRef": "#"});
        assert_eq!(Draft2019_09.select_dynamic_ref(&node), Some("#"));
        assert_eq!(Draft2019_09.select_ref(&node), None);
    }

    #[test]
    fn defs_and_unevaluated_children() {
        let node = json!({
            "$defs": {"a": {}},
            "unevaluatedProperties": false,
            "dependentSchemas": {"b": {"required": ["c"]}}
        });
        let pointers: Vec<_> = Draft2019_09
            .select_children(&node, "")
            .into_iter()
            .map(|c| c.pointer)
            .collect();
        assert_eq!(
            pointers,
            vec!["/$defs/a", "/dependentSchemas/b", "/unevaluatedProperties"]
        );
    }

    #[test]
    fn recursive_anchor_must_be_boolean() {
        assert!(
            Draft2019_09
                .validate_shape(&json!({"$recursiveAnchor": "yes"}))
                .is_err()
        );
    }

    #[test]
    fn fragment_id_is_not_an_anchor() {
        assert_eq!(Draft2019_09.select_anchor(&json!({"$id": "#foo"})), None);
    }
}
