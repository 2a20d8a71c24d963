//! Draft 7: draft 6 plus `if`/`then`/`else`.

use serde_json::{Map, Value};

use crate::shape::{self, ShapeError};
use crate::{BooleanSchemas, Dialect, DialectStrategy, Vocabulary};

static VOCABULARY: Vocabulary = Vocabulary {
    id: "$id",
    anchor: None,
    fragment_id_anchors: true,
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
    ],
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
pub struct Draft07;

impl DialectStrategy for Draft07 {
    fn dialect(&self) -> Dialect {
        Dialect::Draft07
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(&VOCABULARY, map, pointer)?;
        shape::check_numeric_bounds(map, pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conditional_children() {
        let node = json!({"if": {"required": ["a"]}, "then": true, "else": false});
        let keywords: Vec<_> = Draft07
            .select_children(&node, "")
            .into_iter()
            .map(|c| c.keyword)
            .collect();
        assert_eq!(keywords, vec!["if", "then", "else"]);
    }

    #[test]
    fn anchor_keyword_is_not_recognised() {
        assert_eq!(Draft07.select_anchor(&json!({"$anchor": "foo"})), None);
    }
}
