//! Draft 6: `$id` replaces `id`, booleans become schemas everywhere and
//! `contains`, `propertyNames` and `const` appear.

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
pub struct Draft06;

impl DialectStrategy for Draft06 {
    fn dialect(&self) -> Dialect {
        Dialect::Draft06
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(&VOCABULARY, map, pointer)?;
        shape::check_numeric_bounds(map, pointer)
    }
}
