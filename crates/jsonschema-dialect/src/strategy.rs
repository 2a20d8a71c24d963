use core::fmt;

use serde_json::{Map, Value};

use crate::dialect::normalize_signature;
use crate::shape::{self, ShapeError};
use crate::{Dialect, pointer};

/// Where a dialect accepts `true`/`false` in place of a schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanSchemas {
    /// At every schema position, including the document root.
    Anywhere,
    /// Only as the value of the listed keywords.
    Only(&'static [&'static str]),
}

impl BooleanSchemas {
    /// `keyword` is the keyword the boolean hangs off, `None` for the root.
    pub fn allows(self, keyword: Option<&str>) -> bool {
        match (self, keyword) {
            (Self::Anywhere, _) => true,
            (Self::Only(_), None) => false,
            (Self::Only(keywords), Some(k)) => keywords.contains(&k),
        }
    }
}

/// Static keyword table a dialect is built from.
#[derive(Debug)]
pub struct Vocabulary {
    /// Keyword declaring a base URI (`id` or `$id`).
    pub id: &'static str,
    /// Keyword declaring a plain-name anchor, if the dialect has one.
    pub anchor: Option<&'static str>,
    /// Whether a fragment-only id (`"#foo"`) declares an anchor.
    pub fragment_id_anchors: bool,
    /// Whether an id below the document root starts a new resource.
    pub nested_ids: bool,
    pub boolean_schemas: BooleanSchemas,
    /// Keywords whose value is a single subschema.
    pub subschema: &'static [&'static str],
    /// Keywords whose value is an object of named subschemas.
    pub subschema_map: &'static [&'static str],
    /// Keywords whose value is an array of subschemas.
    pub subschema_array: &'static [&'static str],
    /// Whether `items` may be an array of positional subschemas.
    pub tuple_items: bool,
}

/// A late-bound anchor declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicAnchor<'a> {
    /// 2020-12 `$dynamicAnchor: "name"`.
    Named(&'a str),
    /// 2019-09 `$recursiveAnchor: true`.
    Recursive,
}

impl DynamicAnchor<'_> {
    /// URL fragment the anchor is registered under. Recursive anchors use the
    /// empty fragment, which is what `$recursiveRef: "#"` resolves to.
    pub fn fragment(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Recursive => "",
        }
    }
}

/// A structural child of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Child<'a> {
    /// Keyword the child hangs off (`properties`, `items`, `allOf`, ...).
    pub keyword: &'static str,
    /// JSON Pointer of the child, relative to the same root as its parent.
    pub pointer: String,
    pub node: &'a Value,
}

/// Dialect-specific view of schema nodes.
///
/// Every method is a pure function of its arguments. Implementations usually
/// only provide [`dialect`](Self::dialect), [`vocabulary`](Self::vocabulary)
/// and whatever keyword handling differs from the shared defaults.
pub trait DialectStrategy: fmt::Debug + Send + Sync {
    fn dialect(&self) -> Dialect;

    fn vocabulary(&self) -> &'static Vocabulary;

    fn signature(&self) -> &'static str {
        self.dialect().signature()
    }

    /// Whether `node` declares this dialect through `$schema`.
    fn is_root_node(&self, node: &Value) -> bool {
        node.get("$schema")
            .and_then(Value::as_str)
            .is_some_and(|s| normalize_signature(s) == normalize_signature(self.signature()))
    }

    fn supports_nested_ids(&self) -> bool {
        self.vocabulary().nested_ids
    }

    fn allows_boolean_schemas(&self) -> bool {
        self.vocabulary().boolean_schemas == BooleanSchemas::Anywhere
    }

    /// The base-URI-changing id of `node`. Fragment-only ids are anchors, not
    /// ids, and are not returned here.
    fn select_id<'a>(&self, node: &'a Value) -> Option<&'a str> {
        node.get(self.vocabulary().id)
            .and_then(Value::as_str)
            .filter(|id| !id.starts_with('#'))
    }

    /// The dialect an embedded resource at `node` switches to, when it
    /// declares an id and a `$schema` other than this dialect's. Nodes below
    /// such a resource belong to that dialect, not this one.
    fn foreign_dialect(&self, node: &Value) -> Option<Dialect> {
        if !self.supports_nested_ids() || self.select_id(node).is_none() {
            return None;
        }
        node.get("$schema")
            .and_then(Value::as_str)
            .and_then(Dialect::from_signature)
            .filter(|&dialect| dialect != self.dialect())
    }

    fn select_ref<'a>(&self, node: &'a Value) -> Option<&'a str> {
        node.get("$ref").and_then(Value::as_str)
    }

    /// `$dynamicRef` or `$recursiveRef`, depending on the dialect.
    fn select_dynamic_ref<'a>(&self, _node: &'a Value) -> Option<&'a str> {
        None
    }

    /// Plain-name anchor declared by `node`, without the leading `#`.
    fn select_anchor<'a>(&self, node: &'a Value) -> Option<&'a str> {
        let vocabulary = self.vocabulary();
        if let Some(keyword) = vocabulary.anchor {
            return node.get(keyword).and_then(Value::as_str);
        }
        if vocabulary.fragment_id_anchors {
            return node
                .get(vocabulary.id)
                .and_then(Value::as_str)
                .and_then(|id| id.strip_prefix('#'))
                .filter(|name| !name.is_empty() && !name.starts_with('/'));
        }
        None
    }

    fn select_dynamic_anchor<'a>(&self, _node: &'a Value) -> Option<DynamicAnchor<'a>> {
        None
    }

    /// Type names from the inline `type` construct.
    fn select_types<'a>(&self, node: &'a Value) -> Vec<&'a str> {
        match node.get("type") {
            Some(Value::String(ty)) => vec![ty.as_str()],
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Enumerate the structural children of `node` located at `pointer`.
    fn select_children<'a>(&self, node: &'a Value, pointer: &str) -> Vec<Child<'a>> {
        let Value::Object(map) = node else {
            return Vec::new();
        };
        let vocabulary = self.vocabulary();
        let mut children = Vec::new();

        for &keyword in vocabulary.subschema_map {
            if let Some(Value::Object(entries)) = map.get(keyword) {
                let base = pointer::push(pointer, keyword);
                children.extend(
                    entries
                        .iter()
                        .filter(|(_, child)| is_schema_like(child))
                        .map(|(name, child)| Child {
                            keyword,
                            pointer: pointer::push(&base, name),
                            node: child,
                        }),
                );
            }
        }

        for &keyword in vocabulary.subschema {
            match map.get(keyword) {
                Some(child) if is_schema_like(child) => children.push(Child {
                    keyword,
                    pointer: pointer::push(pointer, keyword),
                    node: child,
                }),
                Some(Value::Array(items)) if keyword == "items" && vocabulary.tuple_items => {
                    push_array(&mut children, keyword, pointer, items);
                }
                _ => {}
            }
        }

        for &keyword in vocabulary.subschema_array {
            if let Some(Value::Array(items)) = map.get(keyword) {
                push_array(&mut children, keyword, pointer, items);
            }
        }

        children
    }

    /// Dialect-specific keyword checks for a single object node. Children are
    /// visited by [`validate_shape`](Self::validate_shape).
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] naming the offending keyword's pointer.
    fn check_keywords(&self, map: &Map<String, Value>, pointer: &str) -> Result<(), ShapeError> {
        shape::check_common(self.vocabulary(), map, pointer)
    }

    /// Check that `document` is a syntactically legal schema of this dialect.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeError`] found, depth first.
    fn validate_shape(&self, document: &Value) -> Result<(), ShapeError> {
        shape::validate(self, document)
    }
}

fn is_schema_like(value: &Value) -> bool {
    value.is_object() || value.is_boolean()
}

fn push_array<'a>(
    children: &mut Vec<Child<'a>>,
    keyword: &'static str,
    pointer: &str,
    items: &'a [Value],
) {
    let base = pointer::push(pointer, keyword);
    children.extend(
        items
            .iter()
            .enumerate()
            .filter(|(_, child)| is_schema_like(child))
            .map(|(i, child)| Child {
                keyword,
                pointer: format!("{base}/{i}"),
                node: child,
            }),
    );
}
