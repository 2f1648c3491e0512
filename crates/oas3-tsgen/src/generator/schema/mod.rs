//! Normalized, immutable representation of schema fragments.
//!
//! The shape of every fragment is decided once while parsing (see [`parse`]), so
//! later stages dispatch on [`NodeKind`] instead of probing raw JSON.

mod parse;
mod pointer;

use std::{collections::BTreeSet, fmt, rc::Rc};

use indexmap::IndexMap;
use serde_json::Value;

pub(crate) use parse::parse_schema;
pub(crate) use pointer::Pointer;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SchemaMeta {
  pub title: Option<String>,
  pub description: Option<String>,
  pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SchemaNode {
  pub meta: SchemaMeta,
  pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
  /// `{}` or `true`: any value.
  Any,
  /// `false`: no value.
  Never,
  Primitive(Primitive),
  Array(ArrayNode),
  Object(ObjectNode),
  Combinator(Combinator),
  /// Canonical pointer to the referenced fragment.
  Reference(Pointer),
  KeyedMap(KeyedMap),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrimitiveType {
  String,
  Number,
  Integer,
  Boolean,
  Null,
}

impl PrimitiveType {
  pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
    match keyword {
      "string" => Some(Self::String),
      "number" => Some(Self::Number),
      "integer" => Some(Self::Integer),
      "boolean" => Some(Self::Boolean),
      "null" => Some(Self::Null),
      _ => None,
    }
  }
}

/// A primitive, optionally restricted to a set of literal values (`enum` / `const`).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Primitive {
  pub ty: PrimitiveType,
  pub literals: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArrayItems {
  Any,
  Single(Rc<SchemaNode>),
  Tuple(Vec<Rc<SchemaNode>>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArrayNode {
  pub items: ArrayItems,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AdditionalProperties {
  /// Not specified: extra keys are allowed but untyped.
  Open,
  /// `additionalProperties: false`.
  Closed,
  Schema(Rc<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObjectNode {
  pub properties: IndexMap<String, Rc<SchemaNode>>,
  pub required: BTreeSet<String>,
  pub additional: AdditionalProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CombinatorKind {
  /// Intersection.
  AllOf,
  /// Overlapping union.
  AnyOf,
  /// Exclusive union.
  OneOf,
}

impl CombinatorKind {
  pub(crate) const fn keyword(self) -> &'static str {
    match self {
      Self::AllOf => "allOf",
      Self::AnyOf => "anyOf",
      Self::OneOf => "oneOf",
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Combinator {
  pub kind: CombinatorKind,
  pub members: Vec<Rc<SchemaNode>>,
}

/// A discrete dispatch key: a status code, a content type, a status range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SelectorKey {
  Number(u64),
  Text(String),
}

impl SelectorKey {
  pub(crate) fn parse(raw: &str) -> Self {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
      && let Ok(number) = raw.parse::<u64>()
    {
      return Self::Number(number);
    }
    Self::Text(raw.to_string())
  }
}

impl fmt::Display for SelectorKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(number) => write!(f, "{number}"),
      Self::Text(text) => f.write_str(text),
    }
  }
}

/// A schema reached through a keyed map, with the documentation of the entry that holds it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyedLeaf {
  pub origin: Pointer,
  pub doc: Option<String>,
  pub node: Rc<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum KeyedEntry {
  Nested(KeyedMap),
  Leaves(Vec<KeyedLeaf>),
}

/// Mapping from discrete keys to nested maps or terminal leaf schemas, e.g. status code then
/// content type.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct KeyedMap {
  pub entries: IndexMap<SelectorKey, KeyedEntry>,
}

impl KeyedMap {
  pub(crate) fn insert(&mut self, key: SelectorKey, entry: KeyedEntry) {
    self.entries.insert(key, entry);
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl SchemaNode {
  pub(crate) fn new(kind: NodeKind) -> Self {
    Self {
      meta: SchemaMeta::default(),
      kind,
    }
  }

  pub(crate) fn with_description(mut self, description: Option<String>) -> Self {
    if self.meta.description.is_none() {
      self.meta.description = description;
    }
    self
  }

  pub(crate) fn object(properties: IndexMap<String, Rc<SchemaNode>>, required: BTreeSet<String>) -> Self {
    Self::new(NodeKind::Object(ObjectNode {
      properties,
      required,
      additional: AdditionalProperties::Closed,
    }))
  }

  pub(crate) fn keyed_map(map: KeyedMap) -> Self {
    Self::new(NodeKind::KeyedMap(map))
  }

  #[cfg(test)]
  pub(crate) fn reference(&self) -> Option<&Pointer> {
    match &self.kind {
      NodeKind::Reference(pointer) => Some(pointer),
      _ => None,
    }
  }
}
