use std::{collections::BTreeSet, rc::Rc};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{
  AdditionalProperties, ArrayItems, ArrayNode, Combinator, CombinatorKind, NodeKind, ObjectNode, Pointer, Primitive,
  PrimitiveType, SchemaMeta, SchemaNode,
};
use crate::generator::metrics::GenerationWarning;

/// Parses the raw JSON-Schema fragment found at `at` into a [`SchemaNode`].
///
/// `$ref`s are kept as [`NodeKind::Reference`] and never followed here, so parsing always
/// terminates on the finite JSON tree. Unknown `type` keywords are recorded as warnings.
pub(crate) fn parse_schema(value: &Value, at: &Pointer, warnings: &mut Vec<GenerationWarning>) -> SchemaNode {
  SchemaParser { warnings }.parse(value, at)
}

struct SchemaParser<'w> {
  warnings: &'w mut Vec<GenerationWarning>,
}

impl SchemaParser<'_> {
  fn parse(&mut self, value: &Value, at: &Pointer) -> SchemaNode {
    let Value::Object(map) = value else {
      return match value {
        Value::Bool(false) => SchemaNode::new(NodeKind::Never),
        _ => SchemaNode::new(NodeKind::Any),
      };
    };

    let mut meta = Self::meta(map);

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
      return SchemaNode {
        meta,
        kind: NodeKind::Reference(Pointer::parse(reference, at.document())),
      };
    }

    // allOf members come first so that their positions match the source pointer.
    let mut parts = self.members(map, at, CombinatorKind::AllOf);
    let had_all_of = !parts.is_empty();

    if let Some(kind) = self.structural(map, at, &mut meta) {
      parts.push(Rc::new(SchemaNode::new(kind)));
    }

    for kind in [CombinatorKind::AnyOf, CombinatorKind::OneOf] {
      let members = self.members(map, at, kind);
      if !members.is_empty() {
        parts.push(Rc::new(SchemaNode::new(NodeKind::Combinator(Combinator { kind, members }))));
      }
    }

    let kind = match parts.len() {
      0 => NodeKind::Any,
      1 if !had_all_of => Rc::unwrap_or_clone(parts.remove(0)).kind,
      _ => NodeKind::Combinator(Combinator {
        kind: CombinatorKind::AllOf,
        members: parts,
      }),
    };

    SchemaNode { meta, kind }
  }

  fn meta(map: &Map<String, Value>) -> SchemaMeta {
    SchemaMeta {
      title: map.get("title").and_then(Value::as_str).map(String::from),
      description: map.get("description").and_then(Value::as_str).map(String::from),
      nullable: map.get("nullable").and_then(Value::as_bool).unwrap_or(false),
    }
  }

  fn members(&mut self, map: &Map<String, Value>, at: &Pointer, kind: CombinatorKind) -> Vec<Rc<SchemaNode>> {
    let Some(Value::Array(values)) = map.get(kind.keyword()) else {
      return vec![];
    };
    let base = at.child(kind.keyword());
    values
      .iter()
      .enumerate()
      .map(|(index, member)| Rc::new(self.parse(member, &base.child_index(index))))
      .collect()
  }

  fn structural(&mut self, map: &Map<String, Value>, at: &Pointer, meta: &mut SchemaMeta) -> Option<NodeKind> {
    let mut types = match map.get("type") {
      Some(Value::String(single)) => vec![single.as_str()],
      Some(Value::Array(many)) => many.iter().filter_map(Value::as_str).collect(),
      _ => vec![],
    };

    if types.len() > 1 && types.contains(&"null") {
      meta.nullable = true;
      types.retain(|ty| *ty != "null");
    }

    let literals = Self::literals(map);
    if !literals.is_empty() {
      let ty = types
        .first()
        .and_then(|keyword| PrimitiveType::from_keyword(keyword))
        .unwrap_or_else(|| Self::literal_type(&literals[0]));
      return Some(NodeKind::Primitive(Primitive { ty, literals }));
    }

    match types.as_slice() {
      [] => {
        if map.contains_key("properties") || map.contains_key("additionalProperties") {
          Some(self.object(map, at))
        } else if map.contains_key("items") || map.contains_key("prefixItems") {
          Some(self.array(map, at))
        } else {
          None
        }
      }
      [single] => Some(self.typed(map, at, single)),
      many => {
        let members = many
          .iter()
          .map(|keyword| Rc::new(SchemaNode::new(self.typed(map, at, keyword))))
          .collect();
        Some(NodeKind::Combinator(Combinator {
          kind: CombinatorKind::AnyOf,
          members,
        }))
      }
    }
  }

  fn typed(&mut self, map: &Map<String, Value>, at: &Pointer, keyword: &str) -> NodeKind {
    match keyword {
      "object" => self.object(map, at),
      "array" => self.array(map, at),
      other => {
        if let Some(ty) = PrimitiveType::from_keyword(other) {
          NodeKind::Primitive(Primitive { ty, literals: vec![] })
        } else {
          self.warnings.push(GenerationWarning::UnknownSchemaType {
            path: at.to_string(),
            value: other.to_string(),
          });
          NodeKind::Any
        }
      }
    }
  }

  fn object(&mut self, map: &Map<String, Value>, at: &Pointer) -> NodeKind {
    let properties_at = at.child("properties");
    let properties = map
      .get("properties")
      .and_then(Value::as_object)
      .map(|props| {
        props
          .iter()
          .map(|(name, value)| (name.clone(), Rc::new(self.parse(value, &properties_at.child(name)))))
          .collect::<IndexMap<_, _>>()
      })
      .unwrap_or_default();

    let required = map
      .get("required")
      .and_then(Value::as_array)
      .map(|names| names.iter().filter_map(Value::as_str).map(String::from).collect())
      .unwrap_or_else(BTreeSet::new);

    let additional = match map.get("additionalProperties") {
      None | Some(Value::Bool(true)) => AdditionalProperties::Open,
      Some(Value::Bool(false)) => AdditionalProperties::Closed,
      Some(schema) => {
        AdditionalProperties::Schema(Rc::new(self.parse(schema, &at.child("additionalProperties"))))
      }
    };

    NodeKind::Object(ObjectNode {
      properties,
      required,
      additional,
    })
  }

  fn array(&mut self, map: &Map<String, Value>, at: &Pointer) -> NodeKind {
    let items = match (map.get("prefixItems"), map.get("items")) {
      (Some(Value::Array(tuple)), _) => ArrayItems::Tuple(self.tuple(tuple, &at.child("prefixItems"))),
      (_, Some(Value::Array(tuple))) => ArrayItems::Tuple(self.tuple(tuple, &at.child("items"))),
      (_, Some(item @ Value::Object(_))) => ArrayItems::Single(Rc::new(self.parse(item, &at.child("items")))),
      _ => ArrayItems::Any,
    };
    NodeKind::Array(ArrayNode { items })
  }

  fn tuple(&mut self, values: &[Value], at: &Pointer) -> Vec<Rc<SchemaNode>> {
    values
      .iter()
      .enumerate()
      .map(|(index, value)| Rc::new(self.parse(value, &at.child_index(index))))
      .collect()
  }

  fn literals(map: &Map<String, Value>) -> Vec<Value> {
    if let Some(Value::Array(values)) = map.get("enum") {
      return values.clone();
    }
    map.get("const").map(|value| vec![value.clone()]).unwrap_or_default()
  }

  fn literal_type(literal: &Value) -> PrimitiveType {
    match literal {
      Value::Bool(_) => PrimitiveType::Boolean,
      Value::Number(number) if number.is_f64() => PrimitiveType::Number,
      Value::Number(_) => PrimitiveType::Integer,
      Value::Null => PrimitiveType::Null,
      _ => PrimitiveType::String,
    }
  }
}
