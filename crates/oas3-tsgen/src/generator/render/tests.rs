use std::rc::Rc;

use serde_json::{Value, json};

use super::{Renderer, doc_block};
use crate::generator::{
  descriptor::DescriptorContext,
  errors::CompileError,
  resolver::DocumentSet,
  schema::{KeyedEntry, KeyedLeaf, KeyedMap, NodeKind, Pointer, SchemaNode, SelectorKey},
};

fn component(name: &str) -> Pointer {
  Pointer::root("").child("components").child("schemas").child(name)
}

fn render(schemas: Value, name: &str) -> String {
  let documents = DocumentSet::new(json!({ "components": { "schemas": schemas } }));
  let mut ctx = DescriptorContext::new(&documents);
  let id = ctx.convert_named(&component(name)).unwrap();
  Renderer::new(&ctx).declaration(id).unwrap()
}

fn render_one(schema: Value) -> String {
  render(json!({ "Subject": schema }), "Subject")
}

#[test]
fn object_with_documentation_and_quoted_keys() {
  let text = render_one(json!({
    "type": "object",
    "description": "A pet.",
    "required": ["name"],
    "properties": {
      "name": { "type": "string", "description": "Display name." },
      "tag-name": { "type": ["string", "null"] }
    }
  }));

  assert_eq!(
    text,
    "/** A pet. */\nexport type Subject = {\n  /** Display name. */\n  name: string;\n  'tag-name'?: string | null;\n};\n"
  );
}

#[test]
fn title_documents_when_description_is_missing() {
  assert_eq!(
    render_one(json!({ "type": "string", "title": "Label" })),
    "/** Label */\nexport type Subject = string;\n"
  );
}

#[test]
fn multi_line_documentation_becomes_a_block() {
  let text = render_one(json!({ "type": "boolean", "description": "First line.\n\nSecond line. */" }));

  assert_eq!(
    text,
    "/**\n * First line.\n *\n * Second line. *\\/\n */\nexport type Subject = boolean;\n"
  );
  assert_eq!(doc_block("  \n", 0), "");
}

#[test]
fn arrays() {
  assert_eq!(
    render_one(json!({ "type": "array", "items": { "type": "string" } })),
    "export type Subject = string[];\n"
  );
  assert_eq!(
    render_one(json!({ "type": "array", "items": { "type": ["string", "number"] } })),
    "export type Subject = (string | number)[];\n"
  );
  assert_eq!(
    render_one(json!({ "type": "array", "prefixItems": [{ "type": "string" }, {}] })),
    "export type Subject = [string, unknown];\n"
  );
  assert_eq!(render_one(json!({ "type": "array" })), "export type Subject = unknown[];\n");
}

#[test]
fn literals_are_quoted_and_escaped() {
  assert_eq!(
    render_one(json!({ "type": "string", "enum": ["it's", "plain"] })),
    "export type Subject = 'it\\'s' | 'plain';\n"
  );
  assert_eq!(render_one(json!({ "const": 42 })), "export type Subject = 42;\n");
  assert_eq!(render_one(json!(false)), "export type Subject = never;\n");
}

#[test]
fn combinators_reference_named_members() {
  let schemas = json!({
    "Circle": { "type": "object", "properties": { "radius": { "type": "number" } } },
    "Square": { "type": "object", "properties": { "side": { "type": "number" } } },
    "Shape": {
      "oneOf": [{ "$ref": "#/components/schemas/Circle" }, { "$ref": "#/components/schemas/Square" }]
    },
    "Labeled": {
      "allOf": [{ "$ref": "#/components/schemas/Circle" }],
      "properties": { "label": { "type": "string" } }
    }
  });

  assert_eq!(render(schemas.clone(), "Shape"), "export type Shape = Circle | Square;\n");
  assert_eq!(
    render(schemas, "Labeled"),
    "export type Labeled = Circle & {\n  label?: string;\n};\n"
  );
}

#[test]
fn additional_properties_become_records() {
  assert_eq!(
    render_one(json!({ "type": "object", "additionalProperties": { "type": "number" } })),
    "export type Subject = Record<string, number>;\n"
  );
  assert_eq!(
    render_one(json!({ "type": "object", "additionalProperties": false })),
    "export type Subject = Record<string, never>;\n"
  );
  assert_eq!(
    render_one(json!({ "type": "object" })),
    "export type Subject = Record<string, unknown>;\n"
  );
  assert_eq!(
    render_one(json!({
      "type": "object",
      "required": ["a"],
      "properties": { "a": { "type": "string" } },
      "additionalProperties": { "type": "string" }
    })),
    "export type Subject = {\n  a: string;\n} & Record<string, string>;\n"
  );
}

#[test]
fn nullable_reference_is_a_union_with_null() {
  let schemas = json!({
    "Pet": { "type": "string" },
    "Owner": {
      "type": "object",
      "properties": { "pet": { "$ref": "#/components/schemas/Pet", "nullable": true } }
    }
  });

  assert_eq!(render(schemas, "Owner"), "export type Owner = {\n  pet?: Pet | null;\n};\n");
}

#[test]
fn nested_objects_are_indented() {
  let text = render_one(json!({
    "type": "object",
    "properties": {
      "inner": { "type": "object", "properties": { "depth": { "type": "integer", "description": "How deep." } } }
    }
  }));

  assert_eq!(
    text,
    "export type Subject = {\n  inner?: {\n    /** How deep. */\n    depth?: number;\n  };\n};\n"
  );
}

/// A selector dispatching over `depth` dimensions, ending in a single `unknown` leaf.
fn nested_selector(depth: usize) -> KeyedMap {
  let mut map = KeyedMap::default();
  map.insert(
    SelectorKey::Number(200),
    KeyedEntry::Leaves(vec![KeyedLeaf {
      origin: Pointer::root("").child("leaf"),
      doc: None,
      node: Rc::new(SchemaNode::new(NodeKind::Any)),
    }]),
  );
  for level in 1..depth {
    let mut outer = KeyedMap::default();
    outer.insert(SelectorKey::Text(format!("k{level}")), KeyedEntry::Nested(map));
    map = outer;
  }
  map
}

fn render_selector(depth: usize) -> Result<String, CompileError> {
  let documents = DocumentSet::new(json!({}));
  let mut ctx = DescriptorContext::new(&documents);
  let node = Rc::new(SchemaNode::keyed_map(nested_selector(depth)));
  let id = ctx.convert(&node, &Pointer::root("").child("deep"), Some("Deep".to_string()), "Deep")?;
  Renderer::new(&ctx).declaration(id)
}

#[test]
fn seven_selector_dimensions_are_supported() {
  let text = render_selector(7).unwrap();

  assert!(text.starts_with("export type Deep<\n  T1 extends 'k6' = 'k6',\n"));
  assert!(text.contains("  T7 extends 200 = 200,\n"));
  assert!(!text.contains("T8"));
}

#[test]
fn eight_selector_dimensions_are_rejected() {
  assert_eq!(
    render_selector(8).unwrap_err(),
    CompileError::TooManyDimensions {
      path: "#/deep".to_string(),
      dimensions: 8,
      max: 7,
    }
  );
}

#[test]
fn empty_selector_is_unknown() {
  let documents = DocumentSet::new(json!({}));
  let mut ctx = DescriptorContext::new(&documents);
  let node = Rc::new(SchemaNode::keyed_map(KeyedMap::default()));
  let id = ctx
    .convert(&node, &Pointer::root("").child("empty"), Some("Empty".to_string()), "Empty")
    .unwrap();

  assert_eq!(Renderer::new(&ctx).declaration(id).unwrap(), "export type Empty = unknown;\n");
}
