use serde_json::{Value, json};

use super::support::component;
use crate::generator::{
  descriptor::{DescriptorContext, Shape},
  errors::CompileError,
  render::Renderer,
  resolver::DocumentSet,
};

fn schemas(schemas: Value) -> DocumentSet {
  DocumentSet::new(json!({ "components": { "schemas": schemas } }))
}

#[test]
fn self_reference_terminates_without_self_dependency() {
  let documents = schemas(json!({
    "Tree": {
      "type": "object",
      "properties": {
        "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
      }
    }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let tree = ctx.convert_named(&component("Tree")).unwrap();

  assert!(ctx.declared_dependencies(tree).is_empty());
  assert_eq!(ctx.cycles(), &[vec!["Tree".to_string(), "Tree".to_string()]]);
  assert_eq!(
    Renderer::new(&ctx).declaration(tree).unwrap(),
    "export type Tree = {\n  children?: Tree[];\n};\n"
  );
}

#[test]
fn mutual_references_produce_both_descriptors() {
  let documents = schemas(json!({
    "A": { "type": "object", "properties": { "b": { "$ref": "#/components/schemas/B" } } },
    "B": { "type": "object", "properties": { "a": { "$ref": "#/components/schemas/A" } } }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let a = ctx.convert_named(&component("A")).unwrap();
  let b = ctx.lookup(&component("B")).expect("B is converted through A");

  assert_eq!(ctx.declared_dependencies(a), vec![b]);
  assert_eq!(ctx.declared_dependencies(b), vec![a]);
  assert_eq!(ctx.cycles(), &[vec!["A".to_string(), "B".to_string(), "A".to_string()]]);

  let renderer = Renderer::new(&ctx);
  assert_eq!(renderer.declaration(a).unwrap(), "export type A = {\n  b?: B;\n};\n");
  assert_eq!(renderer.declaration(b).unwrap(), "export type B = {\n  a?: A;\n};\n");
}

#[test]
fn conversion_is_memoized_by_schema_path() {
  let documents = schemas(json!({
    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Owner": {
      "type": "object",
      "properties": {
        "first": { "$ref": "#/components/schemas/Pet" },
        "second": { "$ref": "#/components/schemas/Pet" }
      }
    }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let owner = ctx.convert_named(&component("Owner")).unwrap();
  let pet = ctx.convert_named(&component("Pet")).unwrap();
  let before = ctx.len();
  assert_eq!(ctx.convert_named(&component("Pet")).unwrap(), pet);
  assert_eq!(ctx.len(), before);

  let Shape::Object(object) = &ctx.get(owner).shape else {
    panic!("Owner should be an object");
  };
  assert!(object.properties.iter().all(|property| property.target == pet));
}

#[test]
fn anonymous_children_are_named_after_their_parent() {
  let documents = schemas(json!({
    "Order": {
      "type": "object",
      "properties": {
        "line_items": { "type": "array", "items": { "type": "object", "properties": { "sku": { "type": "string" } } } }
      }
    }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let order = ctx.convert_named(&component("Order")).unwrap();
  let names: Vec<_> = ctx
    .ids()
    .filter(|id| *id != order)
    .map(|id| ctx.get(id).suggested_model_name.clone())
    .collect();

  assert_eq!(names, vec!["OrderLineItems", "OrderLineItemsItem", "OrderLineItemsItemSku"]);
  assert!(ctx.ids().filter(|id| *id != order).all(|id| !ctx.get(id).is_declaration()));
}

#[test]
fn named_reference_becomes_an_alias() {
  let documents = schemas(json!({
    "Id": { "type": "string" },
    "UserId": { "$ref": "#/components/schemas/Id", "description": "Identifier of a user." }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let user_id = ctx.convert_named(&component("UserId")).unwrap();

  assert!(matches!(ctx.get(user_id).shape, Shape::Alias(_)));
  assert_eq!(
    Renderer::new(&ctx).declaration(user_id).unwrap(),
    "/** Identifier of a user. */\nexport type UserId = Id;\n"
  );
}

#[test]
fn dangling_reference_is_a_resolution_error() {
  let documents = schemas(json!({
    "Broken": { "$ref": "#/components/schemas/Missing" }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let error = ctx.convert_named(&component("Broken")).unwrap_err();

  assert_eq!(
    error,
    CompileError::SchemaResolution {
      pointer: "#/components/schemas/Missing".to_string(),
      origin: "#/components/schemas/Broken".to_string(),
    }
  );
}

#[test]
fn reference_into_unknown_document_is_a_resolution_error() {
  let documents = schemas(json!({
    "Remote": { "type": "object", "properties": { "x": { "$ref": "other.json#/X" } } }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let error = ctx.convert_named(&component("Remote")).unwrap_err();

  assert!(matches!(error, CompileError::SchemaResolution { ref pointer, .. } if pointer == "other.json#/X"));
}

#[test]
fn reference_to_a_whole_document_cannot_be_named() {
  let documents = schemas(json!({
    "Everything": { "type": "object", "properties": { "root": { "$ref": "#" } } }
  }));
  let mut ctx = DescriptorContext::new(&documents);

  let error = ctx.convert_named(&component("Everything")).unwrap_err();

  assert_eq!(error, CompileError::Naming { path: "#".to_string() });
}

#[test]
fn external_documents_resolve_relative_references_locally() {
  let documents = DocumentSet::new(json!({
    "components": {
      "schemas": {
        "Task": { "$ref": "common.json#/components/schemas/Task" }
      }
    }
  }))
  .with_document(
    "common.json",
    json!({
      "components": {
        "schemas": {
          "Uid": { "type": "string" },
          "Task": { "type": "object", "properties": { "id": { "$ref": "#/components/schemas/Uid" } } }
        }
      }
    }),
  );
  let mut ctx = DescriptorContext::new(&documents);

  ctx.convert_named(&component("Task")).unwrap();

  let names: Vec<_> = ctx
    .ids()
    .filter_map(|id| ctx.get(id).model_name.clone())
    .map(|name| {
      let found = ctx.lookup_name(&name).is_some();
      (name, found)
    })
    .collect();
  assert_eq!(
    names,
    vec![
      ("Task".to_string(), true),
      ("Task2".to_string(), true),
      ("Uid".to_string(), true)
    ]
  );
}
