use std::rc::Rc;

use serde_json::{Value, json};

use super::support::component;
use crate::generator::{
  errors::CompileError,
  metrics::GenerationWarning,
  resolver::{DocumentSet, Reentry, Resolver},
  schema::{NodeKind, Pointer},
};

fn documents() -> DocumentSet {
  DocumentSet::new(json!({
    "components": {
      "schemas": {
        "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
        "Odd": { "type": "decimal" }
      },
      "responses": {
        "NotFound": { "$ref": "#/components/responses/Missing" },
        "Alias": { "$ref": "errors.json#/Problem" },
        "Loop": { "$ref": "#/components/responses/Loop" }
      }
    }
  }))
  .with_document("errors.json", json!({ "Problem": { "description": "Problem" } }))
}

fn response<'a>(documents: &'a DocumentSet, name: &str) -> &'a Value {
  &documents.root()["components"]["responses"][name]
}

#[test]
fn parsed_nodes_are_cached_per_pointer() {
  let documents = documents();
  let mut resolver = Resolver::new(&documents);
  let pet = component("Pet");

  let first = resolver.resolve(&pet, &pet).unwrap();
  let second = resolver.resolve(&pet, &pet).unwrap();

  assert!(Rc::ptr_eq(&first, &second));
  assert!(matches!(first.kind, NodeKind::Object(_)));
}

#[test]
fn missing_pointer_reports_its_origin() {
  let documents = documents();
  let mut resolver = Resolver::new(&documents);
  let origin = Pointer::root("").child("paths");

  let error = resolver.resolve(&component("Nope"), &origin).unwrap_err();

  assert_eq!(
    error,
    CompileError::SchemaResolution {
      pointer: "#/components/schemas/Nope".to_string(),
      origin: "#/paths".to_string(),
    }
  );
}

#[test]
fn reentering_a_pointer_reports_the_cycle_chain() {
  let documents = documents();
  let mut resolver = Resolver::new(&documents);
  let a = component("A");
  let b = component("B");

  assert_eq!(resolver.enter(&a), Reentry::Fresh);
  assert_eq!(resolver.enter(&b), Reentry::Fresh);
  assert_eq!(resolver.enter(&a), Reentry::Cycle(vec![a.clone(), b.clone(), a.clone()]));

  resolver.leave(&b);
  resolver.leave(&a);
  assert_eq!(resolver.enter(&a), Reentry::Fresh);
}

#[test]
fn follow_crosses_documents_and_rejects_loops() {
  let documents = documents();
  let resolver = Resolver::new(&documents);
  let responses = Pointer::root("").child("components").child("responses");

  let (problem, at) = resolver.follow(response(&documents, "Alias"), &responses.child("Alias")).unwrap();
  assert_eq!(problem, &json!({ "description": "Problem" }));
  assert_eq!(at.to_string(), "errors.json#/Problem");

  assert!(matches!(
    resolver.follow(response(&documents, "NotFound"), &responses.child("NotFound")),
    Err(CompileError::SchemaResolution { ref pointer, .. }) if pointer == "#/components/responses/Missing"
  ));

  assert!(resolver.follow(response(&documents, "Loop"), &responses.child("Loop")).is_err());
}

#[test]
fn unknown_types_are_collected_as_warnings() {
  let documents = documents();
  let mut resolver = Resolver::new(&documents);
  let odd = component("Odd");

  resolver.resolve(&odd, &odd).unwrap();

  assert_eq!(
    resolver.take_warnings(),
    vec![GenerationWarning::UnknownSchemaType {
      path: "#/components/schemas/Odd".to_string(),
      value: "decimal".to_string(),
    }]
  );
  assert!(resolver.take_warnings().is_empty());
}
