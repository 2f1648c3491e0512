use serde_json::Value;

use crate::generator::{
  files::GeneratedFile,
  orchestrator::{Compilation, CompileConfig, Orchestrator},
  resolver::DocumentSet,
  schema::Pointer,
};

pub(super) const PETSTORE: &str = include_str!("../../../fixtures/petstore.json");
pub(super) const SHARED_ROOT: &str = include_str!("../../../fixtures/shared_root.json");
pub(super) const SHARED_COMMON: &str = include_str!("../../../fixtures/shared_common.json");

pub(super) fn parse_document(json: &str) -> Value {
  serde_json::from_str(json).expect("failed to parse test document")
}

pub(super) fn petstore() -> DocumentSet {
  DocumentSet::new(parse_document(PETSTORE))
}

pub(super) fn shared() -> DocumentSet {
  DocumentSet::new(parse_document(SHARED_ROOT)).with_document("common.json", parse_document(SHARED_COMMON))
}

pub(super) fn component(name: &str) -> Pointer {
  Pointer::root("").child("components").child("schemas").child(name)
}

pub(super) fn compile(documents: DocumentSet, config: CompileConfig) -> Compilation {
  Orchestrator::new(documents, config).compile().expect("compilation failed")
}

pub(super) fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
  files
    .iter()
    .find(|file| file.path == path)
    .map(|file| file.contents.as_str())
    .unwrap_or_else(|| panic!("no file '{path}' in {:?}", paths(files)))
}

pub(super) fn paths(files: &[GeneratedFile]) -> Vec<&str> {
  files.iter().map(|file| file.path.as_str()).collect()
}
