//! Reference resolution across the root document and its external documents.

use std::{collections::HashMap, mem, rc::Rc};

use indexmap::IndexMap;
use serde_json::Value;

use crate::generator::{
  errors::{CompileError, CompileResult},
  metrics::GenerationWarning,
  schema::{Pointer, SchemaNode, parse_schema},
};

/// The root document plus every external document its references name, keyed by the document
/// identifier as written in the `$ref` (`common.yaml` in `common.yaml#/components/schemas/Uid`).
#[derive(Debug, Clone)]
pub struct DocumentSet {
  root: Value,
  external: IndexMap<String, Value>,
}

impl DocumentSet {
  pub fn new(root: Value) -> Self {
    Self {
      root,
      external: IndexMap::new(),
    }
  }

  #[cfg(test)]
  #[must_use]
  pub fn with_document(mut self, id: impl Into<String>, document: Value) -> Self {
    self.insert(id, document);
    self
  }

  pub fn insert(&mut self, id: impl Into<String>, document: Value) {
    self.external.insert(id.into(), document);
  }

  pub fn root(&self) -> &Value {
    &self.root
  }

  pub fn get(&self, id: &str) -> Option<&Value> {
    if id.is_empty() {
      Some(&self.root)
    } else {
      self.external.get(id)
    }
  }
}

/// Outcome of entering a pointer for construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reentry {
  Fresh,
  /// The pointer is already under construction; the chain runs from its first entry back to it.
  Cycle(Vec<Pointer>),
}

/// Resolves pointers to parsed [`SchemaNode`]s, caching one node per canonical pointer.
///
/// The resolver also tracks which pointers are currently being converted. Entering one of them
/// again is reported as [`Reentry::Cycle`] instead of being followed.
pub(crate) struct Resolver<'d> {
  documents: &'d DocumentSet,
  nodes: HashMap<Pointer, Rc<SchemaNode>>,
  in_progress: Vec<Pointer>,
  warnings: Vec<GenerationWarning>,
}

impl<'d> Resolver<'d> {
  pub(crate) fn new(documents: &'d DocumentSet) -> Self {
    Self {
      documents,
      nodes: HashMap::new(),
      in_progress: vec![],
      warnings: vec![],
    }
  }

  pub(crate) fn documents(&self) -> &'d DocumentSet {
    self.documents
  }

  /// The raw JSON at `pointer`. `origin` is reported when nothing is there.
  pub(crate) fn raw(&self, pointer: &Pointer, origin: &Pointer) -> CompileResult<&'d Value> {
    self
      .documents
      .get(pointer.document())
      .and_then(|document| document.pointer(pointer.fragment()))
      .ok_or_else(|| CompileError::resolution(pointer.to_string(), origin.to_string()))
  }

  /// Follows `$ref` chains of non-schema objects (parameters, request bodies, responses) until a
  /// concrete object is reached. Returns the object and its canonical location.
  pub(crate) fn follow(&self, value: &'d Value, at: &Pointer) -> CompileResult<(&'d Value, Pointer)> {
    let mut value = value;
    let mut location = at.clone();
    let mut visited: Vec<Pointer> = vec![];

    while let Some(reference) = value.get("$ref").and_then(Value::as_str) {
      let target = Pointer::parse(reference, location.document());
      if visited.contains(&target) {
        return Err(CompileError::resolution(target.to_string(), location.to_string()));
      }
      value = self.raw(&target, &location)?;
      visited.push(target.clone());
      location = target;
    }

    Ok((value, location))
  }

  /// Parses (once) and returns the schema node at `pointer`.
  pub(crate) fn resolve(&mut self, pointer: &Pointer, origin: &Pointer) -> CompileResult<Rc<SchemaNode>> {
    if let Some(node) = self.nodes.get(pointer) {
      return Ok(Rc::clone(node));
    }
    let raw = self.raw(pointer, origin)?;
    let node = Rc::new(parse_schema(raw, pointer, &mut self.warnings));
    self.nodes.insert(pointer.clone(), Rc::clone(&node));
    Ok(node)
  }

  pub(crate) fn enter(&mut self, pointer: &Pointer) -> Reentry {
    if let Some(start) = self.in_progress.iter().position(|entered| entered == pointer) {
      let mut chain = self.in_progress[start..].to_vec();
      chain.push(pointer.clone());
      return Reentry::Cycle(chain);
    }
    self.in_progress.push(pointer.clone());
    Reentry::Fresh
  }

  pub(crate) fn leave(&mut self, pointer: &Pointer) {
    if self.in_progress.last() == Some(pointer) {
      self.in_progress.pop();
    }
  }

  pub(crate) fn take_warnings(&mut self) -> Vec<GenerationWarning> {
    mem::take(&mut self.warnings)
  }
}
