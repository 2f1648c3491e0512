use std::collections::HashMap;

use super::{fingerprint::SchemaFingerprint, identifiers::to_type_name};
use crate::generator::{
  errors::{CompileError, CompileResult},
  schema::Pointer,
};

/// Run-scoped registry of declaration names.
///
/// A name is owned by the fingerprint that claimed it first. A later claim with the same
/// fingerprint receives the same name; any other claim receives the next free numeric suffix.
#[derive(Debug, Default)]
pub(crate) struct NamingContext {
  owners: HashMap<String, SchemaFingerprint>,
  assigned: HashMap<Pointer, String>,
}

impl NamingContext {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Returns the name for the declaration at `location`, claiming one derived from `base` on
  /// first use.
  pub(crate) fn name_for(
    &mut self,
    location: &Pointer,
    base: &str,
    fingerprint: SchemaFingerprint,
  ) -> CompileResult<String> {
    if let Some(name) = self.assigned.get(location) {
      return Ok(name.clone());
    }
    let type_name = to_type_name(base).ok_or_else(|| CompileError::naming(location.to_string()))?;
    let name = self.claim(&type_name, fingerprint);
    self.assigned.insert(location.clone(), name.clone());
    Ok(name)
  }

  fn claim(&mut self, base: &str, fingerprint: SchemaFingerprint) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    loop {
      match self.owners.get(&candidate) {
        Some(owner) if *owner == fingerprint => return candidate,
        Some(_) => {
          candidate = format!("{base}{suffix}");
          suffix += 1;
        }
        None => {
          self.owners.insert(candidate.clone(), fingerprint);
          return candidate;
        }
      }
    }
  }
}
