use std::fmt;

use percent_encoding::percent_decode_str;

/// Canonical location of a schema fragment: a document identifier plus a JSON pointer.
///
/// The root document has the empty identifier, so its pointers print as `#/components/...`,
/// while fragments of external documents print as `common.yaml#/components/...`. Fragments are
/// stored with percent-encoding decoded and JSON-pointer escaping (`~0`, `~1`) applied, which is
/// what `serde_json::Value::pointer` expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Pointer {
  document: String,
  fragment: String,
}

impl Pointer {
  pub(crate) fn root(document: &str) -> Self {
    Self {
      document: document.to_string(),
      fragment: String::new(),
    }
  }

  /// Parses a `$ref` value relative to the document that contains it.
  pub(crate) fn parse(reference: &str, base_document: &str) -> Self {
    let (document, fragment) = match reference.split_once('#') {
      Some(("", fragment)) => (base_document, fragment),
      Some((document, fragment)) => (document, fragment),
      None => (reference, ""),
    };

    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    Self {
      document: document.to_string(),
      fragment: decoded.into_owned(),
    }
  }

  pub(crate) fn document(&self) -> &str {
    &self.document
  }

  pub(crate) fn fragment(&self) -> &str {
    &self.fragment
  }

  #[must_use]
  pub(crate) fn child(&self, segment: &str) -> Self {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    Self {
      document: self.document.clone(),
      fragment: format!("{}/{escaped}", self.fragment),
    }
  }

  #[must_use]
  pub(crate) fn child_index(&self, index: usize) -> Self {
    self.child(&index.to_string())
  }

  /// Decoded pointer segments, `/components/schemas/a~1b` yields `["components", "schemas", "a/b"]`.
  pub(crate) fn segments(&self) -> Vec<String> {
    self
      .fragment
      .split('/')
      .skip(1)
      .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
      .collect()
  }

  pub(crate) fn last_segment(&self) -> Option<String> {
    self.segments().pop()
  }

  /// Returns the component name when the pointer addresses `#/components/<section>/<name>`.
  #[cfg(test)]
  pub(crate) fn component_name(&self, section: &str) -> Option<String> {
    match self.segments().as_slice() {
      [components, kind, name] if components == "components" && kind == section => Some(name.clone()),
      _ => None,
    }
  }
}

impl fmt::Display for Pointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.document, self.fragment)
  }
}
