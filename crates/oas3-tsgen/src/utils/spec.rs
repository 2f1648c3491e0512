use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use indexmap::IndexSet;
use serde_json::Value;

use crate::generator::resolver::DocumentSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }
}

/// A memory-mapped specification file.
pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Self {
      file,
      format: SpecFormat::from_path(path),
    })
  }

  /// The raw document tree, the form the compiler works on.
  pub fn document(&self) -> anyhow::Result<Value> {
    match self.format {
      SpecFormat::Json => Ok(serde_json::from_slice(self.file.as_slice())?),
      SpecFormat::Yaml => Ok(serde_yaml::from_slice(self.file.as_slice())?),
    }
  }

  /// The typed OpenAPI view, used for document metadata.
  pub fn parse(&self) -> anyhow::Result<oas3::Spec> {
    match self.format {
      SpecFormat::Json => Ok(serde_json::from_slice::<oas3::Spec>(self.file.as_slice())?),
      SpecFormat::Yaml => {
        let content = std::str::from_utf8(self.file.as_slice())?;
        Ok(oas3::from_yaml(content)?)
      }
    }
  }
}

/// Supplies external documents named by `$ref` values.
pub(crate) trait DocumentSource {
  async fn load(&self, id: &str) -> anyhow::Result<Value>;
}

/// Reads external documents from disk, relative to the root document's directory.
pub struct FsDocumentSource {
  base_dir: PathBuf,
}

impl FsDocumentSource {
  pub fn new(root_path: &Path) -> Self {
    Self {
      base_dir: root_path.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
  }
}

impl DocumentSource for FsDocumentSource {
  async fn load(&self, id: &str) -> anyhow::Result<Value> {
    SpecLoader::open(&self.base_dir.join(id)).await?.document()
  }
}

/// Builds the document set for `root`, loading every document its references name,
/// transitively. Remote (`scheme://`) documents are left out; references into them surface as
/// resolution errors during compilation.
pub(crate) async fn load_document_set(root: Value, source: &impl DocumentSource) -> anyhow::Result<DocumentSet> {
  let mut pending: Vec<String> = external_documents(&root).into_iter().collect();
  let mut documents = DocumentSet::new(root);
  let mut loaded: IndexSet<String> = IndexSet::new();

  while let Some(id) = pending.pop() {
    if !loaded.insert(id.clone()) {
      continue;
    }
    let document = source
      .load(&id)
      .await
      .with_context(|| format!("failed to load referenced document '{id}'"))?;
    pending.extend(external_documents(&document).into_iter().filter(|next| !loaded.contains(next)));
    documents.insert(id, document);
  }

  Ok(documents)
}

/// Document parts of every `$ref` inside `value`, in first-seen order.
pub(crate) fn external_documents(value: &Value) -> IndexSet<String> {
  let mut found = IndexSet::new();
  collect_documents(value, &mut found);
  found
}

fn collect_documents(value: &Value, found: &mut IndexSet<String>) {
  match value {
    Value::Object(map) => {
      if let Some(Value::String(reference)) = map.get("$ref") {
        let document = reference.split_once('#').map_or(reference.as_str(), |(document, _)| document);
        if !document.is_empty() && !document.contains("://") {
          found.insert(document.to_string());
        }
      }
      for child in map.values() {
        collect_documents(child, found);
      }
    }
    Value::Array(items) => {
      for item in items {
        collect_documents(item, found);
      }
    }
    _ => {}
  }
}

/// External documents held in memory, keyed by identifier.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryDocumentSource(pub std::collections::HashMap<String, Value>);

#[cfg(test)]
impl DocumentSource for MemoryDocumentSource {
  async fn load(&self, id: &str) -> anyhow::Result<Value> {
    self
      .0
      .get(id)
      .cloned()
      .ok_or_else(|| anyhow::anyhow!("no document '{id}'"))
  }
}
