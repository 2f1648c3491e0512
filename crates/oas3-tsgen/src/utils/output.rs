use std::path::PathBuf;

use anyhow::Context;

use crate::generator::files::GeneratedFile;

/// Destination for generated files. Paths are relative and `/`-separated.
pub(crate) trait FileSink {
  async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()>;
}

/// Writes files below a directory, creating parent directories as needed.
pub struct DirectorySink {
  root: PathBuf,
}

impl DirectorySink {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn resolve(&self, path: &str) -> PathBuf {
    path
      .split('/')
      .filter(|segment| !segment.is_empty())
      .fold(self.root.clone(), |dir, segment| dir.join(segment))
  }
}

impl FileSink for DirectorySink {
  async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()> {
    let target = self.resolve(path);
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&target, contents)
      .await
      .with_context(|| format!("failed to write {}", target.display()))
  }
}

pub(crate) async fn write_all(sink: &impl FileSink, files: &[GeneratedFile]) -> anyhow::Result<()> {
  for file in files {
    sink.write(&file.path, &file.contents).await?;
  }
  Ok(())
}

/// Collects files in memory, keyed by path.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
  pub files: std::sync::Mutex<std::collections::BTreeMap<String, String>>,
}

#[cfg(test)]
impl FileSink for MemorySink {
  async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()> {
    self
      .files
      .lock()
      .map_err(|_| anyhow::anyhow!("sink poisoned"))?
      .insert(path.to_string(), contents.to_string());
    Ok(())
  }
}
