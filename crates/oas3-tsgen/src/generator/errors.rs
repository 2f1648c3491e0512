use thiserror::Error;

/// Fatal failures of a compilation run.
///
/// Every variant aborts the whole run; there is no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
  /// A reference pointer does not resolve to anything.
  #[error("unable to resolve reference '{pointer}' (referenced from '{origin}')")]
  SchemaResolution { pointer: String, origin: String },

  /// A declaration structurally requires a name and none can be derived.
  #[error("no type name can be derived for the schema at '{path}'")]
  Naming { path: String },

  /// A keyed selector nests deeper than the supported number of selector variables.
  #[error("selector '{path}' dispatches over {dimensions} dimensions, at most {max} are supported")]
  TooManyDimensions {
    path: String,
    dimensions: usize,
    max: usize,
  },

  /// A declaration is referenced by an emitted file but was never assigned a file of its own.
  #[error("declaration '{declaration}' is referenced but never emitted (chain: {})", chain.join(" -> "))]
  DependencyGraph { declaration: String, chain: Vec<String> },
}

impl CompileError {
  pub(crate) fn resolution(pointer: impl Into<String>, origin: impl Into<String>) -> Self {
    Self::SchemaResolution {
      pointer: pointer.into(),
      origin: origin.into(),
    }
  }

  pub(crate) fn naming(path: impl Into<String>) -> Self {
    Self::Naming { path: path.into() }
  }
}

pub type CompileResult<T> = Result<T, CompileError>;
