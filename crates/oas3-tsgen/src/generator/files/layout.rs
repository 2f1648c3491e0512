use super::Placement;
use crate::generator::naming::identifiers::to_file_stem;

/// Maps declarations to output paths.
///
/// Paths are relative, `/`-separated and carry the `.ts` extension. The compiler never touches
/// storage, so hosts can map these onto a plain directory or a virtual project tree.
pub trait PathStrategy {
  fn declaration_path(&self, placement: &Placement, name: &str) -> String;

  /// Path of the barrel file re-exporting every declaration.
  fn index_path(&self) -> String {
    "index.ts".to_string()
  }
}

/// `common/<name>.ts` for shared declarations, `operations/<operation>/<name>.ts` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLayout;

impl PathStrategy for TreeLayout {
  fn declaration_path(&self, placement: &Placement, name: &str) -> String {
    match placement {
      Placement::Common => format!("common/{}.ts", to_file_stem(name)),
      Placement::Operation(operation_id) => {
        format!("operations/{}/{}.ts", to_file_stem(operation_id), to_file_stem(name))
      }
    }
  }
}

/// Every declaration next to the barrel, `<name>.ts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLayout;

impl PathStrategy for FlatLayout {
  fn declaration_path(&self, _placement: &Placement, name: &str) -> String {
    format!("{}.ts", to_file_stem(name))
  }
}
