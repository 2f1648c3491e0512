use super::{
  DeclarationUnit, FileAssembler, FlatLayout, GeneratedFile, Placement, TreeLayout,
  imports::{declared_names, relative_specifier},
};
use crate::generator::errors::CompileError;

fn unit(name: &str, placement: Placement, dependencies: &[&str]) -> DeclarationUnit {
  DeclarationUnit {
    name: name.to_string(),
    text: if dependencies.is_empty() {
      format!("export type {name} = unknown;\n")
    } else {
      format!("export type {name} = {};\n", dependencies.join(" | "))
    },
    placement,
    dependencies: dependencies.iter().map(ToString::to_string).collect(),
  }
}

fn operation(id: &str) -> Placement {
  Placement::Operation(id.to_string())
}

fn find<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
  files
    .iter()
    .find(|file| file.path == path)
    .map(|file| file.contents.as_str())
    .unwrap_or_else(|| panic!("no file '{path}'"))
}

fn paths(files: &[GeneratedFile]) -> Vec<&str> {
  files.iter().map(|file| file.path.as_str()).collect()
}

#[test]
fn self_dependency_needs_no_import() {
  let units = [unit("Tree", Placement::Common, &["Tree"])];

  let files = FileAssembler::new(&TreeLayout, None).assemble(&units).unwrap();

  assert_eq!(paths(&files), vec!["common/tree.ts", "index.ts"]);
  assert_eq!(find(&files, "common/tree.ts"), "export type Tree = Tree;\n");
}

#[test]
fn mutually_dependent_declarations_share_a_file() {
  let units = [
    unit("A", Placement::Common, &["B"]),
    unit("B", operation("getB"), &["A"]),
    unit("C", operation("getC"), &["A"]),
  ];

  let files = FileAssembler::new(&TreeLayout, None).assemble(&units).unwrap();

  assert_eq!(paths(&files), vec!["common/a.ts", "index.ts", "operations/get-c/c.ts"]);
  assert_eq!(find(&files, "common/a.ts"), "export type A = B;\n\nexport type B = A;\n");
  assert_eq!(
    find(&files, "operations/get-c/c.ts"),
    "import type { A, B } from '../../common/a';\n\nexport type C = A;\n"
  );
  assert_eq!(
    find(&files, "index.ts"),
    "export type { A, B } from './common/a';\nexport type { C } from './operations/get-c/c';\n"
  );
}

#[test]
fn imports_are_sorted_by_specifier() {
  let units = [
    unit("Response", operation("listPets"), &["Pet", "Error"]),
    unit("Pet", Placement::Common, &[]),
    unit("Error", Placement::Common, &[]),
  ];

  let files = FileAssembler::new(&TreeLayout, None).assemble(&units).unwrap();

  assert!(find(&files, "operations/list-pets/response.ts").starts_with(
    "import type { Error } from '../../common/error';\nimport type { Pet } from '../../common/pet';\n\n"
  ));
}

#[test]
fn unknown_dependency_is_a_graph_error() {
  let units = [unit("A", Placement::Common, &["Missing"])];

  let error = FileAssembler::new(&TreeLayout, None).assemble(&units).unwrap_err();

  assert_eq!(
    error,
    CompileError::DependencyGraph {
      declaration: "Missing".to_string(),
      chain: vec!["A".to_string(), "Missing".to_string()],
    }
  );
}

#[test]
fn header_precedes_every_file() {
  let units = [unit("Pet", Placement::Common, &[])];

  let files = FileAssembler::new(&TreeLayout, Some("// generated\n")).assemble(&units).unwrap();

  assert_eq!(find(&files, "common/pet.ts"), "// generated\n\nexport type Pet = unknown;\n");
  assert_eq!(find(&files, "index.ts"), "// generated\n\nexport type { Pet } from './common/pet';\n");
}

#[test]
fn blank_header_is_ignored() {
  let units = [unit("Pet", Placement::Common, &[])];

  let files = FileAssembler::new(&TreeLayout, Some("  ")).assemble(&units).unwrap();

  assert_eq!(find(&files, "common/pet.ts"), "export type Pet = unknown;\n");
}

#[test]
fn flat_layout_never_overwrites_the_index() {
  let units = [unit("Index", Placement::Common, &[]), unit("User", operation("getUser"), &["Index"])];

  let files = FileAssembler::new(&FlatLayout, None).assemble(&units).unwrap();

  assert_eq!(paths(&files), vec!["index-2.ts", "index.ts", "user.ts"]);
  assert!(find(&files, "user.ts").starts_with("import type { Index } from './index-2';\n"));
  assert!(find(&files, "index.ts").starts_with("export type { Index } from './index-2';\n"));
}

#[test]
fn no_units_no_files() {
  assert!(FileAssembler::new(&TreeLayout, None).assemble(&[]).unwrap().is_empty());
}

#[test]
fn relative_specifiers() {
  assert_eq!(relative_specifier("operations/list-pets/x.ts", "common/pet.ts"), "../../common/pet");
  assert_eq!(relative_specifier("index.ts", "common/pet.ts"), "./common/pet");
  assert_eq!(relative_specifier("common/a.ts", "common/b.ts"), "./b");
  assert_eq!(relative_specifier("common/a.ts", "index.ts"), "../index");
  assert_eq!(relative_specifier("a.ts", "b.ts"), "./b");
}

#[test]
fn declared_names_follow_source_order() {
  let source = "/** Doc */\nexport type Pet = {\n  name: string;\n};\n\nexport type Owner<\n  T1 extends 200 = 200,\n> = \
                T1;\nexport type Pet = string;\n";

  assert_eq!(declared_names(source), vec!["Pet", "Owner"]);
  assert!(declared_names("const x = 1;\n").is_empty());
}
