//! File assignment and import rendering.
//!
//! Declarations that reference each other in a cycle (a strongly connected component of the
//! declaration graph) share one file. The file graph is therefore the acyclic condensation of
//! the declaration graph, so no file ever imports a file that depends back on it.

pub(crate) mod imports;
pub mod layout;

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use itertools::Itertools;
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

pub use layout::{FlatLayout, PathStrategy, TreeLayout};

use self::imports::{declared_names, import_statement, relative_specifier};
use crate::generator::errors::{CompileError, CompileResult};

/// Where a declaration belongs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placement {
  /// Shared location, imported by every consumer.
  Common,
  /// Next to the operation with this id.
  Operation(String),
}

/// A rendered output file. `path` is relative and `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
  pub path: String,
  pub contents: String,
}

/// One emitted declaration with the names of the declarations it directly references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeclarationUnit {
  pub name: String,
  pub text: String,
  pub placement: Placement,
  pub dependencies: Vec<String>,
}

pub(crate) struct FileAssembler<'s> {
  strategy: &'s dyn PathStrategy,
  header: Option<&'s str>,
}

struct FileGroup {
  members: Vec<usize>,
  path: String,
  body: String,
  names: Vec<String>,
}

impl<'s> FileAssembler<'s> {
  pub(crate) fn new(strategy: &'s dyn PathStrategy, header: Option<&'s str>) -> Self {
    Self { strategy, header }
  }

  /// Assigns every unit a file and renders all files plus the index barrel, sorted by path.
  pub(crate) fn assemble(&self, units: &[DeclarationUnit]) -> CompileResult<Vec<GeneratedFile>> {
    if units.is_empty() {
      return Ok(vec![]);
    }

    let index_of: HashMap<&str, usize> = units
      .iter()
      .enumerate()
      .map(|(index, unit)| (unit.name.as_str(), index))
      .collect();

    let mut graph = DiGraphMap::<usize, ()>::new();
    for (index, unit) in units.iter().enumerate() {
      graph.add_node(index);
      for dependency in &unit.dependencies {
        let Some(&target) = index_of.get(dependency.as_str()) else {
          return Err(CompileError::DependencyGraph {
            declaration: dependency.clone(),
            chain: vec![unit.name.clone(), dependency.clone()],
          });
        };
        graph.add_edge(index, target, ());
      }
    }

    let groups = self.group(units, &graph);
    let group_of: HashMap<usize, usize> = groups
      .iter()
      .enumerate()
      .flat_map(|(group, file)| file.members.iter().map(move |member| (*member, group)))
      .collect();

    let mut files = Vec::with_capacity(groups.len() + 1);
    for (current, group) in groups.iter().enumerate() {
      let targets: IndexSet<usize> = group
        .members
        .iter()
        .flat_map(|member| &units[*member].dependencies)
        .filter_map(|dependency| index_of.get(dependency.as_str()))
        .filter_map(|target| group_of.get(target).copied())
        .filter(|target| *target != current)
        .collect();

      let mut imports = vec![];
      for target in targets {
        let file = &groups[target];
        if file.names.is_empty() {
          return Err(CompileError::DependencyGraph {
            declaration: units[file.members[0]].name.clone(),
            chain: vec![group.path.clone(), file.path.clone()],
          });
        }
        imports.push((relative_specifier(&group.path, &file.path), file.names.clone()));
      }
      imports.sort_by(|a, b| a.0.cmp(&b.0));

      let mut contents = self.preamble();
      for (specifier, names) in &imports {
        contents.push_str(&import_statement(names, specifier));
        contents.push('\n');
      }
      if !imports.is_empty() {
        contents.push('\n');
      }
      contents.push_str(&group.body);

      files.push(GeneratedFile {
        path: group.path.clone(),
        contents,
      });
    }

    files.push(self.index(&groups));
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
  }

  /// Strongly connected components, ordered by their first member; each becomes one file.
  fn group(&self, units: &[DeclarationUnit], graph: &DiGraphMap<usize, ()>) -> Vec<FileGroup> {
    let mut components: Vec<Vec<usize>> = kosaraju_scc(graph)
      .into_iter()
      .map(|mut members| {
        members.sort_unstable();
        members
      })
      .collect();
    components.sort_by_key(|members| members[0]);

    let mut used_paths = HashSet::from([self.strategy.index_path()]);
    components
      .into_iter()
      .map(|members| {
        let owner = &units[members[0]];
        let placement = if members.iter().all(|member| units[*member].placement == owner.placement) {
          owner.placement.clone()
        } else {
          Placement::Common
        };

        let path = unique_path(self.strategy.declaration_path(&placement, &owner.name), &used_paths);
        used_paths.insert(path.clone());

        let body = members.iter().map(|member| units[*member].text.trim_end()).join("\n\n") + "\n";
        let names = declared_names(&body);
        FileGroup {
          members,
          path,
          body,
          names,
        }
      })
      .collect()
  }

  fn index(&self, groups: &[FileGroup]) -> GeneratedFile {
    let path = self.strategy.index_path();
    let mut contents = self.preamble();
    for group in groups.iter().sorted_by(|a, b| a.path.cmp(&b.path)) {
      if group.names.is_empty() {
        continue;
      }
      contents.push_str(&format!(
        "export type {{ {} }} from '{}';\n",
        group.names.join(", "),
        relative_specifier(&path, &group.path)
      ));
    }
    GeneratedFile { path, contents }
  }

  fn preamble(&self) -> String {
    match self.header {
      Some(header) if !header.trim().is_empty() => format!("{}\n\n", header.trim_end()),
      _ => String::new(),
    }
  }
}

fn unique_path(path: String, used: &HashSet<String>) -> String {
  if !used.contains(&path) {
    return path;
  }
  let stem = path.strip_suffix(".ts").unwrap_or(&path).to_string();
  let mut suffix = 2;
  loop {
    let candidate = format!("{stem}-{suffix}.ts");
    if !used.contains(&candidate) {
      return candidate;
    }
    suffix += 1;
  }
}

#[cfg(test)]
mod tests;
