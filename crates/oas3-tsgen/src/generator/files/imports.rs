use std::sync::LazyLock;

use regex::Regex;

static DECLARED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^export (?:type|interface|const|enum|class) ([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

/// Top-level names declared by rendered source, in order of appearance.
pub(crate) fn declared_names(source: &str) -> Vec<String> {
  let mut names: Vec<String> = vec![];
  for captures in DECLARED_NAME_RE.captures_iter(source) {
    let name = captures[1].to_string();
    if !names.contains(&name) {
      names.push(name);
    }
  }
  names
}

/// Module specifier of `to` as seen from `from`, both relative output paths. The `.ts`
/// extension is dropped: `operations/list-pets/x.ts` to `common/pet.ts` is `../../common/pet`.
pub(crate) fn relative_specifier(from: &str, to: &str) -> String {
  let mut from_dir: Vec<&str> = from.split('/').collect();
  from_dir.pop();
  let target: Vec<&str> = to.split('/').collect();
  let (target_file, target_dir) = target.split_last().map_or(("", &[][..]), |(file, dir)| (*file, dir));

  let shared = from_dir
    .iter()
    .zip(target_dir)
    .take_while(|(left, right)| left == right)
    .count();

  let mut segments: Vec<&str> = target_dir[shared..].to_vec();
  let stem = target_file.strip_suffix(".ts").unwrap_or(target_file);
  segments.push(stem);

  let ups = from_dir.len() - shared;
  if ups == 0 {
    format!("./{}", segments.join("/"))
  } else {
    format!("{}{}", "../".repeat(ups), segments.join("/"))
  }
}

pub(crate) fn import_statement(names: &[String], specifier: &str) -> String {
  format!("import type {{ {} }} from '{specifier}';", names.join(", "))
}
