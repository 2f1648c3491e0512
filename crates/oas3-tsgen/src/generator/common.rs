//! Hoisting of declarations shared between operations.

use std::{
  collections::{HashMap, HashSet},
  hash::Hash,
};

use crate::generator::errors::{CompileError, CompileResult};

/// Dependency lists after extraction: the shared tier plus every operation's rewritten list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommonDependencies<K: Eq + Hash> {
  /// One canonical representative per shared declaration, in first-seen order.
  pub common: Vec<K>,
  /// Each operation's dependencies with shared entries replaced by their canonical
  /// representative, deduplicated by text.
  pub per_operation: Vec<Vec<K>>,
  members: HashSet<K>,
}

impl<K: Copy + Eq + Hash> CommonDependencies<K> {
  pub(crate) fn is_common(&self, key: K) -> bool {
    self.members.contains(&key)
  }

  /// Dependencies of operation `index` that no other operation shares.
  pub(crate) fn private(&self, index: usize) -> Vec<K> {
    self
      .per_operation
      .get(index)
      .map(|list| list.iter().copied().filter(|key| !self.is_common(*key)).collect())
      .unwrap_or_default()
  }
}

/// Where a text class first turned up.
#[derive(Debug, Clone, Copy)]
struct Holders {
  first: usize,
  position: usize,
  second: Option<usize>,
}

/// Splits the operations' dependency lists into a common tier and private remainders.
///
/// Equality is rendered-text equality: two independently resolved declarations with identical
/// text are the same declaration. Every text is hashed once into a class; a class held by two or
/// more lists is shared, and its canonical representative is the first key seen with that text.
/// The common tier lists shared classes in the order a pairwise sweep over the lists meets them:
/// by the first list holding the class, then the second, then position in the first. With a
/// single list every entry is common.
///
/// `text_of` must know every key; a key without text is reported as a dependency graph error.
pub(crate) fn extract_common_dependencies<'t, K, F, N>(
  lists: Vec<Vec<K>>,
  text_of: F,
  name_of: N,
) -> CompileResult<CommonDependencies<K>>
where
  K: Copy + Eq + Hash,
  F: Fn(K) -> Option<&'t str>,
  N: Fn(K) -> String,
{
  let mut classes: HashMap<&'t str, usize> = HashMap::new();
  let mut representatives: Vec<K> = vec![];
  let mut holders: Vec<Holders> = vec![];
  let mut class_lists: Vec<Vec<usize>> = Vec::with_capacity(lists.len());

  for (owner, list) in lists.iter().enumerate() {
    let mut seen = HashSet::new();
    let mut class_list = vec![];
    for key in list {
      let rendered = text_of(*key).ok_or_else(|| CompileError::DependencyGraph {
        declaration: name_of(*key),
        chain: vec![format!("operation #{owner}"), name_of(*key)],
      })?;
      let next = representatives.len();
      let class = *classes.entry(rendered).or_insert(next);
      if class == next {
        representatives.push(*key);
        holders.push(Holders {
          first: owner,
          position: class_list.len(),
          second: None,
        });
      } else if seen.contains(&class) {
        continue;
      } else if holders[class].second.is_none() {
        holders[class].second = Some(owner);
      }
      seen.insert(class);
      class_list.push(class);
    }
    class_lists.push(class_list);
  }

  let shared_classes: Vec<usize> = if let [only] = class_lists.as_slice() {
    only.clone()
  } else {
    let mut shared: Vec<usize> = (0..holders.len()).filter(|class| holders[*class].second.is_some()).collect();
    shared.sort_by_key(|class| {
      let holder = holders[*class];
      (holder.first, holder.second, holder.position)
    });
    shared
  };

  let common: Vec<K> = shared_classes.iter().map(|class| representatives[*class]).collect();
  let per_operation = class_lists
    .into_iter()
    .map(|list| list.into_iter().map(|class| representatives[class]).collect())
    .collect();

  Ok(CommonDependencies {
    members: common.iter().copied().collect(),
    common,
    per_operation,
  })
}
