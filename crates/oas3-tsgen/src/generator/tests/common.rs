use std::collections::HashMap;

use crate::generator::{common::extract_common_dependencies, errors::CompileError};

fn texts(entries: &[(usize, &'static str)]) -> HashMap<usize, &'static str> {
  entries.iter().copied().collect()
}

#[test]
fn shared_uid_is_hoisted_with_one_canonical_copy() {
  // 0 and 2 are independently resolved copies of Uid.
  let texts = texts(&[
    (0, "export type Uid = string;\n"),
    (1, "export type Task = { id: Uid };\n"),
    (2, "export type Uid = string;\n"),
    (3, "export type Group = { id: Uid };\n"),
  ]);

  let result = extract_common_dependencies(
    vec![vec![0, 1], vec![2, 3]],
    |key| texts.get(&key).copied(),
    |key| format!("#{key}"),
  )
  .unwrap();

  assert_eq!(result.common, vec![0]);
  assert_eq!(result.per_operation, vec![vec![0, 1], vec![0, 3]]);
  assert_eq!(result.private(0), vec![1]);
  assert_eq!(result.private(1), vec![3]);
}

#[test]
fn single_operation_makes_every_dependency_common() {
  let texts = texts(&[(0, "a"), (1, "b"), (2, "a")]);

  let result =
    extract_common_dependencies(vec![vec![0, 1, 2]], |key| texts.get(&key).copied(), |key| key.to_string()).unwrap();

  assert_eq!(result.common, vec![0, 1]);
  assert_eq!(result.per_operation, vec![vec![0, 1]]);
  assert!(result.private(0).is_empty());
}

#[test]
fn canonical_representative_is_first_seen_across_pairs() {
  let texts = texts(&[(0, "uid"), (1, "task"), (2, "group"), (3, "uid"), (4, "group")]);

  let result = extract_common_dependencies(
    vec![vec![0, 1], vec![2], vec![3, 4]],
    |key| texts.get(&key).copied(),
    |key| key.to_string(),
  )
  .unwrap();

  assert_eq!(result.common, vec![0, 2]);
  assert_eq!(result.per_operation[2], vec![0, 2]);
  assert_eq!(result.private(0), vec![1]);
  assert!(result.private(1).is_empty());
  assert!(result.private(2).is_empty());
}

#[test]
fn unrelated_operations_share_nothing() {
  let texts = texts(&[(0, "a"), (1, "b")]);

  let result =
    extract_common_dependencies(vec![vec![0], vec![1]], |key| texts.get(&key).copied(), |key| key.to_string())
      .unwrap();

  assert!(result.common.is_empty());
  assert_eq!(result.private(0), vec![0]);
  assert_eq!(result.private(1), vec![1]);
}

#[test]
fn dependency_without_text_is_an_error() {
  let texts = texts(&[(0, "a")]);

  let error = extract_common_dependencies(
    vec![vec![0], vec![7]],
    |key| texts.get(&key).copied(),
    |key| format!("Decl{key}"),
  )
  .unwrap_err();

  assert!(matches!(error, CompileError::DependencyGraph { ref declaration, .. } if declaration == "Decl7"));
}

#[test]
fn many_operations_sharing_many_declarations() {
  // Operation `o` depends on the shared declarations 0..100 and on its own key 1000 + o.
  let mut texts: HashMap<usize, String> = (0..100).map(|shared| (shared, format!("shared {shared}"))).collect();
  let lists: Vec<Vec<usize>> = (0..300)
    .map(|operation| {
      texts.insert(1000 + operation, format!("own {operation}"));
      (0..100).chain([1000 + operation]).collect()
    })
    .collect();

  let result =
    extract_common_dependencies(lists, |key| texts.get(&key).map(String::as_str), |key| key.to_string()).unwrap();

  assert_eq!(result.common, (0..100).collect::<Vec<_>>());
  assert_eq!(result.per_operation.len(), 300);
  assert_eq!(result.private(299), vec![1299]);
  assert!(result.is_common(42));
  assert!(!result.is_common(1000));
}

#[test]
fn shared_tier_follows_pairwise_discovery_order() {
  // "b" is first shared by lists 0 and 1, "a" only by lists 0 and 2.
  let texts = texts(&[(0, "a"), (1, "b"), (2, "b"), (3, "a")]);

  let result = extract_common_dependencies(
    vec![vec![0, 1], vec![2], vec![3]],
    |key| texts.get(&key).copied(),
    |key| key.to_string(),
  )
  .unwrap();

  assert_eq!(result.common, vec![1, 0]);
  assert_eq!(result.per_operation, vec![vec![0, 1], vec![1], vec![0]]);
}
