//! Keyed dispatch rendered as a generic conditional type.
//!
//! A response selected by status code then content type becomes
//!
//! ```text
//! export type ListPetsResponse<
//!   T1 extends 200 | 404 = 200 | 404,
//!   T2 extends 'application/json' = 'application/json',
//! > = T1 extends 200
//!   ? T2 extends 'application/json'
//!     ? Pet[]
//!     : unknown
//!   : T1 extends 404
//!     ? T2 extends 'application/json'
//!       ? Error
//!       : unknown
//!     : unknown;
//! ```

use indexmap::IndexSet;
use itertools::Itertools;

use super::{Renderer, documentation::inline_doc};
use crate::generator::{
  descriptor::{DescriptorContext, DescriptorId, SelectorChild, SelectorLeaf, SelectorShape, Shape},
  errors::{CompileError, CompileResult},
  naming::identifiers::quote_string,
  schema::SelectorKey,
};

/// Selector variables are named `T1` through `T7`.
pub(crate) const MAX_SELECTOR_DIMENSIONS: usize = 7;

/// Literal keys per dimension, collected breadth-first across every branch and deduplicated in
/// first-seen order.
pub(crate) fn dimension_keys(ctx: &DescriptorContext<'_>, id: DescriptorId) -> Vec<IndexSet<SelectorKey>> {
  let mut dimensions = vec![];
  let mut frontier = vec![id];

  while !frontier.is_empty() {
    let mut keys = IndexSet::new();
    let mut next = vec![];
    for current in frontier {
      let Shape::Selector(selector) = &ctx.get(current).shape else {
        continue;
      };
      for (key, child) in &selector.children {
        keys.insert(key.clone());
        if let SelectorChild::Nested(nested) = child {
          next.push(*nested);
        }
      }
    }
    if keys.is_empty() {
      break;
    }
    dimensions.push(keys);
    frontier = next;
  }

  dimensions
}

pub(crate) fn render_selector(renderer: &Renderer<'_, '_>, id: DescriptorId, name: &str) -> CompileResult<String> {
  let ctx = renderer.context();
  let descriptor = ctx.get(id);
  let Shape::Selector(selector) = &descriptor.shape else {
    return Ok(format!("export type {name} = unknown;\n"));
  };

  let dimensions = dimension_keys(ctx, id);
  if dimensions.len() > MAX_SELECTOR_DIMENSIONS {
    return Err(CompileError::TooManyDimensions {
      path: descriptor.original_schema_path.to_string(),
      dimensions: dimensions.len(),
      max: MAX_SELECTOR_DIMENSIONS,
    });
  }
  if dimensions.is_empty() {
    return Ok(format!("export type {name} = unknown;\n"));
  }

  let mut text = format!("export type {name}<\n");
  for (depth, keys) in dimensions.iter().enumerate() {
    let union = keys.iter().map(key_literal).join(" | ");
    text.push_str(&format!("  {} extends {union} = {union},\n", parameter(depth)));
  }
  text.push_str(&format!("> = {};\n", SelectorChain { renderer, ctx }.chain(selector, 0, 0)));
  Ok(text)
}

struct SelectorChain<'r, 'c, 'd> {
  renderer: &'r Renderer<'c, 'd>,
  ctx: &'c DescriptorContext<'d>,
}

impl SelectorChain<'_, '_, '_> {
  /// `Td extends k ? <branch> : <rest>` over every key of `selector`, ending in `unknown`.
  fn chain(&self, selector: &SelectorShape, depth: usize, indent: usize) -> String {
    let entries: Vec<_> = selector.children.iter().collect();
    self.chain_from(&entries, depth, indent)
  }

  fn chain_from(&self, entries: &[(&SelectorKey, &SelectorChild)], depth: usize, indent: usize) -> String {
    let Some(((key, child), rest)) = entries.split_first() else {
      return "unknown".to_string();
    };
    let pad = " ".repeat(indent + 2);
    format!(
      "{} extends {}\n{pad}? {}\n{pad}: {}",
      parameter(depth),
      key_literal(key),
      self.branch(child, depth, indent + 2),
      self.chain_from(rest, depth, indent + 2)
    )
  }

  fn branch(&self, child: &SelectorChild, depth: usize, indent: usize) -> String {
    match child {
      SelectorChild::Nested(nested) => match &self.ctx.get(*nested).shape {
        Shape::Selector(selector) => self.chain(selector, depth + 1, indent),
        _ => "unknown".to_string(),
      },
      SelectorChild::Leaves(leaves) => self.leaves(leaves, indent),
    }
  }

  /// Exclusive union of the leaves, each preceded by its documentation.
  fn leaves(&self, leaves: &[SelectorLeaf], indent: usize) -> String {
    if leaves.is_empty() {
      return "undefined".to_string();
    }
    leaves
      .iter()
      .map(|leaf| {
        let expr = self.renderer.reference(leaf.target, indent);
        match leaf.doc.as_deref().and_then(inline_doc) {
          Some(doc) => format!("{doc} {}", expr.text),
          None => expr.text,
        }
      })
      .join(" | ")
  }
}

fn parameter(depth: usize) -> String {
  format!("T{}", depth + 1)
}

fn key_literal(key: &SelectorKey) -> String {
  match key {
    SelectorKey::Number(number) => number.to_string(),
    SelectorKey::Text(text) => quote_string(text),
  }
}
