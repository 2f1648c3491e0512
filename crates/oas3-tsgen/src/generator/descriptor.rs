//! Type descriptors: the compiled unit rendered to declaration text.
//!
//! Descriptors live in an arena owned by [`DescriptorContext`] and refer to each other by
//! [`DescriptorId`], so a reference cycle in the source schemas is a cycle of indices rather than
//! of owned values.

use std::{collections::HashMap, rc::Rc};

use indexmap::{IndexMap, IndexSet};

use crate::generator::{
  naming::context::NamingContext,
  resolver::{DocumentSet, Resolver},
  schema::{CombinatorKind, Pointer, SchemaNode, SelectorKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DescriptorId(usize);

#[derive(Debug, Clone)]
pub(crate) struct TypeDescriptor {
  /// Present for declarations, which are emitted standalone and referenced by name.
  pub model_name: Option<String>,
  /// Fallback name for diagnostics and for naming anonymous children.
  pub suggested_model_name: String,
  pub original_schema_path: Pointer,
  pub schema: Rc<SchemaNode>,
  /// Distinct direct children, never the descriptor itself.
  pub dependencies: Vec<DescriptorId>,
  pub shape: Shape,
}

impl TypeDescriptor {
  pub(crate) fn is_declaration(&self) -> bool {
    self.model_name.is_some()
  }

  pub(crate) fn is_selector(&self) -> bool {
    matches!(self.shape, Shape::Selector(_))
  }

  pub(crate) fn display_name(&self) -> &str {
    self.model_name.as_deref().unwrap_or(&self.suggested_model_name)
  }
}

/// Compiled structure of a descriptor. Children are arena handles.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
  /// Registered but not finalized yet; seen only through a cycle.
  Pending,
  Any,
  Never,
  /// Primitive type and literals are read from the descriptor's schema.
  Primitive,
  Array(ArrayShape),
  Object(ObjectShape),
  Combinator { kind: CombinatorKind, members: Vec<DescriptorId> },
  /// Same type as the target; used for named references and nullable references.
  Alias(DescriptorId),
  Selector(SelectorShape),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArrayShape {
  Any,
  Single(DescriptorId),
  Tuple(Vec<DescriptorId>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropertyShape {
  pub name: String,
  pub target: DescriptorId,
  pub required: bool,
  pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AdditionalShape {
  Open,
  Closed,
  Typed(DescriptorId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObjectShape {
  pub properties: Vec<PropertyShape>,
  pub additional: AdditionalShape,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectorLeaf {
  pub target: DescriptorId,
  pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SelectorChild {
  /// Dispatch continues on the next dimension; the id is a nested selector descriptor.
  Nested(DescriptorId),
  /// Terminal key: the union of these leaves, in source order.
  Leaves(Vec<SelectorLeaf>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct SelectorShape {
  pub children: IndexMap<SelectorKey, SelectorChild>,
}

impl Shape {
  /// Direct children in declaration order, possibly with repeats.
  pub(crate) fn children(&self) -> Vec<DescriptorId> {
    match self {
      Self::Pending | Self::Any | Self::Never | Self::Primitive => vec![],
      Self::Array(ArrayShape::Any) => vec![],
      Self::Array(ArrayShape::Single(item)) => vec![*item],
      Self::Array(ArrayShape::Tuple(items)) => items.clone(),
      Self::Object(object) => {
        let mut ids: Vec<_> = object.properties.iter().map(|property| property.target).collect();
        if let AdditionalShape::Typed(id) = object.additional {
          ids.push(id);
        }
        ids
      }
      Self::Combinator { members, .. } => members.clone(),
      Self::Alias(target) => vec![*target],
      Self::Selector(selector) => selector
        .children
        .values()
        .flat_map(|child| match child {
          SelectorChild::Nested(id) => vec![*id],
          SelectorChild::Leaves(leaves) => leaves.iter().map(|leaf| leaf.target).collect(),
        })
        .collect(),
    }
  }
}

/// Run-scoped conversion state: the descriptor arena, the memo from canonical schema path to
/// descriptor, the naming context and the resolver.
pub(crate) struct DescriptorContext<'d> {
  pub(crate) resolver: Resolver<'d>,
  pub(crate) naming: NamingContext,
  descriptors: Vec<TypeDescriptor>,
  by_path: HashMap<Pointer, DescriptorId>,
  cycles: Vec<Vec<String>>,
}

impl<'d> DescriptorContext<'d> {
  pub(crate) fn new(documents: &'d DocumentSet) -> Self {
    Self {
      resolver: Resolver::new(documents),
      naming: NamingContext::new(),
      descriptors: vec![],
      by_path: HashMap::new(),
      cycles: vec![],
    }
  }

  pub(crate) fn get(&self, id: DescriptorId) -> &TypeDescriptor {
    &self.descriptors[id.0]
  }

  pub(crate) fn lookup(&self, path: &Pointer) -> Option<DescriptorId> {
    self.by_path.get(path).copied()
  }

  pub(crate) fn lookup_name(&self, name: &str) -> Option<DescriptorId> {
    self.ids().find(|id| self.get(*id).model_name.as_deref() == Some(name))
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.descriptors.len()
  }

  pub(crate) fn ids(&self) -> impl Iterator<Item = DescriptorId> + use<> {
    (0..self.descriptors.len()).map(DescriptorId)
  }

  pub(crate) fn cycles(&self) -> &[Vec<String>] {
    &self.cycles
  }

  /// Registers an in-progress placeholder and memoizes it under `path`.
  pub(crate) fn register(
    &mut self,
    node: &Rc<SchemaNode>,
    path: &Pointer,
    model_name: Option<String>,
    suggested_model_name: String,
  ) -> DescriptorId {
    let id = DescriptorId(self.descriptors.len());
    self.descriptors.push(TypeDescriptor {
      model_name,
      suggested_model_name,
      original_schema_path: path.clone(),
      schema: Rc::clone(node),
      dependencies: vec![],
      shape: Shape::Pending,
    });
    self.by_path.insert(path.clone(), id);
    id
  }

  /// Finalizes a placeholder: its dependencies become the distinct children of `shape`
  /// excluding the descriptor itself.
  pub(crate) fn finish(&mut self, id: DescriptorId, shape: Shape) -> DescriptorId {
    let dependencies = shape
      .children()
      .into_iter()
      .filter(|child| *child != id)
      .collect::<IndexSet<_>>()
      .into_iter()
      .collect();
    let descriptor = &mut self.descriptors[id.0];
    descriptor.dependencies = dependencies;
    descriptor.shape = shape;
    id
  }

  pub(crate) fn record_cycle(&mut self, chain: &[Pointer]) {
    let names: Vec<String> = chain
      .iter()
      .map(|pointer| {
        self
          .lookup(pointer)
          .map_or_else(|| pointer.to_string(), |id| self.get(id).display_name().to_string())
      })
      .collect();
    if !self.cycles.contains(&names) {
      self.cycles.push(names);
    }
  }

  /// Declarations referenced by `id`: walks through anonymous (inlined) children and stops at
  /// named ones. The descriptor itself is never part of the result.
  pub(crate) fn declared_dependencies(&self, id: DescriptorId) -> Vec<DescriptorId> {
    let mut found = IndexSet::new();
    let mut visited = IndexSet::new();
    let mut stack: Vec<DescriptorId> = self.get(id).dependencies.iter().rev().copied().collect();

    while let Some(current) = stack.pop() {
      if current == id || !visited.insert(current) {
        continue;
      }
      let descriptor = self.get(current);
      if descriptor.is_declaration() {
        found.insert(current);
      } else {
        stack.extend(descriptor.dependencies.iter().rev().copied());
      }
    }

    found.into_iter().collect()
  }

  /// Transitive closure of declarations reachable from `roots`, in breadth-first discovery
  /// order. The roots themselves are excluded.
  pub(crate) fn declaration_closure(&self, roots: &[DescriptorId]) -> Vec<DescriptorId> {
    let mut seen: IndexSet<DescriptorId> = roots.iter().copied().collect();
    let mut closure = vec![];
    let mut queue: std::collections::VecDeque<DescriptorId> = roots.iter().copied().collect();

    while let Some(current) = queue.pop_front() {
      for dependency in self.declared_dependencies(current) {
        if seen.insert(dependency) {
          closure.push(dependency);
          queue.push_back(dependency);
        }
      }
    }

    closure
  }
}
