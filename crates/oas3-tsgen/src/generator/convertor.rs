//! Descriptor factory: converts schema nodes into memoized [`TypeDescriptor`]s.
//!
//! [`TypeDescriptor`]: crate::generator::descriptor::TypeDescriptor

use std::rc::Rc;

use indexmap::IndexMap;
use mediatype::MediaType;

use crate::generator::{
  descriptor::{
    AdditionalShape, ArrayShape, DescriptorContext, DescriptorId, ObjectShape, PropertyShape, SelectorChild,
    SelectorLeaf, SelectorShape, Shape,
  },
  errors::{CompileError, CompileResult},
  naming::{fingerprint::SchemaFingerprint, identifiers::to_type_name},
  resolver::Reentry,
  schema::{
    AdditionalProperties, ArrayItems, ArrayNode, KeyedEntry, KeyedMap, NodeKind, ObjectNode, Pointer, SchemaNode,
    SelectorKey,
  },
};

impl DescriptorContext<'_> {
  /// Converts `node`, found at `path`, into a descriptor.
  ///
  /// A descriptor already registered for `path` (finished or still in progress) is returned
  /// as is. Otherwise a placeholder is registered before any child is converted, so a reference
  /// cycle back to this node receives the placeholder's handle.
  pub(crate) fn convert(
    &mut self,
    node: &Rc<SchemaNode>,
    path: &Pointer,
    model_name: Option<String>,
    suggested: &str,
  ) -> CompileResult<DescriptorId> {
    if let Some(id) = self.lookup(path) {
      return Ok(id);
    }

    if let NodeKind::Reference(target) = &node.kind
      && model_name.is_none()
      && !node.meta.nullable
    {
      return self.convert_reference(target, path);
    }

    let suggested = model_name.clone().unwrap_or_else(|| suggested.to_string());
    let id = self.register(node, path, model_name, suggested.clone());

    let shape = match &node.kind {
      NodeKind::Any => Shape::Any,
      NodeKind::Never => Shape::Never,
      NodeKind::Primitive(_) => Shape::Primitive,
      NodeKind::Reference(target) => Shape::Alias(self.convert_reference(target, path)?),
      NodeKind::Array(array) => Shape::Array(self.convert_array(array, path, &suggested)?),
      NodeKind::Object(object) => Shape::Object(self.convert_object(object, path, &suggested)?),
      NodeKind::Combinator(combinator) => {
        let base = path.child(combinator.kind.keyword());
        let members = combinator
          .members
          .iter()
          .enumerate()
          .map(|(index, member)| {
            self.convert(
              member,
              &base.child_index(index),
              None,
              &format!("{suggested}Variant{}", index + 1),
            )
          })
          .collect::<CompileResult<Vec<_>>>()?;
        Shape::Combinator {
          kind: combinator.kind,
          members,
        }
      }
      NodeKind::KeyedMap(map) => Shape::Selector(self.convert_keyed_map(map, path, &suggested)?),
    };

    Ok(self.finish(id, shape))
  }

  /// Converts the named schema at `pointer` (a component or any other reference target).
  pub(crate) fn convert_named(&mut self, pointer: &Pointer) -> CompileResult<DescriptorId> {
    self.convert_reference(pointer, pointer)
  }

  fn convert_reference(&mut self, target: &Pointer, origin: &Pointer) -> CompileResult<DescriptorId> {
    if let Reentry::Cycle(chain) = self.resolver.enter(target) {
      self.record_cycle(&chain);
      return self.lookup(target).ok_or_else(|| CompileError::DependencyGraph {
        declaration: target.to_string(),
        chain: chain.iter().map(ToString::to_string).collect(),
      });
    }
    let result = self.convert_target(target, origin);
    self.resolver.leave(target);
    result
  }

  fn convert_target(&mut self, target: &Pointer, origin: &Pointer) -> CompileResult<DescriptorId> {
    if let Some(id) = self.lookup(target) {
      return Ok(id);
    }

    let raw = self.resolver.raw(target, origin)?;
    let base = target
      .last_segment()
      .filter(|segment| !segment.trim().is_empty())
      .ok_or_else(|| CompileError::naming(target.to_string()))?;
    let node = self.resolver.resolve(target, origin)?;
    let name = self
      .naming
      .name_for(target, &base, SchemaFingerprint::of_schema(raw, target.document()))?;

    self.convert(&node, target, Some(name.clone()), &name)
  }

  fn convert_array(&mut self, array: &ArrayNode, path: &Pointer, suggested: &str) -> CompileResult<ArrayShape> {
    Ok(match &array.items {
      ArrayItems::Any => ArrayShape::Any,
      ArrayItems::Single(item) => {
        ArrayShape::Single(self.convert(item, &path.child("items"), None, &format!("{suggested}Item"))?)
      }
      ArrayItems::Tuple(items) => {
        let base = path.child("prefixItems");
        let ids = items
          .iter()
          .enumerate()
          .map(|(index, item)| {
            self.convert(item, &base.child_index(index), None, &format!("{suggested}Item{}", index + 1))
          })
          .collect::<CompileResult<Vec<_>>>()?;
        ArrayShape::Tuple(ids)
      }
    })
  }

  fn convert_object(&mut self, object: &ObjectNode, path: &Pointer, suggested: &str) -> CompileResult<ObjectShape> {
    let base = path.child("properties");
    let mut properties = Vec::with_capacity(object.properties.len());

    for (name, child) in &object.properties {
      let child_suggested = format!("{suggested}{}", to_type_name(name).unwrap_or_default());
      let target = self.convert(child, &base.child(name), None, &child_suggested)?;
      properties.push(PropertyShape {
        name: name.clone(),
        target,
        required: object.required.contains(name),
        doc: child.meta.description.clone(),
      });
    }

    let additional = match &object.additional {
      AdditionalProperties::Open => AdditionalShape::Open,
      AdditionalProperties::Closed => AdditionalShape::Closed,
      AdditionalProperties::Schema(schema) => AdditionalShape::Typed(self.convert(
        schema,
        &path.child("additionalProperties"),
        None,
        &format!("{suggested}Value"),
      )?),
    };

    Ok(ObjectShape { properties, additional })
  }

  fn convert_keyed_map(&mut self, map: &KeyedMap, path: &Pointer, suggested: &str) -> CompileResult<SelectorShape> {
    let mut children = IndexMap::with_capacity(map.entries.len());

    for (key, entry) in &map.entries {
      let key_suggested = format!("{suggested}{}", key_suffix(key));
      let child = match entry {
        KeyedEntry::Nested(nested) => {
          let node = Rc::new(SchemaNode::keyed_map(nested.clone()));
          SelectorChild::Nested(self.convert(&node, &path.child(&key.to_string()), None, &key_suggested)?)
        }
        KeyedEntry::Leaves(leaves) => {
          let leaves = leaves
            .iter()
            .map(|leaf| {
              Ok(SelectorLeaf {
                target: self.convert(&leaf.node, &leaf.origin, None, &key_suggested)?,
                doc: leaf.doc.clone(),
              })
            })
            .collect::<CompileResult<Vec<_>>>()?;
          SelectorChild::Leaves(leaves)
        }
      };
      children.insert(key.clone(), child);
    }

    Ok(SelectorShape { children })
  }
}

/// Name fragment for a dispatch key: `200`, `Json` for `application/json`, `Default`.
fn key_suffix(key: &SelectorKey) -> String {
  match key {
    SelectorKey::Number(status) => status.to_string(),
    SelectorKey::Text(text) => {
      let word = MediaType::parse(text).map_or_else(|_| text.clone(), |media| media.subty.as_str().to_string());
      to_type_name(&word).unwrap_or_default()
    }
  }
}
