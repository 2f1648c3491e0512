//! Operation extraction: one parameters, request and response descriptor per operation, all
//! converted through the shared [`DescriptorContext`].

use std::{collections::BTreeSet, rc::Rc};

use http::Method;
use indexmap::IndexMap;
use serde_json::Value;

use crate::generator::{
  descriptor::{DescriptorContext, DescriptorId},
  errors::CompileResult,
  metrics::GenerationWarning,
  naming::{
    fingerprint::SchemaFingerprint,
    identifiers::ensure_unique,
    operations::{OperationRole, generate_operation_id},
  },
  schema::{KeyedEntry, KeyedLeaf, KeyedMap, NodeKind, Pointer, SchemaNode, SelectorKey},
};

const METHOD_KEYS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];
const PARAMETER_LOCATIONS: [&str; 4] = ["path", "query", "header", "cookie"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Operation {
  pub id: String,
  pub method: Method,
  pub path: String,
  pub query_parameters: Vec<String>,
  pub servers: Vec<String>,
  pub parameters: Option<DescriptorId>,
  pub request: Option<DescriptorId>,
  pub response: Option<DescriptorId>,
  /// Declarations the roles reach, transitively and deduplicated; roles excluded.
  pub all_dependencies: Vec<DescriptorId>,
}

impl Operation {
  pub(crate) fn roles(&self) -> Vec<DescriptorId> {
    [self.parameters, self.request, self.response].into_iter().flatten().collect()
  }
}

#[derive(Debug, Clone)]
struct Parameter {
  name: String,
  location: String,
  required: bool,
  node: Rc<SchemaNode>,
}

/// Extracts every operation of the root document, sorted by path then method.
pub(crate) fn extract_operations(
  ctx: &mut DescriptorContext<'_>,
  warnings: &mut Vec<GenerationWarning>,
) -> CompileResult<Vec<Operation>> {
  let root = ctx.resolver.documents().root();
  let Some(paths) = root.get("paths").and_then(Value::as_object) else {
    return Ok(vec![]);
  };
  let root_servers = server_urls(root.get("servers"));
  let paths_at = Pointer::root("").child("paths");

  let mut entries = vec![];
  for (path, item) in paths {
    let listed_at = paths_at.child(path);
    let (item, item_at) = ctx.resolver.follow(item, &listed_at)?;
    for key in METHOD_KEYS {
      let (Some(operation), Ok(method)) = (item.get(key), Method::from_bytes(key.to_ascii_uppercase().as_bytes()))
      else {
        continue;
      };
      // Roles live under the listed path: one set per operation, even for shared path items.
      entries.push((
        path.as_str(),
        method,
        item,
        item_at.clone(),
        operation,
        item_at.child(key),
        listed_at.child(key),
      ));
    }
  }
  entries.sort_by(|a, b| (a.0, a.1.as_str()).cmp(&(b.0, b.1.as_str())));

  let mut used_ids = BTreeSet::new();
  let mut operations = Vec::with_capacity(entries.len());

  for (path, method, item, item_at, operation, operation_at, role_at) in entries {
    let original = operation
      .get("operationId")
      .and_then(Value::as_str)
      .map_or_else(|| generate_operation_id(&method, path), String::from);
    let id = ensure_unique(&original, &used_ids);
    if id != original {
      warnings.push(GenerationWarning::DuplicateOperationId {
        original,
        renamed: id.clone(),
      });
    }
    used_ids.insert(id.clone());

    let parameters = collect_parameters(ctx, &id, item, &item_at, operation, &operation_at, warnings)?;
    let query_parameters = parameters
      .iter()
      .filter(|parameter| parameter.location == "query")
      .map(|parameter| parameter.name.clone())
      .collect();

    let servers = [operation.get("servers"), item.get("servers")]
      .into_iter()
      .map(server_urls)
      .find(|urls| !urls.is_empty())
      .unwrap_or_else(|| root_servers.clone());

    let parameters = parameters_role(ctx, &id, &role_at, parameters)?;
    let request = request_role(ctx, &id, operation, &operation_at, &role_at)?;
    let response = response_role(ctx, &id, operation, &operation_at, &role_at)?;

    let roles: Vec<_> = [parameters, request, response].into_iter().flatten().collect();
    let all_dependencies = ctx.declaration_closure(&roles);

    operations.push(Operation {
      id,
      method,
      path: path.to_string(),
      query_parameters,
      servers,
      parameters,
      request,
      response,
      all_dependencies,
    });
  }

  Ok(operations)
}

/// Path-level parameters merged with operation-level ones; the operation wins on
/// `(name, location)`.
fn collect_parameters<'d>(
  ctx: &mut DescriptorContext<'d>,
  operation_id: &str,
  item: &'d Value,
  item_at: &Pointer,
  operation: &'d Value,
  operation_at: &Pointer,
  warnings: &mut Vec<GenerationWarning>,
) -> CompileResult<Vec<Parameter>> {
  let mut merged: IndexMap<(String, String), Parameter> = IndexMap::new();

  for (owner, owner_at) in [(item, item_at), (operation, operation_at)] {
    let Some(Value::Array(declared)) = owner.get("parameters") else {
      continue;
    };
    let declared_at = owner_at.child("parameters");
    for (index, raw) in declared.iter().enumerate() {
      let (raw, at) = ctx.resolver.follow(raw, &declared_at.child_index(index))?;
      let (Some(name), Some(location)) = (
        raw.get("name").and_then(Value::as_str),
        raw.get("in").and_then(Value::as_str),
      ) else {
        continue;
      };

      let node = match parameter_schema_pointer(raw, &at) {
        Some(schema_at) => ctx.resolver.resolve(&schema_at, &at)?,
        None => {
          warnings.push(GenerationWarning::ParameterWithoutSchema {
            operation_id: operation_id.to_string(),
            name: name.to_string(),
          });
          Rc::new(SchemaNode::new(NodeKind::Any))
        }
      };
      let description = raw.get("description").and_then(Value::as_str).map(String::from);
      let node = Rc::new(SchemaNode::clone(&node).with_description(description));

      merged.insert(
        (name.to_string(), location.to_string()),
        Parameter {
          name: name.to_string(),
          location: location.to_string(),
          required: location == "path" || raw.get("required").and_then(Value::as_bool).unwrap_or(false),
          node,
        },
      );
    }
  }

  Ok(merged.into_values().collect())
}

fn parameter_schema_pointer(raw: &Value, at: &Pointer) -> Option<Pointer> {
  if raw.get("schema").is_some() {
    return Some(at.child("schema"));
  }
  let content = raw.get("content").and_then(Value::as_object)?;
  content
    .iter()
    .find(|(_, media)| media.get("schema").is_some())
    .map(|(content_type, _)| at.child("content").child(content_type).child("schema"))
}

fn parameters_role(
  ctx: &mut DescriptorContext<'_>,
  operation_id: &str,
  role_at: &Pointer,
  parameters: Vec<Parameter>,
) -> CompileResult<Option<DescriptorId>> {
  if parameters.is_empty() {
    return Ok(None);
  }

  let mut groups = IndexMap::new();
  let mut required_groups = BTreeSet::new();
  for location in PARAMETER_LOCATIONS {
    let members: Vec<_> = parameters.iter().filter(|parameter| parameter.location == location).collect();
    if members.is_empty() {
      continue;
    }
    let properties = members
      .iter()
      .map(|parameter| (parameter.name.clone(), Rc::clone(&parameter.node)))
      .collect();
    let required: BTreeSet<String> = members
      .iter()
      .filter(|parameter| parameter.required)
      .map(|parameter| parameter.name.clone())
      .collect();
    if !required.is_empty() {
      required_groups.insert(location.to_string());
    }
    groups.insert(location.to_string(), Rc::new(SchemaNode::object(properties, required)));
  }

  let node = SchemaNode::object(groups, required_groups);
  convert_role(ctx, operation_id, OperationRole::Parameters, role_at, node).map(Some)
}

fn request_role<'d>(
  ctx: &mut DescriptorContext<'d>,
  operation_id: &str,
  operation: &'d Value,
  operation_at: &Pointer,
  role_at: &Pointer,
) -> CompileResult<Option<DescriptorId>> {
  let Some(body) = operation.get("requestBody") else {
    return Ok(None);
  };
  let (body, body_at) = ctx.resolver.follow(body, &operation_at.child("requestBody"))?;
  let description = body.get("description").and_then(Value::as_str).map(String::from);

  let map = content_map(ctx, body, &body_at, description.as_ref())?;
  if map.is_empty() {
    return Ok(None);
  }

  let node = SchemaNode::keyed_map(map).with_description(description);
  convert_role(ctx, operation_id, OperationRole::Request, role_at, node).map(Some)
}

fn response_role<'d>(
  ctx: &mut DescriptorContext<'d>,
  operation_id: &str,
  operation: &'d Value,
  operation_at: &Pointer,
  role_at: &Pointer,
) -> CompileResult<Option<DescriptorId>> {
  let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
    return Ok(None);
  };
  let responses_at = operation_at.child("responses");

  let mut map = KeyedMap::default();
  for (status, response) in responses {
    let (response, response_at) = ctx.resolver.follow(response, &responses_at.child(status))?;
    let description = response.get("description").and_then(Value::as_str).map(String::from);
    let content = content_map(ctx, response, &response_at, description.as_ref())?;
    let entry = if content.is_empty() {
      KeyedEntry::Leaves(vec![])
    } else {
      KeyedEntry::Nested(content)
    };
    map.insert(SelectorKey::parse(status), entry);
  }
  if map.is_empty() {
    return Ok(None);
  }

  let summary = ["summary", "description"]
    .into_iter()
    .find_map(|key| operation.get(key).and_then(Value::as_str))
    .map(String::from);
  let node = SchemaNode::keyed_map(map).with_description(summary);
  convert_role(ctx, operation_id, OperationRole::Response, role_at, node).map(Some)
}

/// Content type to leaf schema of a request body or response. Media types without a schema
/// accept anything.
fn content_map(
  ctx: &mut DescriptorContext<'_>,
  owner: &Value,
  owner_at: &Pointer,
  description: Option<&String>,
) -> CompileResult<KeyedMap> {
  let mut map = KeyedMap::default();
  let Some(content) = owner.get("content").and_then(Value::as_object) else {
    return Ok(map);
  };
  let content_at = owner_at.child("content");

  for (content_type, media) in content {
    let origin = content_at.child(content_type).child("schema");
    let node = if media.get("schema").is_some() {
      ctx.resolver.resolve(&origin, owner_at)?
    } else {
      Rc::new(SchemaNode::new(NodeKind::Any))
    };
    map.insert(
      SelectorKey::Text(content_type.clone()),
      KeyedEntry::Leaves(vec![KeyedLeaf {
        origin,
        doc: description.cloned(),
        node,
      }]),
    );
  }

  Ok(map)
}

fn convert_role(
  ctx: &mut DescriptorContext<'_>,
  operation_id: &str,
  role: OperationRole,
  base: &Pointer,
  node: SchemaNode,
) -> CompileResult<DescriptorId> {
  let role_at = base.child(role.source_key());
  let name = ctx.naming.name_for(
    &role_at,
    &role.type_name_base(operation_id),
    SchemaFingerprint::of_location(&role_at),
  )?;
  ctx.convert(&Rc::new(node), &role_at, Some(name.clone()), &name)
}

fn server_urls(servers: Option<&Value>) -> Vec<String> {
  servers
    .and_then(Value::as_array)
    .map(|servers| {
      servers
        .iter()
        .filter_map(|server| server.get("url").and_then(Value::as_str))
        .map(String::from)
        .collect()
    })
    .unwrap_or_default()
}
