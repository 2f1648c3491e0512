use http::Method;

use super::identifiers::sanitize;

/// Operation roles that become standalone declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationRole {
  Parameters,
  Request,
  Response,
}

impl OperationRole {
  pub(crate) const fn suffix(self) -> &'static str {
    match self {
      Self::Parameters => "Parameters",
      Self::Request => "Request",
      Self::Response => "Response",
    }
  }

  /// Key of the operation object the role is read from.
  pub(crate) const fn source_key(self) -> &'static str {
    match self {
      Self::Parameters => "parameters",
      Self::Request => "requestBody",
      Self::Response => "responses",
    }
  }

  pub(crate) fn type_name_base(self, operation_id: &str) -> String {
    format!("{operation_id}_{}", self.suffix())
  }
}

/// Derives an operation id from method and path, `GET /pets/{id}` becomes `get_pets_by_id`.
pub(crate) fn generate_operation_id(method: &Method, path: &str) -> String {
  let path_parts = path
    .split('/')
    .filter(|s| !s.is_empty())
    .map(|s| {
      if s.starts_with('{') && s.ends_with('}') {
        "by_id".to_string()
      } else {
        sanitize(s)
      }
    })
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>();

  if path_parts.is_empty() {
    method.as_str().to_lowercase()
  } else {
    format!("{}_{}", method.as_str(), path_parts.join("_")).to_lowercase()
  }
}
