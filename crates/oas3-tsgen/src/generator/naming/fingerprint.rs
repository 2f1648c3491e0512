use json_canon::to_string as to_canonical_json;
use serde_json::Value;

use crate::generator::schema::Pointer;

/// Opaque digest of a schema's canonical form.
///
/// Two schemas that differ only in keyword order, in the order of their `required` array, or in
/// how their `$ref`s spell the same target produce the same fingerprint. Everything that changes
/// the emitted declaration keeps them apart, including the order of `properties`, `enum` values
/// and `type` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SchemaFingerprint(String);

impl SchemaFingerprint {
  /// Fingerprints the raw schema found in `document`. Relative `$ref`s are rewritten to their
  /// canonical pointer first, so identical text in two documents only matches when it refers to
  /// the same targets.
  pub(crate) fn of_schema(value: &Value, document: &str) -> Self {
    let mut normalized = value.clone();
    normalize_schema_semantics(&mut normalized, document);

    let canonical = to_canonical_json(&normalized).unwrap_or_else(|_| normalized.to_string());
    Self(blake3::hash(canonical.as_bytes()).to_hex().to_string())
  }

  /// Fingerprint owned by exactly one location; used for names that must never be shared.
  pub(crate) fn of_location(pointer: &Pointer) -> Self {
    Self(format!("location:{pointer}"))
  }
}

fn normalize_schema_semantics(value: &mut Value, document: &str) {
  match value {
    Value::Object(map) => {
      if let Some(Value::String(reference)) = map.get_mut("$ref") {
        *reference = Pointer::parse(reference, document).to_string();
      }
      if let Some(Value::Array(required)) = map.get_mut("required") {
        sort_string_array_in_place(required);
      }

      for (keyword, value) in map.iter_mut() {
        match keyword.as_str() {
          "enum" | "const" | "default" | "example" | "examples" => {}
          // Canonical JSON sorts object keys, and declared property order is emitted as is.
          "properties" => {
            if let Some(properties) = value.as_object_mut().map(std::mem::take) {
              let ordered = properties
                .into_iter()
                .map(|(name, mut schema)| {
                  normalize_schema_semantics(&mut schema, document);
                  Value::Array(vec![Value::String(name), schema])
                })
                .collect();
              *value = Value::Array(ordered);
            }
          }
          "patternProperties" | "dependentSchemas" | "$defs" | "definitions" => {
            if let Value::Object(schemas) = value {
              for schema in schemas.values_mut() {
                normalize_schema_semantics(schema, document);
              }
            }
          }
          _ => normalize_schema_semantics(value, document),
        }
      }
    }
    Value::Array(arr) => {
      for item in arr {
        normalize_schema_semantics(item, document);
      }
    }
    _ => {}
  }
}

/// Sorts a JSON array in-place if all elements are strings; otherwise leaves it unchanged.
fn sort_string_array_in_place(arr: &mut Vec<Value>) {
  let mut strings: Vec<String> = arr.iter().filter_map(|v| v.as_str().map(String::from)).collect();

  if strings.len() == arr.len() {
    strings.sort_unstable();
    *arr = strings.into_iter().map(Value::String).collect();
  }
}
