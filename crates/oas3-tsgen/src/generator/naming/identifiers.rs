use std::{
  char::{ToLowercase, ToUppercase},
  collections::{BTreeSet, HashSet},
  iter::Peekable,
  sync::LazyLock,
};

use any_ascii::any_ascii;
use regex::Regex;

/// Global type names that generated declarations must not shadow, because rendered bodies refer
/// to them (`Record<string, unknown>`) or consumers expect the builtin.
static RESERVED_TYPE_NAMES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "Array", "Boolean", "Date", "Error", "Function", "Map", "Number", "Object", "Omit", "Partial", "Pick", "Promise",
    "Readonly", "Record", "Required", "Set", "String", "Symbol",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static PLAIN_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Transliterates to ASCII, replaces invalid characters with underscores, collapses
/// consecutive underscores and trims leading or trailing underscores.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Ensures a name is unique within a set of used names, appending a numeric suffix if needed.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

/// Converts a string into a declaration name (`PascalCase`).
///
/// # Rules:
/// 1. If the string starts with `-`, it's stripped and "Negative" is prepended to the result.
/// 2. If the input already has mixed case (both upper and lowercase, no separators), preserve capitalization.
/// 3. Otherwise, transliterates and converts to `PascalCase` using capitalize_words.
/// 4. If the result shadows a global type (e.g., `Record`, `Date`), it gets a `Type` suffix.
/// 5. If the result starts with a digit, it's prefixed with `T`.
///
/// Returns `None` when nothing usable is left.
pub(crate) fn to_type_name(name: &str) -> Option<String> {
  let has_leading_minus = name.starts_with('-');
  let name_without_minus = name.strip_prefix('-').unwrap_or(name);

  let has_separators = name_without_minus.contains(['-', '_', '.', ' ', '/']);
  let has_upper = name_without_minus.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = name_without_minus.chars().any(|c| c.is_ascii_lowercase());
  let appears_mixed_case = !has_separators && has_upper && has_lower;

  let ascii = any_ascii(name_without_minus);
  let mut ident: String = if appears_mixed_case {
    let cleaned: String = ascii.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut chars = cleaned.chars();
    match chars.next() {
      None => String::new(),
      Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
  } else {
    ascii
      .chars()
      .capitalize_words_with_boundaries()
      .filter(char::is_ascii_alphanumeric)
      .collect()
  };

  if ident.is_empty() {
    return None;
  }

  if has_leading_minus {
    ident = format!("Negative{ident}");
  }

  if RESERVED_TYPE_NAMES.contains(ident.as_str()) {
    ident.push_str("Type");
  }

  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'T');
  }
  Some(ident)
}

/// Renders an object property key, quoting it when it is not a plain identifier.
pub(crate) fn to_property_key(name: &str) -> String {
  if PLAIN_PROPERTY_RE.is_match(name) {
    name.to_string()
  } else {
    quote_string(name)
  }
}

/// Single-quoted string literal with backslash, quote and control characters escaped.
pub(crate) fn quote_string(value: &str) -> String {
  let mut quoted = String::with_capacity(value.len() + 2);
  quoted.push('\'');
  for ch in value.chars() {
    match ch {
      '\\' => quoted.push_str("\\\\"),
      '\'' => quoted.push_str("\\'"),
      '\n' => quoted.push_str("\\n"),
      '\r' => quoted.push_str("\\r"),
      '\t' => quoted.push_str("\\t"),
      other => quoted.push(other),
    }
  }
  quoted.push('\'');
  quoted
}

/// File stem for a declaration name, `ListPetsResponse` becomes `list-pets-response`.
///
/// A word starts at an uppercase letter that follows a lowercase letter or digit, and at the last
/// capital of an uppercase run followed by lowercase (`GetAResponse`, `HTTPServer`).
pub(crate) fn to_file_stem(name: &str) -> String {
  let chars: Vec<char> = any_ascii(name).chars().collect();
  let mut stem = String::with_capacity(chars.len() + 4);
  for (index, ch) in chars.iter().copied().enumerate() {
    if !ch.is_ascii_alphanumeric() {
      if !stem.is_empty() && !stem.ends_with('-') {
        stem.push('-');
      }
      continue;
    }
    if ch.is_ascii_uppercase() && index > 0 && !stem.ends_with('-') {
      let previous = chars[index - 1];
      let next = chars.get(index + 1).copied();
      if previous.is_ascii_lowercase()
        || previous.is_ascii_digit()
        || (previous.is_ascii_uppercase() && next.is_some_and(|c| c.is_ascii_lowercase()))
      {
        stem.push('-');
      }
    }
    stem.push(ch.to_ascii_lowercase());
  }

  let stem = stem.trim_end_matches('-');
  if stem.is_empty() { "unnamed".to_string() } else { stem.to_string() }
}

/// An extension trait for char iterators to add word capitalization.
pub trait CapitalizeWordsExt: Iterator<Item = char> {
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized;
}

impl<I> CapitalizeWordsExt for I
where
  I: Iterator<Item = char>,
{
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized,
  {
    CapitalizeWordsWithBoundaries {
      iter: self.peekable(),
      capitalize_next: true,
      prev_was_lower: false,
      pending_upper: None,
      pending_lower: None,
    }
  }
}

pub struct CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  iter: Peekable<I>,
  capitalize_next: bool,
  prev_was_lower: bool,
  pending_upper: Option<ToUppercase>,
  pending_lower: Option<ToLowercase>,
}

impl<I> Iterator for CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  type Item = char;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(ref mut upper_iter) = self.pending_upper {
      if let Some(c) = upper_iter.next() {
        return Some(c);
      }
      self.pending_upper = None;
    }

    if let Some(ref mut lower_iter) = self.pending_lower {
      if let Some(c) = lower_iter.next() {
        return Some(c);
      }
      self.pending_lower = None;
    }

    let c = self.iter.next()?;

    if !c.is_ascii_alphanumeric() {
      self.capitalize_next = self.iter.peek().is_some_and(char::is_ascii_alphanumeric);
      self.prev_was_lower = false;
      return Some(c);
    }

    let is_lower = c.is_ascii_lowercase();
    let is_upper = c.is_ascii_uppercase();

    let should_capitalize = self.capitalize_next
      || (self.prev_was_lower && is_upper)
      || (is_upper && self.iter.peek().is_some_and(char::is_ascii_lowercase));

    self.prev_was_lower = is_lower;
    self.capitalize_next = false;

    if should_capitalize {
      self.pending_upper.insert(c.to_uppercase()).next()
    } else {
      self.pending_lower.insert(c.to_lowercase()).next()
    }
  }
}
