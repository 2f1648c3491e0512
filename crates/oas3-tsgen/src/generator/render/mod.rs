//! Renders descriptors as TypeScript declarations.
//!
//! Named descriptors become `export type` declarations and are referenced by name everywhere
//! else; anonymous descriptors are inlined into the declaration that references them. Output
//! depends only on structure and assigned names, so equal text means equal declaration.

mod documentation;
pub(crate) mod selector;

use itertools::Itertools;
use serde_json::Value;

pub(crate) use documentation::doc_block;

use crate::generator::{
  descriptor::{AdditionalShape, ArrayShape, DescriptorContext, DescriptorId, ObjectShape, Shape},
  errors::CompileResult,
  naming::identifiers::{quote_string, to_property_key},
  schema::{CombinatorKind, NodeKind, PrimitiveType},
};

/// A rendered type expression and how tightly it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expr {
  pub text: String,
  pub precedence: Precedence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
  Union,
  Intersection,
  Atom,
}

impl Expr {
  fn atom(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      precedence: Precedence::Atom,
    }
  }

  /// Text usable where at least `precedence` is required.
  fn at_least(&self, precedence: Precedence) -> String {
    if self.precedence < precedence {
      format!("({})", self.text)
    } else {
      self.text.clone()
    }
  }

  fn join(parts: Vec<Expr>, precedence: Precedence) -> Self {
    let separator = match precedence {
      Precedence::Union => " | ",
      _ => " & ",
    };
    let mut unique: Vec<String> = vec![];
    for part in &parts {
      let text = part.at_least(precedence);
      if !unique.contains(&text) {
        unique.push(text);
      }
    }
    match unique.len() {
      0 => Self::atom(if precedence == Precedence::Union { "never" } else { "unknown" }),
      1 => parts.into_iter().next().unwrap_or_else(|| Self::atom("unknown")),
      _ => Self {
        text: unique.join(separator),
        precedence,
      },
    }
  }
}

pub(crate) struct Renderer<'c, 'd> {
  ctx: &'c DescriptorContext<'d>,
}

impl<'c, 'd> Renderer<'c, 'd> {
  pub(crate) fn new(ctx: &'c DescriptorContext<'d>) -> Self {
    Self { ctx }
  }

  pub(crate) fn context(&self) -> &'c DescriptorContext<'d> {
    self.ctx
  }

  /// Complete declaration text of a named descriptor, documentation included.
  pub(crate) fn declaration(&self, id: DescriptorId) -> CompileResult<String> {
    let descriptor = self.ctx.get(id);
    let name = descriptor.display_name();
    let meta = &descriptor.schema.meta;

    let mut text = meta
      .description
      .as_deref()
      .or(meta.title.as_deref())
      .map(|doc| doc_block(doc, 0))
      .unwrap_or_default();

    if let Shape::Selector(_) = descriptor.shape {
      text.push_str(&selector::render_selector(self, id, name)?);
    } else {
      text.push_str(&format!("export type {name} = {};\n", self.body(id, 0).text));
    }
    Ok(text)
  }

  /// Expression used where `id` is referenced: the name of a declaration, the inlined body
  /// otherwise.
  pub(crate) fn reference(&self, id: DescriptorId, indent: usize) -> Expr {
    match &self.ctx.get(id).model_name {
      Some(name) => Expr::atom(name.clone()),
      None => self.body(id, indent),
    }
  }

  /// Full body of `id`, `| null` added for nullable schemas.
  fn body(&self, id: DescriptorId, indent: usize) -> Expr {
    let descriptor = self.ctx.get(id);
    let expr = match &descriptor.shape {
      Shape::Pending | Shape::Any => Expr::atom("unknown"),
      Shape::Never => Expr::atom("never"),
      Shape::Primitive => self.primitive(&descriptor.schema.kind),
      Shape::Array(array) => self.array(array, indent),
      Shape::Object(object) => self.object(object, indent),
      Shape::Combinator { kind, members } => {
        let parts = members.iter().map(|member| self.reference(*member, indent)).collect();
        match kind {
          CombinatorKind::AllOf => Expr::join(parts, Precedence::Intersection),
          CombinatorKind::AnyOf | CombinatorKind::OneOf => Expr::join(parts, Precedence::Union),
        }
      }
      Shape::Alias(target) => self.reference(*target, indent),
      // Nested selectors are only reachable through their parent selector.
      Shape::Selector(_) => Expr::atom("unknown"),
    };

    if descriptor.schema.meta.nullable && expr.text != "null" {
      Expr::join(vec![expr, Expr::atom("null")], Precedence::Union)
    } else {
      expr
    }
  }

  fn primitive(&self, kind: &NodeKind) -> Expr {
    let NodeKind::Primitive(primitive) = kind else {
      return Expr::atom("unknown");
    };

    if !primitive.literals.is_empty() {
      let parts = primitive.literals.iter().map(|literal| Expr::atom(literal_text(literal))).collect();
      return Expr::join(parts, Precedence::Union);
    }

    Expr::atom(match primitive.ty {
      PrimitiveType::String => "string",
      PrimitiveType::Number | PrimitiveType::Integer => "number",
      PrimitiveType::Boolean => "boolean",
      PrimitiveType::Null => "null",
    })
  }

  fn array(&self, array: &ArrayShape, indent: usize) -> Expr {
    match array {
      ArrayShape::Any => Expr::atom("unknown[]"),
      ArrayShape::Single(item) => Expr::atom(format!("{}[]", self.reference(*item, indent).at_least(Precedence::Atom))),
      ArrayShape::Tuple(items) => Expr::atom(format!(
        "[{}]",
        items.iter().map(|item| self.reference(*item, indent).text).join(", ")
      )),
    }
  }

  fn object(&self, object: &ObjectShape, indent: usize) -> Expr {
    if object.properties.is_empty() {
      return Expr::atom(match &object.additional {
        AdditionalShape::Open => "Record<string, unknown>".to_string(),
        AdditionalShape::Closed => "Record<string, never>".to_string(),
        AdditionalShape::Typed(value) => format!("Record<string, {}>", self.reference(*value, indent).text),
      });
    }

    let pad = " ".repeat(indent + 2);
    let mut text = String::from("{\n");
    for property in &object.properties {
      if let Some(doc) = &property.doc {
        text.push_str(&doc_block(doc, indent + 2));
      }
      let optional = if property.required { "" } else { "?" };
      text.push_str(&format!(
        "{pad}{}{optional}: {};\n",
        to_property_key(&property.name),
        self.reference(property.target, indent + 2).text
      ));
    }
    text.push_str(&" ".repeat(indent));
    text.push('}');

    let body = Expr::atom(text);
    match &object.additional {
      AdditionalShape::Typed(value) => {
        let record = Expr::atom(format!("Record<string, {}>", self.reference(*value, indent).text));
        Expr::join(vec![body, record], Precedence::Intersection)
      }
      AdditionalShape::Open | AdditionalShape::Closed => body,
    }
  }
}

fn literal_text(literal: &Value) -> String {
  match literal {
    Value::String(text) => quote_string(text),
    Value::Number(number) => number.to_string(),
    Value::Bool(flag) => flag.to_string(),
    Value::Null => "null".to_string(),
    Value::Array(_) | Value::Object(_) => "unknown".to_string(),
  }
}

#[cfg(test)]
mod tests;
