//! Programmatic builder bound to one message descriptor (§4.4). Produces the
//! same [`Expr`] shape the interpreter does, so tests can assemble trees by
//! hand without going through the scanner/parser/interpreter pipeline.

use aip_schema::MessageDescriptor;
use thiserror::Error;

use crate::{Comparator, Expr, FieldSelector, Order, OrderByField, Value};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposerError {
  #[error("empty field selector")]
  EmptySelector,
  #[error("{} is not a valid field", .0.join("."))]
  NotAValidField(Vec<String>),
}

pub struct Composer<'a> {
  root: &'a dyn MessageDescriptor,
}

impl<'a> Composer<'a> {
  pub fn new(root: &'a dyn MessageDescriptor) -> Self {
    Self { root }
  }

  /// Resolves a dotted selector against the bound descriptor and produces a
  /// [`Expr::FieldSelector`] chain. Fails with [`ComposerError::EmptySelector`]
  /// on an empty path and `NotAValidField` when a step does not exist, is a
  /// repeated field traversed non-terminally, or forbids filtering.
  pub fn field(&self, selector: &[&str]) -> Result<Expr, ComposerError> {
    Ok(Expr::FieldSelector(self.resolve_selector(selector)?))
  }

  /// Convenience wrapper that treats a failed selector as a programmer
  /// error (§4.4 `MustSelect`).
  pub fn must_field(&self, selector: &[&str]) -> Expr {
    self.field(selector).unwrap_or_else(|e| panic!("composer: {e}"))
  }

  pub fn and(&self, subs: Vec<Expr>) -> Expr {
    Expr::And(subs)
  }

  pub fn or(&self, subs: Vec<Expr>) -> Expr {
    Expr::Or(subs)
  }

  pub fn not(&self, sub: Expr) -> Expr {
    Expr::Not(Box::new(sub))
  }

  pub fn value(&self, v: Value) -> Expr {
    Expr::Value(v)
  }

  pub fn array(&self, subs: Vec<Expr>) -> Expr {
    Expr::Array(subs)
  }

  pub fn composite(&self, inner: Expr) -> Expr {
    Expr::Composite(Box::new(inner))
  }

  pub fn compare(&self, left: Expr, cmp: Comparator, right: Expr) -> Expr {
    Expr::Compare { left: Box::new(left), cmp, right: Box::new(right) }
  }

  pub fn function_call(&self, pkg: impl Into<String>, name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall { pkg: pkg.into(), name: name.into(), args }
  }

  pub fn map_key(&self, key: Expr) -> Expr {
    Expr::MapKey { key: Box::new(key), traversal: None }
  }

  pub fn map_key_with_traversal(&self, key: Expr, traversal: Expr) -> Expr {
    Expr::MapKey { key: Box::new(key), traversal: Some(Box::new(traversal)) }
  }

  pub fn map_value(&self, entries: Vec<(Value, Expr)>) -> Expr {
    Expr::MapValue(entries)
  }

  pub fn order_by(&self, fields: Vec<OrderByField>) -> Expr {
    Expr::OrderBy(fields)
  }

  pub fn order_by_field(&self, selector: &[&str], order: Order) -> Result<OrderByField, ComposerError> {
    Ok(OrderByField { field: self.resolve_selector(selector)?, order })
  }

  /// Convenience wrapper (§4.4 `MustOrderByField`).
  pub fn must_order_by_field(&self, selector: &[&str], order: Order) -> OrderByField {
    self.order_by_field(selector, order).unwrap_or_else(|e| panic!("composer: {e}"))
  }

  pub fn pagination(&self, page_size: i32, skip: i32) -> Expr {
    Expr::Pagination { page_size, skip }
  }

  fn resolve_selector(&self, selector: &[&str]) -> Result<FieldSelector, ComposerError> {
    if selector.is_empty() {
      return Err(ComposerError::EmptySelector);
    }

    let mut steps: Vec<(String, String, i64)> = Vec::with_capacity(selector.len());
    let mut message: &dyn MessageDescriptor = self.root;

    for (i, name) in selector.iter().enumerate() {
      let declaring = message.full_name().to_string();
      let field = message
        .field_by_name(name)
        .or_else(|| message.oneof_field_by_name(name))
        .ok_or_else(|| not_a_valid_field(selector))?;
      steps.push((declaring, field.name().to_string(), field.complexity()));

      if i + 1 != selector.len() {
        if field.is_repeated() || field.forbids_filtering() {
          return Err(not_a_valid_field(selector));
        }
        message = field.message().ok_or_else(|| not_a_valid_field(selector))?;
      }
    }

    let mut chain: Option<FieldSelector> = None;
    for (declaring, field_name, complexity) in steps.into_iter().rev() {
      let mut next = FieldSelector::new(declaring, field_name, complexity);
      if let Some(tail) = chain.take() {
        next = next.with_traversal(Expr::FieldSelector(tail));
      }
      chain = Some(next);
    }
    Ok(chain.expect("selector is non-empty, so at least one step was pushed"))
  }
}

fn not_a_valid_field(selector: &[&str]) -> ComposerError {
  ComposerError::NotAValidField(selector.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
  use aip_schema::{
    testing::{TestField, TestMessage},
    Kind,
  };

  use super::*;

  fn schema() -> TestMessage {
    TestMessage::new("pkg.Resource")
      .with_field(TestField::scalar("name", Kind::String))
      .with_field(TestField::scalar("tags", Kind::String).repeated())
      .with_field(
        TestField::scalar("sub", Kind::Message).with_message(TestMessage::new("pkg.Sub").with_field(TestField::scalar("id", Kind::Int64))),
      )
  }

  #[test]
  fn resolves_a_nested_selector_into_a_traversal_chain() {
    let message = schema();
    let composer = Composer::new(&message);
    let Expr::FieldSelector(selector) = composer.field(&["sub", "id"]).unwrap() else {
      panic!("expected a field selector");
    };
    assert_eq!(selector.field, "sub");
    assert_eq!(selector.message, "pkg.Resource");
    let traversal = selector.traversal.expect("traversal present");
    let Expr::FieldSelector(inner) = *traversal else { panic!("expected a nested selector") };
    assert_eq!(inner.field, "id");
    assert_eq!(inner.message, "pkg.Sub");
  }

  #[test]
  fn rejects_an_unknown_field() {
    let message = schema();
    let composer = Composer::new(&message);
    assert_eq!(composer.field(&["missing"]), Err(ComposerError::NotAValidField(vec!["missing".into()])));
  }

  #[test]
  fn rejects_traversal_through_a_repeated_field() {
    let message = schema();
    let composer = Composer::new(&message);
    assert!(composer.field(&["tags", "x"]).is_err());
  }

  #[test]
  fn an_empty_selector_is_rejected() {
    let message = schema();
    let composer = Composer::new(&message);
    assert_eq!(composer.field(&[]), Err(ComposerError::EmptySelector));
  }

  #[test]
  fn builds_a_compare_node_from_a_selector_and_a_literal() {
    let message = schema();
    let composer = Composer::new(&message);
    let tree = composer.compare(composer.must_field(&["name"]), Comparator::Eq, composer.value(Value::String("test".into())));
    assert_eq!(tree.complexity(), 1 + 1 + 1);
  }
}
