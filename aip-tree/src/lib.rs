//! The typed, schema-resolved expression tree the interpreter and the
//! [`composer`] both produce (§3 "Expression tree (the output)").
//!
//! This is a tree, not a graph (§9 "Ownership and cycles"): every node owns
//! its children outright through `Box`/`Vec`, `FieldSelector.traversal` is a
//! forward-only owned linked list, and there are no back-pointers. That
//! means Rust's ordinary ownership and `Drop` already give every property
//! the source's manual arena was built for — a released node cannot be
//! reached again because it no longer has an owner, and double-release is
//! prevented by the type system rather than a runtime flag. `release` below
//! is kept only because the public contract names it explicitly.

pub mod comparator;
pub mod composer;
pub mod value;
pub mod wellknown;

pub use comparator::Comparator;
pub use value::Value;

/// A step in a dotted field path (§3 "FieldSelector"). `message` is the
/// fully qualified name of the message that declares `field`; `traversal`,
/// when present, is the next step (itself a [`Expr::FieldSelector`] or
/// [`Expr::MapKey`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelector {
  pub message: String,
  pub field: String,
  pub traversal: Option<Box<Expr>>,
  /// Complexity contributed by this step alone, taken from the field-info
  /// cache at bind time (§4.5 point 5); the selector's full complexity also
  /// includes whatever `traversal` contributes.
  pub own_complexity: i64,
}

impl FieldSelector {
  pub fn new(message: impl Into<String>, field: impl Into<String>, own_complexity: i64) -> Self {
    Self {
      message: message.into(),
      field: field.into(),
      traversal: None,
      own_complexity,
    }
  }

  pub fn with_traversal(mut self, next: Expr) -> Self {
    self.traversal = Some(Box::new(next));
    self
  }

  /// Renders the chain as a dotted path (§8: "the emitted FieldSelector
  /// chain, when printed as dotted names, equals p").
  pub fn dotted_path(&self) -> String {
    match &self.traversal {
      Some(next) => format!("{}.{}", self.field, next.dotted_path()),
      None => self.field.clone(),
    }
  }
}

impl Expr {
  fn dotted_path(&self) -> String {
    match self {
      Expr::FieldSelector(selector) => selector.dotted_path(),
      Expr::MapKey { traversal: Some(next), .. } => next.dotted_path(),
      _ => String::new(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
  Asc,
  Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByField {
  pub field: FieldSelector,
  pub order: Order,
}

/// Every node the interpreter or the composer can produce (§3). Categories
/// named in the spec (`FilterExpr`, `UpdateValueExpr`, `OrderExpr`) are
/// behavior-only groupings over this one closed enum, exposed as predicate
/// methods below rather than as separate types.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  And(Vec<Expr>),
  Or(Vec<Expr>),
  Not(Box<Expr>),
  Composite(Box<Expr>),
  Compare { left: Box<Expr>, cmp: Comparator, right: Box<Expr> },
  Value(Value),
  Array(Vec<Expr>),
  MapValue(Vec<(Value, Expr)>),
  MapKey { key: Box<Expr>, traversal: Option<Box<Expr>> },
  FieldSelector(FieldSelector),
  StringSearch { value: String, prefix_wildcard: bool, suffix_wildcard: bool },
  FunctionCall { pkg: String, name: String, args: Vec<Expr> },
  OrderBy(Vec<OrderByField>),
  Pagination { page_size: i32, skip: i32 },
  Update(Vec<Expr>),
  ArrayUpdate(Vec<Expr>),
}

impl Expr {
  /// §3 invariant 6 / §8: `complexity(And) = 1 + Σchildren`,
  /// `complexity(Or) = 1 + Σchildren` (the additive form the spec fixes,
  /// over the source's inconsistent product form — see DESIGN.md),
  /// `complexity(Not) = 1 + complexity(x)`, `StringSearch` doubles per
  /// wildcard side and adds one.
  pub fn complexity(&self) -> i64 {
    match self {
      Self::And(children) | Self::Or(children) => 1 + sum_complexity(children),
      Self::Not(inner) => 1 + inner.complexity(),
      Self::Composite(inner) => 1 + inner.complexity(),
      Self::Compare { left, right, .. } => 1 + left.complexity() + right.complexity(),
      Self::Value(_) => 1,
      Self::Array(elements) => 1 + sum_complexity(elements),
      Self::MapValue(entries) => 1 + entries.iter().map(|(_, v)| v.complexity()).sum::<i64>(),
      Self::MapKey { key, traversal } => 1 + key.complexity() + traversal.as_ref().map(|t| t.complexity()).unwrap_or(0),
      Self::FieldSelector(selector) => selector.own_complexity + selector.traversal.as_ref().map(|t| t.complexity()).unwrap_or(0),
      Self::StringSearch { prefix_wildcard, suffix_wildcard, .. } => string_search_complexity(*prefix_wildcard, *suffix_wildcard),
      Self::FunctionCall { args, .. } => 1 + sum_complexity(args),
      Self::OrderBy(fields) => 1 + fields.len() as i64,
      Self::Pagination { .. } => 1,
      Self::Update(elements) | Self::ArrayUpdate(elements) => 1 + sum_complexity(elements),
    }
  }

  /// §3 invariant 7 / §9: releasing is a no-op wrapper over `Drop` — plain
  /// ownership means there is nothing else to do, and a released node
  /// cannot be released twice because it can no longer be named.
  pub fn release(self) {
    drop(self);
  }

  pub fn is_filter_expr(&self) -> bool {
    !matches!(self, Self::OrderBy(_) | Self::Pagination { .. } | Self::Update(_) | Self::ArrayUpdate(_))
  }

  pub fn is_order_expr(&self) -> bool {
    matches!(self, Self::OrderBy(_))
  }

  pub fn is_update_value_expr(&self) -> bool {
    matches!(self, Self::Update(_) | Self::ArrayUpdate(_))
  }

  /// Renders the tree back to filter syntax. Not a parse round-trip of the
  /// original source (wildcards, map keys and enum values all lose their
  /// original spelling once bound) but a readable rendering for diagnostics
  /// and the CLI, the tree-shaped analogue of `AstExpr::render`.
  pub fn render(&self) -> String {
    match self {
      Self::And(children) => join(children, " AND "),
      Self::Or(children) => join(children, " OR "),
      Self::Not(inner) => format!("NOT {}", inner.render()),
      Self::Composite(inner) => format!("({})", inner.render()),
      Self::Compare { left, cmp, right } => format!("{} {cmp} {}", left.render(), right.render()),
      Self::Value(value) => value.to_string(),
      Self::Array(elements) => format!("[{}]", join(elements, ", ")),
      Self::MapValue(entries) => {
        let body = entries.iter().map(|(k, v)| format!("{k}: {}", v.render())).collect::<Vec<_>>().join(", ");
        format!("{{{body}}}")
      },
      Self::MapKey { key, traversal } => match traversal {
        Some(next) => format!("\"{}\".{}", key.render(), next.render()),
        None => format!("\"{}\"", key.render()),
      },
      Self::FieldSelector(selector) => selector.dotted_path(),
      Self::StringSearch { value, prefix_wildcard, suffix_wildcard } => {
        let prefix = if *prefix_wildcard { "*" } else { "" };
        let suffix = if *suffix_wildcard { "*" } else { "" };
        format!("\"{prefix}{value}{suffix}\"")
      },
      Self::FunctionCall { pkg, name, args } => {
        let qualified = if pkg.is_empty() { name.clone() } else { format!("{pkg}.{name}") };
        format!("{qualified}({})", join(args, ", "))
      },
      Self::OrderBy(fields) => fields
        .iter()
        .map(|f| format!("{}{}", f.field.dotted_path(), if f.order == Order::Desc { " desc" } else { "" }))
        .collect::<Vec<_>>()
        .join(", "),
      Self::Pagination { page_size, skip } => format!("page_size={page_size}, skip={skip}"),
      Self::Update(elements) | Self::ArrayUpdate(elements) => join(elements, ", "),
    }
  }
}

fn join(children: &[Expr], sep: &str) -> String {
  children.iter().map(Expr::render).collect::<Vec<_>>().join(sep)
}

fn sum_complexity(children: &[Expr]) -> i64 {
  children.iter().map(Expr::complexity).sum()
}

fn string_search_complexity(prefix_wildcard: bool, suffix_wildcard: bool) -> i64 {
  let mut base = 1i64;
  if prefix_wildcard {
    base *= 2;
  }
  if suffix_wildcard {
    base *= 2;
  }
  base + 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn and_complexity_is_additive_over_children() {
    let tree = Expr::And(vec![Expr::Value(Value::I64(1)), Expr::Value(Value::I64(2))]);
    assert_eq!(tree.complexity(), 1 + 1 + 1);
  }

  #[test]
  fn or_complexity_uses_the_additive_form_not_the_product_form() {
    let tree = Expr::Or(vec![Expr::Value(Value::I64(1)), Expr::Value(Value::I64(2)), Expr::Value(Value::I64(3))]);
    assert_eq!(tree.complexity(), 1 + 3);
  }

  #[test]
  fn string_search_complexity_doubles_per_wildcard_side() {
    let none = Expr::StringSearch { value: "x".into(), prefix_wildcard: false, suffix_wildcard: false };
    let one = Expr::StringSearch { value: "x".into(), prefix_wildcard: true, suffix_wildcard: false };
    let both = Expr::StringSearch { value: "x".into(), prefix_wildcard: true, suffix_wildcard: true };
    assert_eq!(none.complexity(), 2);
    assert_eq!(one.complexity(), 3);
    assert_eq!(both.complexity(), 5);
  }

  #[test]
  fn cloning_a_tree_is_structurally_equal_and_independent() {
    let original = Expr::Compare {
      left: Box::new(Expr::FieldSelector(FieldSelector::new("pkg.Msg", "name", 1))),
      cmp: Comparator::Eq,
      right: Box::new(Expr::Value(Value::String("test".into()))),
    };
    let cloned = original.clone();
    assert_eq!(original, cloned);
    drop(cloned);
    assert_eq!(original.complexity(), 3);
  }

  #[test]
  fn a_field_selector_chain_prints_as_its_dotted_path() {
    let selector = FieldSelector::new("pkg.Msg", "sub", 1).with_traversal(Expr::FieldSelector(FieldSelector::new("pkg.Sub", "field", 1)));
    assert_eq!(selector.dotted_path(), "sub.field");
  }

  #[test]
  fn renders_a_comparison_tree_back_to_filter_syntax() {
    let tree = Expr::And(vec![
      Expr::Compare {
        left: Box::new(Expr::FieldSelector(FieldSelector::new("pkg.Msg", "name", 1))),
        cmp: Comparator::Eq,
        right: Box::new(Expr::Value(Value::String("duck".into()))),
      },
      Expr::Not(Box::new(Expr::Compare {
        left: Box::new(Expr::FieldSelector(FieldSelector::new("pkg.Msg", "count", 1))),
        cmp: Comparator::Gt,
        right: Box::new(Expr::Value(Value::I64(3))),
      })),
    ]);
    assert_eq!(tree.render(), "name = \"duck\" AND NOT count > 3");
  }
}
