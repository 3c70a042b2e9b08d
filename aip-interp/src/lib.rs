//! Stateful interpreter that binds a parsed AST to a [`MessageDescriptor`]
//! and produces the typed [`Expr`] tree (§4.5). Mirrors the shape of a
//! resolver that walks a parsed tree once against a scope table, except the
//! "scope table" here is the schema descriptor rather than a block stack.
//!
//! `parse` is the only user-facing filter entry point; `parse_order_by` binds
//! the separate, simpler `order_by` clause list.

mod cache;
mod functions;
mod values;

use aip_ast::AstExpr;
use aip_diagnostic::{
  diagnostic::Diagnostic,
  diagnostic_code::{DiagnosticCode, ErrorKind},
  DiagnosticEngine,
};
use aip_parser::Parser;
use aip_scanner::{token::types::TokenType, Dialect};
use aip_schema::{Cardinality, EnumDescriptor, FieldDescriptor, FunctionRegistry, Kind, MapDescriptor, MessageDescriptor};
use aip_tree::{Comparator, Expr, FieldSelector, Order, OrderByField, Value};

use crate::cache::FieldInfoCache;

/// The effective value shape a bound comparable (a field selector or a
/// function call) exposes to restriction binding: either a real descriptor,
/// or a synthesized shape for a function's return declaration.
enum FieldContext<'a> {
  Described(&'a dyn FieldDescriptor),
  Synthetic { kind: Kind, cardinality: Cardinality, nullable: bool },
}

impl<'a> FieldContext<'a> {
  fn kind(&self) -> Kind {
    match self {
      Self::Described(field) => field.kind(),
      Self::Synthetic { kind, .. } => *kind,
    }
  }

  fn cardinality(&self) -> Cardinality {
    match self {
      Self::Described(field) => field.cardinality(),
      Self::Synthetic { cardinality, .. } => *cardinality,
    }
  }

  fn is_nullable(&self) -> bool {
    match self {
      Self::Described(field) => field.is_nullable(),
      Self::Synthetic { nullable, .. } => *nullable,
    }
  }

  fn enum_descriptor(&self) -> Option<&'a dyn EnumDescriptor> {
    match self {
      Self::Described(field) => field.enum_descriptor(),
      Self::Synthetic { .. } => None,
    }
  }

  fn map_value(&self) -> Option<&'a dyn MapDescriptor> {
    match self {
      Self::Described(field) => field.map_value(),
      Self::Synthetic { .. } => None,
    }
  }
}

struct BoundComparable<'a> {
  expr: Expr,
  context: FieldContext<'a>,
  /// Whether `expr` resolved through a map-key step (§4.5 point 4): `:`
  /// against a keyed scalar value means equality, the same as it would once
  /// the key has picked out a single value, regardless of that value's kind.
  map_keyed: bool,
}

/// Binds filter source strings against one [`MessageDescriptor`] (§4.5).
/// Holds a field-info cache behind a lock, so a single instance can serve
/// concurrent parses; binding itself only ever needs `&self`.
pub struct Interpreter<'a> {
  descriptor: &'a dyn MessageDescriptor,
  functions: Option<&'a dyn FunctionRegistry>,
  cache: FieldInfoCache,
}

impl<'a> Interpreter<'a> {
  pub fn new(descriptor: &'a dyn MessageDescriptor) -> Self {
    Self { descriptor, functions: None, cache: FieldInfoCache::new() }
  }

  /// Binds the function registry calls are resolved against (§4.5
  /// "Function-call handling"). Without one, any function call in the
  /// filter is a bind error.
  pub fn with_functions(mut self, functions: &'a dyn FunctionRegistry) -> Self {
    self.functions = Some(functions);
    self
  }

  /// Scans, parses and binds one filter source string. `Ok(None)` is an
  /// empty filter (vacuously true), kept distinct from `Expr::And(vec![])`
  /// since an empty `And` is ill-formed by this tree's own invariants (see
  /// DESIGN.md).
  pub fn parse(&self, source: &str, dialect: Dialect, engine: &mut DiagnosticEngine) -> Result<Option<Expr>, ErrorKind> {
    let mut parser = Parser::new();
    parser.reset(source, dialect);
    let ast = parser.parse(engine).map_err(|_| ErrorKind::InvalidAst)?;
    let AstExpr::FilterExpr { expr, .. } = ast else {
      return Err(self.internal(engine, 0, "parser did not return a filter root"));
    };
    match expr {
      None => Ok(None),
      Some(inner) => self.bind_expression(&inner, engine).map(Some),
    }
  }

  /// Binds a plain comma-separated `order_by` clause list (e.g.
  /// `"name desc, age"`) — a separate, much smaller sub-language from the
  /// filter grammar above, the same way a list-service's `order_by` query
  /// parameter is not itself a filter expression.
  pub fn parse_order_by(&self, source: &str, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let mut fields = Vec::new();
    for clause in source.split(',').map(str::trim).filter(|c| !c.is_empty()) {
      let mut parts = clause.split_whitespace();
      let path = parts.next().expect("filter above skips empty clauses");
      let order = match parts.next().map(|s| s.to_ascii_uppercase()) {
        None => Order::Asc,
        Some(ref s) if s == "ASC" => Order::Asc,
        Some(ref s) if s == "DESC" => Order::Desc,
        Some(other) => return Err(self.semantic(engine, DiagnosticCode::InvalidField, 0, format!("unknown order direction `{other}`"))),
      };
      let field = self.resolve_plain_selector(path, engine)?;
      fields.push(OrderByField { field, order });
    }
    Ok(Expr::OrderBy(fields))
  }

  /// Pagination carries no field references to bind; this is a thin wrapper
  /// kept for symmetry with `parse`/`parse_order_by` (§4.4 `Pagination`).
  pub fn parse_pagination(&self, page_size: i32, skip: i32) -> Expr {
    Expr::Pagination { page_size, skip }
  }

  fn bind_expression(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let AstExpr::ExpressionExpr { factors, .. } = ast else {
      return Err(self.internal(engine, ast.position(), "expected an expression node"));
    };
    let mut bound = Vec::with_capacity(factors.len());
    for factor in factors {
      bound.push(self.bind_factor(factor, engine)?);
    }
    Ok(collapse(bound, Expr::And as fn(Vec<Expr>) -> Expr))
  }

  fn bind_factor(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let AstExpr::FactorExpr { terms, .. } = ast else {
      return Err(self.internal(engine, ast.position(), "expected a factor node"));
    };
    let mut bound = Vec::with_capacity(terms.len());
    for term in terms {
      bound.push(self.bind_term(term, engine)?);
    }
    Ok(collapse(bound, Expr::Or as fn(Vec<Expr>) -> Expr))
  }

  fn bind_term(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let AstExpr::TermExpr { negated, expr, .. } = ast else {
      return Err(self.internal(engine, ast.position(), "expected a term node"));
    };
    let inner = self.bind_simple(expr, engine)?;
    Ok(if *negated { Expr::Not(Box::new(inner)) } else { inner })
  }

  fn bind_simple(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    match ast {
      AstExpr::CompositeExpr { expr, .. } => Ok(Expr::Composite(Box::new(self.bind_expression(expr, engine)?))),
      AstExpr::RestrictionExpr { .. } => self.bind_restriction(ast, engine),
      _ => Err(self.internal(engine, ast.position(), "expected a restriction or a parenthesized expression")),
    }
  }

  fn bind_restriction(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let AstExpr::RestrictionExpr { comparable, comparator, arg, position } = ast else {
      return Err(self.internal(engine, ast.position(), "expected a restriction node"));
    };
    let left = self.bind_comparable(comparable, engine)?;
    match (comparator, arg) {
      (None, None) => Ok(left.expr),
      (Some(cmp_ast), Some(arg_ast)) => {
        let cmp = bind_comparator(cmp_ast);
        self.check_legality(&left.context, left.map_keyed, cmp, engine, *position)?;
        let right = self.bind_arg(&left, cmp, arg_ast, engine)?;
        Ok(Expr::Compare { left: Box::new(left.expr), cmp, right: Box::new(right) })
      },
      _ => Err(self.internal(engine, *position, "restriction has a comparator with no argument, or vice versa")),
    }
  }

  /// §4.5 point 3 "restriction legality matrix": a repeated field only
  /// accepts `:` (HAS, "contains element"); a scalar field accepts `=`/`!=`
  /// unconditionally, `IN` unconditionally (the argument side is checked
  /// separately), `:` when its kind is `String` or `Map`, or when it was
  /// reached through a map-key step (there `:` means equality against the
  /// keyed value, whatever its kind), and ordered comparators only when the
  /// kind has a meaningful order (numeric, temporal, or string —
  /// [`Comparator::is_ordered`]).
  fn check_legality(&self, context: &FieldContext, map_keyed: bool, cmp: Comparator, engine: &mut DiagnosticEngine, position: u32) -> Result<(), ErrorKind> {
    let kind = context.kind();
    if context.cardinality() == Cardinality::Repeated {
      return match cmp {
        Comparator::Has => Ok(()),
        _ => Err(self.semantic(engine, DiagnosticCode::InvalidField, position, format!("comparator `{cmp}` is not legal against a repeated field; use `:`"))),
      };
    }
    if cmp.is_ordered() {
      return if kind.is_numeric() || kind.is_temporal() || kind == Kind::String {
        Ok(())
      } else {
        Err(self.semantic(engine, DiagnosticCode::InvalidField, position, format!("ordered comparator `{cmp}` is not legal against a {kind:?} field")))
      };
    }
    match cmp {
      Comparator::Eq | Comparator::Ne | Comparator::In => Ok(()),
      Comparator::Has if map_keyed || kind == Kind::String || kind == Kind::Map => Ok(()),
      Comparator::Has => Err(self.semantic(engine, DiagnosticCode::InvalidField, position, format!("`:` is not legal against a {kind:?} field"))),
      Comparator::Lt | Comparator::Le | Comparator::Gt | Comparator::Ge => unreachable!("handled by the is_ordered() branch above"),
    }
  }

  fn bind_arg(&self, left: &BoundComparable<'a>, cmp: Comparator, arg_ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    match cmp {
      Comparator::In => {
        let AstExpr::ArrayExpr { elements, .. } = arg_ast else {
          return Err(self.semantic(engine, DiagnosticCode::InvalidValue, arg_ast.position(), "`IN` expects an array literal"));
        };
        let bound = elements.iter().map(|e| self.bind_scalar_arg(&left.context, e, engine)).collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::Array(bound))
      },
      Comparator::Has if left.context.kind() == Kind::Map => {
        let map = left
          .context
          .map_value()
          .ok_or_else(|| self.semantic(engine, DiagnosticCode::InvalidField, arg_ast.position(), "map field has no map descriptor"))?;
        values::bind_scalar(map.key_kind(), false, true, None, arg_ast).map_err(|msg| self.semantic(engine, DiagnosticCode::InvalidValue, arg_ast.position(), msg))
      },
      _ => self.bind_comparison_arg(left, arg_ast, engine),
    }
  }

  fn bind_scalar_arg(&self, context: &FieldContext<'a>, arg_ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    values::bind_scalar(context.kind(), context.is_nullable(), true, context.enum_descriptor(), arg_ast)
      .map_err(|msg| self.semantic(engine, DiagnosticCode::InvalidValue, arg_ast.position(), msg))
  }

  /// Restriction-argument binding (§4.5 point 2): try `right` as a literal
  /// value against `left`'s effective descriptor first. If that fails and
  /// `right` is itself a selector or function call, re-parse it as one and
  /// cross-check its shape against `left` instead of surfacing the literal
  /// parse failure.
  fn bind_comparison_arg(&self, left: &BoundComparable<'a>, arg_ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    match values::bind_scalar(left.context.kind(), left.context.is_nullable(), true, left.context.enum_descriptor(), arg_ast) {
      Ok(expr) => Ok(expr),
      Err(_) if arg_ast.is_comparable() => self.bind_indirect_comparison_arg(left, arg_ast, engine),
      Err(msg) => Err(self.semantic(engine, DiagnosticCode::InvalidValue, arg_ast.position(), msg)),
    }
  }

  /// §4.5 legality matrix: two selectors on the identical declaring message
  /// and field path are rejected as `AmbiguousField` (scenario 6, `duration
  /// = duration`); otherwise the right side binds normally and its kind must
  /// be comparable with `left`'s (scenario 5, `i64 = sub.i32`).
  fn bind_indirect_comparison_arg(&self, left: &BoundComparable<'a>, arg_ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    let position = arg_ast.position();
    let right = self.bind_comparable(arg_ast, engine)?;
    if let (Expr::FieldSelector(l), Expr::FieldSelector(r)) = (&left.expr, &right.expr) {
      if l.dotted_path() == r.dotted_path() {
        return Err(self.semantic(engine, DiagnosticCode::AmbiguousField, position, format!("`{}` compared against itself", l.dotted_path())));
      }
    }
    if !left.context.kind().is_comparable_with(right.context.kind()) {
      return Err(self.semantic(
        engine,
        DiagnosticCode::InvalidValue,
        position,
        format!("{:?} is not comparable with {:?}", left.context.kind(), right.context.kind()),
      ));
    }
    Ok(right.expr)
  }

  fn bind_comparable(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<BoundComparable<'a>, ErrorKind> {
    match ast {
      AstExpr::MemberExpr { value, fields, position } => self.bind_selector(value, fields, *position, engine),
      AstExpr::FunctionCall { name, arg_list, position } => self.bind_function_call(name, arg_list, *position, engine),
      _ => Err(self.internal(engine, ast.position(), "expected a member path or a function call")),
    }
  }

  /// Field binding / `parseSelector` (§4.5 point 1): the first segment must
  /// name a field (or a field inside a oneof) of the bound message.
  fn bind_selector(&self, value: &AstExpr, fields: &[AstExpr], position: u32, engine: &mut DiagnosticEngine) -> Result<BoundComparable<'a>, ErrorKind> {
    let name = match value {
      AstExpr::TextLiteral { value, .. } => value.as_str(),
      _ => return Err(self.semantic(engine, DiagnosticCode::FieldNotFound, position, "a quoted value is not a valid field selector root")),
    };
    match self.descriptor.field_by_name(name).or_else(|| self.descriptor.oneof_field_by_name(name)) {
      Some(field) => self.bind_path_rest(self.descriptor, field, fields, 0, position, engine),
      None => Err(self.semantic(engine, DiagnosticCode::FieldNotFound, position, format!("field `{name}` not found on {}", self.descriptor.full_name()))),
    }
  }

  /// Walks the rest of a dotted path one segment at a time. `declaring` is
  /// always the message that declares `field`; map fields consume the next
  /// segment as a key rather than a nested field name (§4.5 point 4).
  fn bind_path_rest(
    &self,
    declaring: &'a dyn MessageDescriptor,
    field: &'a dyn FieldDescriptor,
    rest: &[AstExpr],
    idx: usize,
    position: u32,
    engine: &mut DiagnosticEngine,
  ) -> Result<BoundComparable<'a>, ErrorKind> {
    let info = self.cache.get_or_insert(declaring.full_name(), field);
    if info.forbidden {
      return Err(self.semantic(engine, DiagnosticCode::InvalidField, position, format!("field `{}` forbids filtering", field.name())));
    }

    if idx == rest.len() {
      let selector = FieldSelector::new(declaring.full_name(), field.name(), info.complexity);
      return Ok(BoundComparable { expr: Expr::FieldSelector(selector), context: FieldContext::Described(field), map_keyed: false });
    }

    if field.kind() == Kind::Map {
      return self.bind_map_step(declaring, field, info.complexity, rest, idx, position, engine);
    }

    if field.is_repeated() {
      return Err(self.semantic(engine, DiagnosticCode::InvalidField, position, format!("cannot traverse through repeated field `{}`", field.name())));
    }
    let next_message = field
      .message()
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::InvalidField, position, format!("cannot traverse into non-message field `{}`", field.name())))?;
    let next_name =
      field_step_name(&rest[idx]).ok_or_else(|| self.semantic(engine, DiagnosticCode::ExpectedFieldName, position, "expected a field name".to_string()))?;
    let next_field = next_message
      .field_by_name(&next_name)
      .or_else(|| next_message.oneof_field_by_name(&next_name))
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::FieldNotFound, position, format!("field `{next_name}` not found on {}", next_message.full_name())))?;

    let inner = self.bind_path_rest(next_message, next_field, rest, idx + 1, position, engine)?;
    let selector = FieldSelector::new(declaring.full_name(), field.name(), info.complexity);
    Ok(BoundComparable { expr: Expr::FieldSelector(selector.with_traversal(inner.expr)), context: inner.context, map_keyed: inner.map_keyed })
  }

  fn bind_map_step(
    &self,
    declaring: &'a dyn MessageDescriptor,
    field: &'a dyn FieldDescriptor,
    own_complexity: i64,
    rest: &[AstExpr],
    idx: usize,
    position: u32,
    engine: &mut DiagnosticEngine,
  ) -> Result<BoundComparable<'a>, ErrorKind> {
    let map = field.map_value().expect("Kind::Map field always has a map descriptor");
    let key_expr = values::bind_scalar(map.key_kind(), false, true, None, &rest[idx]).map_err(|msg| self.semantic(engine, DiagnosticCode::InvalidValue, position, msg))?;
    let value_field = map.value_field();

    let (traversal, context, map_keyed) = if idx + 1 == rest.len() {
      (None, FieldContext::Described(value_field), true)
    } else {
      let value_message = value_field
        .message()
        .ok_or_else(|| self.semantic(engine, DiagnosticCode::InvalidField, position, "cannot traverse past a non-message map value"))?;
      let next_name = field_step_name(&rest[idx + 1]).ok_or_else(|| self.semantic(engine, DiagnosticCode::ExpectedFieldName, position, "expected a field name".to_string()))?;
      let next_field = value_message
        .field_by_name(&next_name)
        .or_else(|| value_message.oneof_field_by_name(&next_name))
        .ok_or_else(|| self.semantic(engine, DiagnosticCode::FieldNotFound, position, format!("field `{next_name}` not found on {}", value_message.full_name())))?;
      let inner = self.bind_path_rest(value_message, next_field, rest, idx + 2, position, engine)?;
      (Some(Box::new(inner.expr)), inner.context, inner.map_keyed)
    };

    let map_key_expr = Expr::MapKey { key: Box::new(key_expr), traversal };
    let selector = FieldSelector::new(declaring.full_name(), field.name(), own_complexity).with_traversal(map_key_expr);
    Ok(BoundComparable { expr: Expr::FieldSelector(selector), context, map_keyed })
  }

  fn bind_function_call(&self, name_segments: &[AstExpr], arg_list: &[AstExpr], position: u32, engine: &mut DiagnosticEngine) -> Result<BoundComparable<'a>, ErrorKind> {
    let dotted_name = name_segments.iter().map(|s| s.render(false)).collect::<Vec<_>>().join(".");
    let registry = self
      .functions
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::NoHandlerFound, position, format!("no function registry bound; cannot resolve `{dotted_name}`")))?;
    let declaration = registry
      .lookup(&dotted_name)
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::NoHandlerFound, position, format!("no function declared for `{dotted_name}`")))?;

    let mut args = Vec::with_capacity(arg_list.len());
    for (i, arg_ast) in arg_list.iter().enumerate() {
      let bound = match declaration.args.get(i) {
        Some(arg_decl) if !arg_ast.is_comparable() => self.bind_literal_arg(arg_decl.kind, arg_decl.nullable, arg_decl.allow_indirect, arg_ast, engine)?,
        _ => self.bind_arbitrary_arg(arg_ast, engine)?,
      };
      args.push(bound);
    }

    functions::validate_call(declaration, &args).map_err(|msg| self.semantic(engine, DiagnosticCode::InvalidValue, position, msg))?;

    let pkg = name_segments
      .split_last()
      .map(|(_, rest)| rest.iter().map(|s| s.render(false)).collect::<Vec<_>>().join("."))
      .unwrap_or_default();
    let call_name = name_segments.last().map(|s| s.render(false)).unwrap_or_default();
    let expr = Expr::FunctionCall { pkg, name: call_name, args };

    let context = match &declaration.returns {
      Some(ret) => FieldContext::Synthetic { kind: ret.kind, cardinality: ret.cardinality, nullable: ret.nullable },
      None => FieldContext::Synthetic { kind: Kind::Bool, cardinality: Cardinality::Optional, nullable: false },
    };
    Ok(BoundComparable { expr, context, map_keyed: false })
  }

  fn bind_literal_arg(&self, kind: Kind, nullable: bool, allow_indirect: bool, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    if let AstExpr::ArrayExpr { elements, .. } = ast {
      let bound = elements.iter().map(|e| self.bind_literal_arg(kind, nullable, allow_indirect, e, engine)).collect::<Result<Vec<_>, _>>()?;
      return Ok(Expr::Array(bound));
    }
    values::bind_scalar(kind, nullable, allow_indirect, None, ast).map_err(|msg| self.semantic(engine, DiagnosticCode::InvalidValue, ast.position(), msg))
  }

  /// Binds a call argument with no declared kind to check against: either it
  /// is itself indirect (a selector or nested call, resolved normally
  /// against this interpreter's own descriptor), or it is a literal taken at
  /// face value as text/array/struct (§4.5: extra/untyped positions fall
  /// back to a best-effort literal bind rather than a hard error).
  fn bind_arbitrary_arg(&self, ast: &AstExpr, engine: &mut DiagnosticEngine) -> Result<Expr, ErrorKind> {
    if ast.is_comparable() {
      return Ok(self.bind_comparable(ast, engine)?.expr);
    }
    match ast {
      AstExpr::ArrayExpr { elements, .. } => Ok(Expr::Array(elements.iter().map(|e| self.bind_arbitrary_arg(e, engine)).collect::<Result<Vec<_>, _>>()?)),
      AstExpr::StructExpr { .. } => Ok(Expr::Value(Value::Json(values::ast_to_json(ast)))),
      AstExpr::StringLiteral { value, .. } | AstExpr::TextLiteral { value, .. } => Ok(Expr::Value(Value::String(value.clone()))),
      AstExpr::KeywordExpr { lexeme, .. } => Ok(Expr::Value(Value::String(lexeme.clone()))),
      _ => Err(self.semantic(engine, DiagnosticCode::InvalidValue, ast.position(), "could not bind a function argument with no declared kind")),
    }
  }

  fn resolve_plain_selector(&self, path: &str, engine: &mut DiagnosticEngine) -> Result<FieldSelector, ErrorKind> {
    let segments: Vec<&str> = path.split('.').collect();
    self.resolve_plain_rest(self.descriptor, &segments, 0, engine)
  }

  fn resolve_plain_rest(&self, message: &'a dyn MessageDescriptor, segments: &[&str], idx: usize, engine: &mut DiagnosticEngine) -> Result<FieldSelector, ErrorKind> {
    let name = segments[idx];
    let field = message
      .field_by_name(name)
      .or_else(|| message.oneof_field_by_name(name))
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::FieldNotFound, 0, format!("field `{name}` not found on {}", message.full_name())))?;
    let info = self.cache.get_or_insert(message.full_name(), field);
    if idx + 1 == segments.len() {
      return Ok(FieldSelector::new(message.full_name(), field.name(), info.complexity));
    }
    if field.is_repeated() || field.forbids_filtering() {
      return Err(self.semantic(engine, DiagnosticCode::InvalidField, 0, format!("cannot traverse through `{name}`")));
    }
    let next_message = field
      .message()
      .ok_or_else(|| self.semantic(engine, DiagnosticCode::InvalidField, 0, format!("`{name}` is not a message field")))?;
    let inner = self.resolve_plain_rest(next_message, segments, idx + 1, engine)?;
    Ok(FieldSelector::new(message.full_name(), field.name(), info.complexity).with_traversal(Expr::FieldSelector(inner)))
  }

  fn semantic(&self, engine: &mut DiagnosticEngine, code: DiagnosticCode, position: u32, message: impl Into<String>) -> ErrorKind {
    engine.emit(Diagnostic::at(code, message, position));
    ErrorKind::from(code)
  }

  fn internal(&self, engine: &mut DiagnosticEngine, position: u32, message: impl Into<String>) -> ErrorKind {
    self.semantic(engine, DiagnosticCode::Internal, position, message)
  }
}

fn collapse(mut children: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
  if children.len() == 1 {
    children.pop().expect("len checked above")
  } else {
    wrap(children)
  }
}

fn bind_comparator(ast: &AstExpr) -> Comparator {
  let AstExpr::ComparatorLiteral { token_type, .. } = ast else {
    unreachable!("parse_restriction only ever builds a ComparatorLiteral here")
  };
  match token_type {
    TokenType::Eq => Comparator::Eq,
    TokenType::Ne => Comparator::Ne,
    TokenType::Lt => Comparator::Lt,
    TokenType::Le => Comparator::Le,
    TokenType::Gt => Comparator::Gt,
    TokenType::Ge => Comparator::Ge,
    TokenType::Has => Comparator::Has,
    TokenType::In => Comparator::In,
    _ => unreachable!("TokenType::is_comparator() guarantees one of the above"),
  }
}

fn field_step_name(ast: &AstExpr) -> Option<String> {
  match ast {
    AstExpr::TextLiteral { value, .. } | AstExpr::StringLiteral { value, .. } => Some(value.clone()),
    AstExpr::KeywordExpr { lexeme, .. } => Some(lexeme.clone()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use aip_schema::testing::{TestEnum, TestField, TestFunctionRegistry, TestMap, TestMessage};
  use aip_schema::{ArgDeclaration, FunctionDeclaration, ReturnDeclaration};

  use super::*;

  fn schema() -> TestMessage {
    TestMessage::new("pkg.Resource")
      .with_field(TestField::scalar("name", Kind::String))
      .with_field(TestField::scalar("i32", Kind::Int32))
      .with_field(TestField::scalar("tags", Kind::String).repeated())
      .with_field(TestField::scalar("status", Kind::Enum).with_enum(TestEnum::new("pkg.Status", [("ACTIVE", 1), ("INACTIVE", 2)])))
      .with_field(
        TestField::scalar("map_str_duration", Kind::Map).with_map(TestMap { key_kind: Kind::String, value: TestField::scalar("value", Kind::Duration) }),
      )
      .with_field(TestField::scalar("sub", Kind::Message).with_message(TestMessage::new("pkg.Sub").with_field(TestField::scalar("id", Kind::Int64))))
  }

  fn parse(message: &TestMessage, source: &str) -> Result<Option<Expr>, ErrorKind> {
    let interp = Interpreter::new(message);
    let mut engine = DiagnosticEngine::new();
    interp.parse(source, Dialect::all(), &mut engine)
  }

  #[test]
  fn binds_a_simple_scalar_comparison() {
    let message = schema();
    let expr = parse(&message, "name = \"hi\"").unwrap().unwrap();
    assert_eq!(expr, Expr::Compare { left: Box::new(Expr::FieldSelector(FieldSelector::new("pkg.Resource", "name", 1))), cmp: Comparator::Eq, right: Box::new(Expr::Value(Value::String("hi".into()))) });
  }

  #[test]
  fn binds_a_nested_member_comparison() {
    let message = schema();
    let expr = parse(&message, "sub.id = 5").unwrap().unwrap();
    let Expr::Compare { left, .. } = expr else { panic!("expected a compare node") };
    let Expr::FieldSelector(selector) = *left else { panic!("expected a field selector") };
    assert_eq!(selector.dotted_path(), "sub.id");
  }

  #[test]
  fn binds_a_comparison_against_an_indirect_selector() {
    let message = schema();
    let expr = parse(&message, "i32 = sub.id").unwrap().unwrap();
    let Expr::Compare { right, .. } = expr else { panic!("expected a compare node") };
    let Expr::FieldSelector(selector) = *right else { panic!("expected a field selector on the right") };
    assert_eq!(selector.dotted_path(), "sub.id");
  }

  #[test]
  fn rejects_a_restriction_comparing_a_field_against_itself() {
    let message = schema();
    let mut engine = DiagnosticEngine::new();
    let interp = Interpreter::new(&message);
    let err = interp.parse("i32 = i32", Dialect::all(), &mut engine).unwrap_err();
    assert_eq!(err, ErrorKind::AmbiguousField);
  }

  #[test]
  fn binds_a_fractional_duration_literal() {
    let message = schema();
    let expr = parse(&message, "map_str_duration.\"key\":1.5s").unwrap().unwrap();
    let Expr::Compare { right, .. } = expr else { panic!("expected a compare node") };
    assert_eq!(*right, Expr::Value(Value::Duration(chrono::Duration::milliseconds(1500))));
  }

  #[test]
  fn rejects_an_ordered_comparator_against_a_repeated_field() {
    let message = schema();
    let mut engine = DiagnosticEngine::new();
    let interp = Interpreter::new(&message);
    assert!(interp.parse("tags > \"a\"", Dialect::all(), &mut engine).is_err());
  }

  #[test]
  fn accepts_has_against_a_repeated_field() {
    let message = schema();
    let expr = parse(&message, "tags:\"prod\"").unwrap().unwrap();
    assert!(matches!(expr, Expr::Compare { cmp: Comparator::Has, .. }));
  }

  #[test]
  fn binds_a_map_key_has_restriction() {
    let message = schema();
    let expr = parse(&message, "map_str_duration.\"key\":1s").unwrap().unwrap();
    let Expr::Compare { left, right, cmp } = expr else { panic!("expected a compare node") };
    assert_eq!(cmp, Comparator::Has);
    let Expr::FieldSelector(selector) = *left else { panic!("expected a field selector") };
    let Expr::MapKey { key, .. } = *selector.traversal.unwrap() else { panic!("expected a map key") };
    assert_eq!(*key, Expr::Value(Value::String("key".into())));
    assert_eq!(*right, Expr::Value(Value::Duration(chrono::Duration::seconds(1))));
  }

  #[test]
  fn binds_an_in_array_restriction() {
    let message = schema();
    let expr = parse(&message, "name IN [\"a\", \"b\"]").unwrap().unwrap();
    let Expr::Compare { right, .. } = expr else { panic!("expected a compare node") };
    assert_eq!(*right, Expr::Array(vec![Expr::Value(Value::String("a".into())), Expr::Value(Value::String("b".into()))]));
  }

  #[test]
  fn binds_a_wildcard_string_search() {
    let message = schema();
    let expr = parse(&message, "name = \"prod-*\"").unwrap().unwrap();
    let Expr::Compare { right, .. } = expr else { panic!("expected a compare node") };
    assert_eq!(*right, Expr::StringSearch { value: "prod-".into(), prefix_wildcard: false, suffix_wildcard: true });
  }

  #[test]
  fn binds_an_enum_comparison_by_name() {
    let message = schema();
    let expr = parse(&message, "status = \"ACTIVE\"").unwrap().unwrap();
    let Expr::Compare { right, .. } = expr else { panic!("expected a compare node") };
    assert_eq!(*right, Expr::Value(Value::Enum(1)));
  }

  #[test]
  fn rejects_traversal_through_a_field_that_forbids_filtering() {
    let message = TestMessage::new("pkg.Resource").with_field(TestField::scalar("sub", Kind::Message).with_message(TestMessage::new("pkg.Sub")).forbidden());
    let mut engine = DiagnosticEngine::new();
    let interp = Interpreter::new(&message);
    assert!(interp.parse("sub.id = 1", Dialect::all(), &mut engine).is_err());
  }

  #[test]
  fn an_empty_filter_binds_to_none() {
    let message = schema();
    assert_eq!(parse(&message, "").unwrap(), None);
  }

  #[test]
  fn resolves_a_function_call_against_a_registered_declaration() {
    let message = schema();
    let registry = TestFunctionRegistry::new().with_function(FunctionDeclaration {
      name: "math.max".into(),
      args: vec![
        ArgDeclaration {
          kind: Kind::Int64,
          cardinality: Cardinality::Optional,
          nullable: false,
          allow_indirect: true,
          enum_full_name: None,
          message_full_name: None,
          map_key_kind: None,
          map_value_kind: None,
          indirect_allowlist: vec![],
        },
        ArgDeclaration {
          kind: Kind::Int64,
          cardinality: Cardinality::Optional,
          nullable: false,
          allow_indirect: false,
          enum_full_name: None,
          message_full_name: None,
          map_key_kind: None,
          map_value_kind: None,
          indirect_allowlist: vec![],
        },
      ],
      returns: Some(ReturnDeclaration { kind: Kind::Int64, cardinality: Cardinality::Optional, nullable: false, map_key_kind: None, map_value_kind: None }),
    });
    let mut engine = DiagnosticEngine::new();
    let interp = Interpreter::new(&message).with_functions(&registry);
    let expr = interp.parse("math.max(i32, 3) > 0", Dialect::all(), &mut engine).unwrap().unwrap();
    assert!(matches!(expr, Expr::Compare { .. }));
  }

  #[test]
  fn binds_an_order_by_clause_list() {
    let message = schema();
    let mut engine = DiagnosticEngine::new();
    let interp = Interpreter::new(&message);
    let expr = interp.parse_order_by("name desc, sub.id", &mut engine).unwrap();
    let Expr::OrderBy(fields) = expr else { panic!("expected an order-by node") };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].order, Order::Desc);
    assert_eq!(fields[1].field.dotted_path(), "sub.id");
  }
}
