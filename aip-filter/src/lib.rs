//! Facade crate: the `compiler` role in this pipeline. Wires scanning,
//! parsing and schema binding behind a handful of convenience entry points
//! and re-exports the full pipeline so a caller never has to depend on
//! `aip-scanner`/`aip-parser`/`aip-interp` directly.

pub use aip_ast::AstExpr;
pub use aip_diagnostic::{
  diagnostic::Diagnostic,
  diagnostic_code::{DiagnosticCode, ErrorKind},
  DiagnosticEngine,
};
pub use aip_interp::Interpreter;
pub use aip_scanner::Dialect;
pub use aip_schema::{Cardinality, EnumDescriptor, FieldDescriptor, FunctionRegistry, Kind, MapDescriptor, MessageDescriptor};
pub use aip_tree::{Comparator, Expr, FieldSelector, Order, OrderByField, Value};

/// Installs a `tracing` subscriber reading `RUST_LOG` (default `info`), the
/// facade's analogue of the teacher's hand-rolled `logger` crate init.
pub fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Binds filter source strings against one schema (§4.5). A thin wrapper
/// over [`Interpreter`] that owns its own [`DiagnosticEngine`] per call and
/// renders failures to plain text, so callers at the CLI/service boundary
/// never need to reach into `aip-diagnostic` themselves.
pub struct FilterEngine<'a> {
  interp: Interpreter<'a>,
}

impl<'a> FilterEngine<'a> {
  pub fn new(descriptor: &'a dyn MessageDescriptor) -> Self {
    tracing::debug!(message = descriptor.full_name(), "binding filter engine to schema");
    Self { interp: Interpreter::new(descriptor) }
  }

  pub fn with_functions(mut self, functions: &'a dyn FunctionRegistry) -> Self {
    self.interp = self.interp.with_functions(functions);
    self
  }

  /// Parses one filter string (§4.1-§4.5 end to end). `Ok(None)` is an empty
  /// filter; `Err` carries the diagnostics rendered against `source`.
  pub fn parse_filter(&self, source: &str, dialect: Dialect) -> Result<Option<Expr>, String> {
    let span = tracing::debug_span!("parse_filter", len = source.len());
    let _enter = span.enter();
    let mut engine = DiagnosticEngine::new();
    self.interp.parse(source, dialect, &mut engine).map_err(|_| engine.format_all_plain(source))
  }

  /// Parses an `order_by` clause list (e.g. `"name desc, age"`).
  pub fn parse_order_by(&self, source: &str) -> Result<Expr, String> {
    let mut engine = DiagnosticEngine::new();
    self.interp.parse_order_by(source, &mut engine).map_err(|_| engine.format_all_plain(source))
  }

  /// Builds a `Pagination` node; there is nothing to fail, since no field
  /// reference needs binding.
  pub fn parse_pagination(&self, page_size: i32, skip: i32) -> Expr {
    self.interp.parse_pagination(page_size, skip)
  }
}

#[cfg(test)]
mod tests {
  use aip_schema::{
    testing::{TestField, TestMessage},
    Kind,
  };

  use super::*;

  fn schema() -> TestMessage {
    TestMessage::new("pkg.Resource").with_field(TestField::scalar("name", Kind::String)).with_field(TestField::scalar("count", Kind::Int64))
  }

  #[test]
  fn parses_and_renders_a_filter_through_the_facade() {
    let message = schema();
    let engine = FilterEngine::new(&message);
    let expr = engine.parse_filter("name = \"hi\" AND count > 1", Dialect::all()).unwrap().unwrap();
    assert_eq!(expr.render(), "name = \"hi\" AND count > 1");
  }

  #[test]
  fn surfaces_a_bind_error_as_rendered_diagnostics() {
    let message = schema();
    let engine = FilterEngine::new(&message);
    let err = engine.parse_filter("missing = 1", Dialect::all()).unwrap_err();
    assert!(err.contains("missing"));
  }

  #[test]
  fn parses_an_order_by_clause_through_the_facade() {
    let message = schema();
    let engine = FilterEngine::new(&message);
    let expr = engine.parse_order_by("name desc").unwrap();
    assert!(matches!(expr, Expr::OrderBy(_)));
  }
}
