//! `aip-filter-cli`: reads a filter string and prints the resulting
//! expression tree or its diagnostics. The direct analogue of the teacher's
//! `compiler`/`lox` binaries, scoped here to parsing only — it never
//! evaluates a filter against data.

use aip_filter::{Dialect, Expr, FilterEngine};
use aip_schema::{
  testing::{TestEnum, TestField, TestMessage},
  Kind,
};
use clap::Parser as ClapParser;
use colored::Colorize;

/// Ad-hoc filter parser against a small built-in demo schema.
#[derive(ClapParser)]
#[command(name = "aip-filter-cli", about = "Parse and bind an AIP-style filter expression")]
struct Cli {
  /// Filter source, e.g. `name = "prod-*" AND status = "ACTIVE"`.
  filter: String,

  /// Enable the `[...]` array literal dialect.
  #[arg(long)]
  arrays: bool,

  /// Enable the `{...}` struct literal dialect.
  #[arg(long)]
  structs: bool,

  /// Enable the `IN` comparator.
  #[arg(long = "in-operator")]
  in_operator: bool,

  /// Parse `filter` as an `order_by` clause list instead of a restriction.
  #[arg(long)]
  order_by: bool,
}

/// `pkg.Resource { name: string, count: int64, tags: repeated string,
/// status: enum { ACTIVE, INACTIVE } }` — the demo schema every CLI
/// invocation binds against, since no real descriptor library is in scope.
fn demo_schema() -> TestMessage {
  TestMessage::new("pkg.Resource")
    .with_field(TestField::scalar("name", Kind::String))
    .with_field(TestField::scalar("count", Kind::Int64))
    .with_field(TestField::scalar("tags", Kind::String).repeated())
    .with_field(TestField::scalar("status", Kind::Enum).with_enum(TestEnum::new("pkg.Status", [("ACTIVE", 1), ("INACTIVE", 2)])))
}

fn main() {
  aip_filter::init_tracing();
  let cli = Cli::parse();

  let dialect = Dialect { use_arrays: cli.arrays, use_structs: cli.structs, use_in_comparator: cli.in_operator };
  let message = demo_schema();
  let engine = FilterEngine::new(&message);

  let rendered = if cli.order_by {
    engine.parse_order_by(&cli.filter).map(|expr| expr.render())
  } else {
    engine.parse_filter(&cli.filter, dialect).map(|expr| expr.as_ref().map(Expr::render).unwrap_or_else(|| "<empty filter>".to_string()))
  };

  match rendered {
    Ok(text) => println!("{}", text.green()),
    Err(diagnostics) => {
      eprint!("{}", diagnostics.red());
      std::process::exit(65);
    },
  }
}
