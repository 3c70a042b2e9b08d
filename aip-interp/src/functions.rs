//! Function-call handling (§4.5 "Function-call handling"): checks a
//! resolved argument list against a [`FunctionDeclaration`]'s shape.
//!
//! This core validates shape and produces the call node; it does not invoke
//! anything. A function with a return declaration is still emitted as
//! [`Expr::FunctionCall`] rather than inlined to its result — evaluating the
//! call is a downstream planner's job, outside what binding the tree needs
//! to do (see DESIGN.md).

use aip_schema::{FunctionDeclaration, Kind};
use aip_tree::{Expr, Value};

/// Checks arity and per-argument kind/indirection rules. `args` have already
/// been bound to [`Expr`] leaves by the caller.
pub fn validate_call(decl: &FunctionDeclaration, args: &[Expr]) -> Result<(), String> {
  if args.len() != decl.args.len() {
    return Err(format!("{} expects {} argument(s), got {}", decl.name, decl.args.len(), args.len()));
  }

  for (i, (arg, arg_decl)) in args.iter().zip(&decl.args).enumerate() {
    if matches!(arg, Expr::Value(Value::Null)) {
      if !arg_decl.nullable {
        return Err(format!("argument {i} to {} is not nullable", decl.name));
      }
      continue;
    }

    if let Expr::FunctionCall { name, .. } = arg {
      if !arg_decl.allow_indirect {
        return Err(format!("argument {i} to {} does not accept a function call", decl.name));
      }
      if !arg_decl.indirect_allowlist.is_empty() && !arg_decl.indirect_allowlist.iter().any(|allowed| allowed == name) {
        return Err(format!("{name} is not on the indirect allowlist for argument {i} of {}", decl.name));
      }
      continue;
    }

    if matches!(arg, Expr::FieldSelector(_)) {
      if !arg_decl.allow_indirect {
        return Err(format!("argument {i} to {} does not accept a field selector", decl.name));
      }
      continue;
    }

    match expr_kind(arg) {
      Some(kind) if kind.is_comparable_with(arg_decl.kind) => {},
      _ => return Err(format!("argument {i} to {} does not match the declared kind", decl.name)),
    }
  }

  Ok(())
}

fn expr_kind(expr: &Expr) -> Option<Kind> {
  match expr {
    Expr::Value(Value::String(_)) => Some(Kind::String),
    Expr::Value(Value::I64(_)) => Some(Kind::Int64),
    Expr::Value(Value::U64(_)) => Some(Kind::Uint64),
    Expr::Value(Value::Bool(_)) => Some(Kind::Bool),
    Expr::Value(Value::F64(_)) => Some(Kind::Double),
    Expr::Value(Value::Bytes(_)) => Some(Kind::Bytes),
    Expr::Value(Value::Timestamp(_)) => Some(Kind::Timestamp),
    Expr::Value(Value::Duration(_)) => Some(Kind::Duration),
    Expr::Value(Value::Enum(_)) => Some(Kind::Enum),
    Expr::Value(Value::Message(_)) => Some(Kind::Message),
    Expr::Value(Value::Json(_)) => Some(Kind::Struct),
    Expr::Value(Value::Null) => None,
    Expr::StringSearch { .. } => Some(Kind::String),
    Expr::Array(_) => None,
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use aip_schema::{ArgDeclaration, Cardinality};

  use super::*;

  fn decl() -> FunctionDeclaration {
    FunctionDeclaration {
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
      returns: Some(aip_schema::ReturnDeclaration { kind: Kind::Int64, cardinality: Cardinality::Optional, nullable: false, map_key_kind: None, map_value_kind: None }),
    }
  }

  #[test]
  fn accepts_matching_direct_arguments() {
    let args = vec![Expr::Value(Value::I64(1)), Expr::Value(Value::I64(2))];
    assert!(validate_call(&decl(), &args).is_ok());
  }

  #[test]
  fn rejects_a_wrong_arity_call() {
    let args = vec![Expr::Value(Value::I64(1))];
    assert!(validate_call(&decl(), &args).is_err());
  }

  #[test]
  fn rejects_an_indirect_argument_in_a_direct_only_slot() {
    use aip_tree::FieldSelector;
    let args = vec![Expr::Value(Value::I64(1)), Expr::FieldSelector(FieldSelector::new("pkg.Msg", "x", 1))];
    assert!(validate_call(&decl(), &args).is_err());
  }
}
