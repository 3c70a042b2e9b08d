//! Per-kind value parsers (§4.6): turn an already-parsed arg node into a
//! typed [`Expr`] leaf. Each parser only ever sees the arg it owns; array
//! dispatch for `IN` and for repeated call arguments lives one level up, in
//! the interpreter's own binder methods.

use aip_ast::AstExpr;
use aip_schema::{EnumDescriptor, Kind};
use aip_tree::{wellknown, Expr, Value};

pub fn is_null_literal(ast: &AstExpr) -> bool {
  matches!(ast, AstExpr::TextLiteral { value, .. } if value == "null")
}

/// A restriction's comparable and its argument both parse through
/// `parse_comparable` (aip-parser), which wraps every value — including a
/// single bare literal or field name with no dotted continuation — in a
/// `MemberExpr` with an empty `fields` list. Unwrap that shape so a plain
/// literal arg (`"hi"`, `5`, `ACTIVE`) binds the same as it would if the
/// grammar exposed it unwrapped; a non-empty `fields` list is left alone,
/// since that is either a real selector path or a continuation literal
/// handled separately (see `continuation_text`).
fn literal_text(ast: &AstExpr) -> Option<&str> {
  match ast {
    AstExpr::StringLiteral { value, .. } => Some(value),
    AstExpr::TextLiteral { value, .. } => Some(value),
    AstExpr::KeywordExpr { lexeme, .. } => Some(lexeme),
    AstExpr::MemberExpr { value, fields, .. } if fields.is_empty() => literal_text(value),
    _ => None,
  }
}

/// Binds a scalar (non-map, non-array) arg to the value shape `kind` names.
/// `nullable` is checked first since `null` is spelled the same bare word
/// regardless of the field's declared kind. `allow_indirect` gates the
/// string parser's wildcard-search handling (§4.5 point 4, §4.6 string row).
pub fn bind_scalar(kind: Kind, nullable: bool, allow_indirect: bool, enum_descriptor: Option<&dyn EnumDescriptor>, ast: &AstExpr) -> Result<Expr, String> {
  if nullable && is_null_literal(ast) {
    return Ok(Expr::Value(Value::Null));
  }
  match kind {
    Kind::String => Ok(bind_string(ast, allow_indirect)?),
    Kind::Int32 | Kind::Int64 => bind_signed(ast).map(Value::I64).map(Expr::Value),
    Kind::Uint32 | Kind::Uint64 => bind_unsigned(ast).map(Value::U64).map(Expr::Value),
    Kind::Float | Kind::Double => bind_float(ast).map(Value::F64).map(Expr::Value),
    Kind::Bool => bind_bool(ast).map(Value::Bool).map(Expr::Value),
    Kind::Bytes => bind_bytes(ast).map(Value::Bytes).map(Expr::Value),
    Kind::Enum => bind_enum(ast, enum_descriptor).map(Value::Enum).map(Expr::Value),
    Kind::Timestamp => bind_timestamp(ast).map(Value::Timestamp).map(Expr::Value),
    Kind::Duration => bind_duration(ast).map(Value::Duration).map(Expr::Value),
    Kind::Message => Ok(Expr::Value(Value::Message(bind_struct_literal(ast)?))),
    Kind::Struct => Ok(Expr::Value(Value::Json(bind_struct_literal(ast)?))),
    Kind::Map => Err("a map field's value is bound through its key path, not as a scalar".to_string()),
  }
}

/// `string` (§4.6): a leading/trailing `*` marks a prefix/suffix wildcard and
/// yields a [`Expr::StringSearch`], but only when `allow_indirect` permits a
/// search pattern at this call site; a bare `*` (nothing left once the
/// wildcard markers are stripped) is never a valid pattern.
fn bind_string(ast: &AstExpr, allow_indirect: bool) -> Result<Expr, String> {
  let raw = literal_text(ast).ok_or_else(|| "expected a string value".to_string())?;
  let prefix_wildcard = raw.starts_with('*');
  let suffix_wildcard = raw.ends_with('*');
  if !prefix_wildcard && !suffix_wildcard {
    return Ok(Expr::Value(Value::String(raw.to_string())));
  }
  if !allow_indirect {
    return Err(format!("wildcard string search {raw:?} is not legal in this position"));
  }
  let mut value = raw;
  if prefix_wildcard {
    value = &value[1..];
  }
  if suffix_wildcard && !value.is_empty() {
    value = &value[..value.len() - 1];
  }
  if value.is_empty() {
    return Err("a bare `*` is not a valid string search pattern".to_string());
  }
  Ok(Expr::StringSearch { value: value.to_string(), prefix_wildcard, suffix_wildcard })
}

fn bind_signed(ast: &AstExpr) -> Result<i64, String> {
  let text = literal_text(ast).ok_or_else(|| "expected an integer".to_string())?;
  parse_integer_magnitude(text).and_then(|m| i64::try_from(m).map_err(|_| format!("integer literal out of i64 range: {text:?}")))
}

fn bind_unsigned(ast: &AstExpr) -> Result<u64, String> {
  let text = literal_text(ast).ok_or_else(|| "expected an integer".to_string())?;
  parse_integer_magnitude(text).and_then(|m| u64::try_from(m).map_err(|_| format!("integer literal out of u64 range: {text:?}")))
}

/// Accepts decimal, `0x`-hex and `0o`-octal spellings (§4.6 "signed/unsigned
/// integer"). The scanner never hands this a leading `-`; see
/// `aip_tree::wellknown` for the equivalent note on durations.
fn parse_integer_magnitude(text: &str) -> Result<u128, String> {
  if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    return u128::from_str_radix(hex, 16).map_err(|_| format!("not a valid hex integer: {text:?}"));
  }
  if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
    return u128::from_str_radix(oct, 8).map_err(|_| format!("not a valid octal integer: {text:?}"));
  }
  text.parse::<u128>().map_err(|_| format!("not a valid integer: {text:?}"))
}

/// `float`/`double` (§4.6): a plain integer literal, or `integer.integer`
/// reassembled by [`continuation_text`] since the scanner never hands the
/// parser a token spanning the `.`.
fn bind_float(ast: &AstExpr) -> Result<f64, String> {
  if let Some(text) = literal_text(ast) {
    return text.parse::<f64>().map_err(|_| format!("not a valid float: {text:?}"));
  }
  let text = continuation_text(ast).ok_or_else(|| "expected a float".to_string())?;
  text.parse::<f64>().map_err(|_| format!("not a valid float: {text:?}"))
}

fn bind_bool(ast: &AstExpr) -> Result<bool, String> {
  let text = literal_text(ast).ok_or_else(|| "expected a bool".to_string())?;
  match text {
    "true" => Ok(true),
    "false" => Ok(false),
    other => Err(format!("not a valid bool: {other:?}")),
  }
}

/// `bytes` (§4.6): a `0x`-prefixed literal is hex-decoded, otherwise the
/// literal's UTF-8 bytes are taken verbatim.
fn bind_bytes(ast: &AstExpr) -> Result<Vec<u8>, String> {
  let text = literal_text(ast).ok_or_else(|| "expected a bytes literal".to_string())?;
  if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    if hex.len() % 2 != 0 {
      return Err(format!("odd number of hex digits in bytes literal: {text:?}"));
    }
    return (0..hex.len())
      .step_by(2)
      .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex byte in {text:?}")))
      .collect();
  }
  Ok(text.as_bytes().to_vec())
}

fn bind_enum(ast: &AstExpr, descriptor: Option<&dyn EnumDescriptor>) -> Result<i32, String> {
  let text = literal_text(ast).ok_or_else(|| "expected an enum value name".to_string())?;
  let descriptor = descriptor.ok_or_else(|| "field has no enum descriptor bound".to_string())?;
  if let Ok(numeric) = text.parse::<i32>() {
    if descriptor.name_by_value(numeric).is_some() {
      return Ok(numeric);
    }
  }
  descriptor.value_by_name(text).ok_or_else(|| format!("{text:?} is not a value of enum {}", descriptor.full_name()))
}

fn bind_timestamp(ast: &AstExpr) -> Result<chrono::DateTime<chrono::FixedOffset>, String> {
  let text = literal_text(ast).ok_or_else(|| "expected a timestamp".to_string())?;
  wellknown::parse_timestamp(text)
}

/// `duration` (§4.6): `<number>[.<fraction>]<unit>`, reassembled by
/// [`continuation_text`] the same way as [`bind_float`] when the fractional
/// piece landed in a separate AST node (e.g. `1.5s`).
fn bind_duration(ast: &AstExpr) -> Result<chrono::Duration, String> {
  if let Some(text) = literal_text(ast) {
    return wellknown::parse_duration(text);
  }
  let text = continuation_text(ast).ok_or_else(|| "expected a duration".to_string())?;
  wellknown::parse_duration(&text)
}

/// §4.6 "argument continuation": `1.5` scans as a text literal `1` followed
/// by a member step `5` (the scanner terminates text runs at `.`), so a
/// fractional float or duration literal arrives as a single-step
/// [`AstExpr::MemberExpr`] instead of one token. Stitches it back into
/// `"1.5"` so the per-kind parser above can treat it as one literal.
fn continuation_text(ast: &AstExpr) -> Option<String> {
  let AstExpr::MemberExpr { value, fields, .. } = ast else { return None };
  let [field] = fields.as_slice() else { return None };
  let AstExpr::TextLiteral { value: root, .. } = value.as_ref() else { return None };
  let AstExpr::TextLiteral { value: field, .. } = field else { return None };
  Some(format!("{root}.{field}"))
}

/// `message` / JSON-struct (§4.6): rendered to canonical JSON rather than
/// bound against a second schema, matching [`aip_tree::Value::Message`]'s
/// doc comment.
fn bind_struct_literal(ast: &AstExpr) -> Result<serde_json::Value, String> {
  Ok(ast_to_json(ast))
}

pub(crate) fn ast_to_json(ast: &AstExpr) -> serde_json::Value {
  match ast {
    AstExpr::StringLiteral { value, .. } => serde_json::Value::String(value.clone()),
    AstExpr::TextLiteral { value, .. } => text_to_json(value),
    AstExpr::KeywordExpr { lexeme, .. } => serde_json::Value::String(lexeme.clone()),
    AstExpr::ArrayExpr { elements, .. } => serde_json::Value::Array(elements.iter().map(ast_to_json).collect()),
    AstExpr::StructExpr { elements, .. } => {
      let mut object = serde_json::Map::new();
      for field in elements {
        object.insert(field.name.value().to_string(), ast_to_json(&field.value));
      }
      serde_json::Value::Object(object)
    },
    other => serde_json::Value::String(other.render(false)),
  }
}

fn text_to_json(value: &str) -> serde_json::Value {
  match value {
    "true" => serde_json::Value::Bool(true),
    "false" => serde_json::Value::Bool(false),
    "null" => serde_json::Value::Null,
    _ => {
      if let Ok(n) = value.parse::<i64>() {
        serde_json::Value::Number(n.into())
      } else if let Ok(f) = value.parse::<f64>() {
        serde_json::Number::from_f64(f).map(serde_json::Value::Number).unwrap_or_else(|| serde_json::Value::String(value.to_string()))
      } else {
        serde_json::Value::String(value.to_string())
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use aip_scanner::token::types::TokenType;

  use super::*;

  fn text(value: &str) -> AstExpr {
    AstExpr::TextLiteral { value: value.to_string(), token_type: TokenType::Text, position: 0 }
  }

  fn string(value: &str) -> AstExpr {
    AstExpr::StringLiteral { value: value.to_string(), position: 0 }
  }

  fn member(root: &str, field: &str) -> AstExpr {
    AstExpr::MemberExpr {
      value: Box::new(text(root)),
      fields: vec![text(field)],
      position: 0,
    }
  }

  #[test]
  fn binds_a_plain_string_literal() {
    let expr = bind_scalar(Kind::String, false, true, None, &string("hello")).unwrap();
    assert_eq!(expr, Expr::Value(Value::String("hello".into())));
  }

  #[test]
  fn binds_a_wildcard_string_into_a_search_node() {
    let expr = bind_scalar(Kind::String, false, true, None, &string("*.log")).unwrap();
    assert_eq!(expr, Expr::StringSearch { value: ".log".into(), prefix_wildcard: true, suffix_wildcard: false });
  }

  #[test]
  fn rejects_a_wildcard_string_when_indirection_is_not_allowed() {
    assert!(bind_scalar(Kind::String, false, false, None, &string("*.log")).is_err());
  }

  #[test]
  fn rejects_a_bare_wildcard_string() {
    assert!(bind_scalar(Kind::String, false, true, None, &string("*")).is_err());
  }

  #[test]
  fn binds_a_hex_integer() {
    let expr = bind_scalar(Kind::Int64, false, true, None, &text("0xFF")).unwrap();
    assert_eq!(expr, Expr::Value(Value::I64(255)));
  }

  #[test]
  fn binds_a_null_literal_only_when_nullable() {
    assert_eq!(bind_scalar(Kind::Int64, true, true, None, &text("null")).unwrap(), Expr::Value(Value::Null));
    assert!(bind_scalar(Kind::Int64, false, true, None, &text("null")).is_err());
  }

  #[test]
  fn binds_a_duration_literal() {
    let expr = bind_scalar(Kind::Duration, false, true, None, &text("1h30m")).unwrap();
    assert_eq!(expr, Expr::Value(Value::Duration(chrono::Duration::minutes(90))));
  }

  #[test]
  fn binds_a_fractional_duration_literal_split_across_a_member_step() {
    let expr = bind_scalar(Kind::Duration, false, true, None, &member("1", "5s")).unwrap();
    assert_eq!(expr, Expr::Value(Value::Duration(chrono::Duration::milliseconds(1500))));
  }

  #[test]
  fn binds_a_fractional_float_literal_split_across_a_member_step() {
    let expr = bind_scalar(Kind::Float, false, true, None, &member("1", "5")).unwrap();
    assert_eq!(expr, Expr::Value(Value::F64(1.5)));
  }

  #[test]
  fn binds_an_enum_by_name() {
    use aip_schema::testing::TestEnum;
    let e = TestEnum::new("pkg.Status", [("ACTIVE", 1)]);
    let expr = bind_scalar(Kind::Enum, false, true, Some(&e), &text("ACTIVE")).unwrap();
    assert_eq!(expr, Expr::Value(Value::Enum(1)));
  }
}
