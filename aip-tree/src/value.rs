use chrono::{DateTime, FixedOffset};

/// A leaf literal's runtime value (§3 "Value"). Mirrors a tagged interpreter
/// value the way `LoxValue` does, but closed over the kinds the filter
/// language's per-kind value parsers (§4.6) can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  String(String),
  I64(i64),
  U64(u64),
  Bool(bool),
  F64(f64),
  Bytes(Vec<u8>),
  Timestamp(DateTime<FixedOffset>),
  Duration(chrono::Duration),
  /// An enum's numeric value; the declaring enum's full name lives on the
  /// field descriptor that produced it, not the value itself.
  Enum(i32),
  /// A nested message literal, kept as canonical JSON rather than a
  /// descriptor-typed struct (§4.6 "message": "parsed into a dynamic message
  /// value" — JSON is this core's stand-in for "dynamic message" since the
  /// schema library that would give messages real identity is out of
  /// scope).
  Message(serde_json::Value),
  /// A JSON-struct field's value (§4.6 "JSON-struct").
  Json(serde_json::Value),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }
}

impl std::fmt::Display for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Null => write!(f, "null"),
      Self::String(s) => write!(f, "{s:?}"),
      Self::I64(v) => write!(f, "{v}"),
      Self::U64(v) => write!(f, "{v}"),
      Self::Bool(v) => write!(f, "{v}"),
      Self::F64(v) => write!(f, "{v}"),
      Self::Bytes(b) => write!(f, "bytes[{}]", b.len()),
      Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
      Self::Duration(d) => write!(f, "{}s", d.num_milliseconds() as f64 / 1000.0),
      Self::Enum(n) => write!(f, "enum({n})"),
      Self::Message(m) => write!(f, "{m}"),
      Self::Json(j) => write!(f, "{j}"),
    }
  }
}
