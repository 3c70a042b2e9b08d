//! Timestamp and duration literal parsing (§4.8). The scanner only decides
//! *whether* a lexeme looks like a timestamp (`aip_scanner::rfc3339`); these
//! parsers turn an accepted lexeme into the actual value a [`crate::Value`]
//! carries.

use chrono::{DateTime, FixedOffset};

pub fn parse_timestamp(lexeme: &str) -> Result<DateTime<FixedOffset>, String> {
  DateTime::parse_from_rfc3339(lexeme).map_err(|e| format!("invalid RFC 3339 timestamp {lexeme:?}: {e}"))
}

/// Parses the well-known `1h30m45.5s` chained-unit duration syntax (units:
/// `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`). The scanner never hands this
/// parser a leading `-`: that character lexes as a standalone `Minus`
/// token, so a duration literal here is always non-negative.
pub fn parse_duration(lexeme: &str) -> Result<chrono::Duration, String> {
  let mut remaining = lexeme;
  let mut total = chrono::Duration::zero();
  let mut consumed_any = false;

  while !remaining.is_empty() {
    let digits_end = remaining.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(remaining.len());
    if digits_end == 0 {
      return Err(format!("malformed duration {lexeme:?}: expected a number"));
    }
    let number_str = &remaining[..digits_end];
    let number: f64 = number_str.parse().map_err(|_| format!("malformed duration {lexeme:?}: bad number {number_str:?}"))?;
    remaining = &remaining[digits_end..];

    let (unit, rest) = split_unit(remaining).ok_or_else(|| format!("malformed duration {lexeme:?}: unrecognized unit"))?;
    let nanos_per_unit: f64 = match unit {
      "ns" => 1.0,
      "us" | "µs" => 1_000.0,
      "ms" => 1_000_000.0,
      "s" => 1_000_000_000.0,
      "m" => 60_000_000_000.0,
      "h" => 3_600_000_000_000.0,
      other => return Err(format!("malformed duration {lexeme:?}: unknown unit {other:?}")),
    };

    let nanos = number * nanos_per_unit;
    total += chrono::Duration::nanoseconds(nanos as i64);
    consumed_any = true;
    remaining = rest;
  }

  if !consumed_any {
    return Err(format!("malformed duration {lexeme:?}: empty literal"));
  }
  Ok(total)
}

/// Splits a leading known unit suffix off `s`, longest match first so `ms`
/// is not mistaken for `m` followed by stray `s`.
fn split_unit(s: &str) -> Option<(&str, &str)> {
  for unit in ["ns", "µs", "us", "ms", "h", "m", "s"] {
    if let Some(rest) = s.strip_prefix(unit) {
      return Some((unit, rest));
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_zulu_timestamp() {
    let ts = parse_timestamp("2023-01-15T10:30:00Z").unwrap();
    assert_eq!(ts.to_rfc3339(), "2023-01-15T10:30:00+00:00");
  }

  #[test]
  fn parses_a_single_unit_duration() {
    let d = parse_duration("1.5s").unwrap();
    assert_eq!(d.num_milliseconds(), 1500);
  }

  #[test]
  fn parses_a_chained_duration() {
    let d = parse_duration("1h30m").unwrap();
    assert_eq!(d.num_minutes(), 90);
  }

  #[test]
  fn rejects_an_unknown_unit() {
    assert!(parse_duration("5x").is_err());
  }
}
