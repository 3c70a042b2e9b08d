//! RFC 3339 date-time shape validation (§4.8), used purely to settle the
//! scanner's timestamp-vs-text ambiguity (§4.1). This only checks that a
//! candidate lexeme has the right shape; turning an accepted lexeme into an
//! actual instant is `aip_tree::wellknown::timestamp`'s job.

/// `true` if `s` matches `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)`.
pub fn is_rfc3339(s: &str) -> bool {
  let bytes = s.as_bytes();
  if bytes.len() < "YYYY-MM-DDTHH:MM:SS".len() {
    return false;
  }

  let digit = |i: usize| -> Option<u32> { bytes.get(i).filter(|b| b.is_ascii_digit()).map(|b| (*b - b'0') as u32) };
  let two_digits = |i: usize| -> Option<u32> { Some(digit(i)? * 10 + digit(i + 1)?) };

  if bytes[4] != b'-' || bytes[7] != b'-' || (bytes[10] != b'T' && bytes[10] != b't') || bytes[13] != b':' || bytes[16] != b':' {
    return false;
  }

  let Some(year) = (|| Some(digit(0)? * 1000 + digit(1)? * 100 + digit(2)? * 10 + digit(3)?))() else {
    return false;
  };
  let Some(month) = two_digits(5) else { return false };
  let Some(day) = two_digits(8) else { return false };
  let Some(hour) = two_digits(11) else { return false };
  let Some(minute) = two_digits(14) else { return false };
  let Some(second) = two_digits(17) else { return false };

  if !(1..=12).contains(&month) {
    return false;
  }
  if day < 1 || day > days_in_month(month, year) {
    return false;
  }
  if hour > 23 || minute > 59 || second > 60 {
    // a leap second (:60) is tolerated the way most RFC 3339 validators do.
    return false;
  }

  let mut idx = 19;
  if bytes.get(idx) == Some(&b'.') {
    idx += 1;
    let fraction_start = idx;
    while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
      idx += 1;
    }
    if idx == fraction_start {
      return false; // "." with no digits after it.
    }
  }

  match bytes.get(idx) {
    Some(b'Z') | Some(b'z') => idx + 1 == bytes.len(),
    Some(b'+') | Some(b'-') => {
      let rest = &bytes[idx + 1..];
      rest.len() == 5 && rest[2] == b':' && rest[0].is_ascii_digit() && rest[1].is_ascii_digit() && rest[3].is_ascii_digit() && rest[4].is_ascii_digit()
    },
    _ => false,
  }
}

fn is_leap_year(year: u32) -> bool {
  (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(month: u32, year: u32) -> u32 {
  match month {
    1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
    4 | 6 | 9 | 11 => 30,
    2 if is_leap_year(year) => 29,
    2 => 28,
    _ => 0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_a_zulu_timestamp() {
    assert!(is_rfc3339("2023-01-15T10:30:00Z"));
  }

  #[test]
  fn accepts_fractional_seconds_and_offsets() {
    assert!(is_rfc3339("2023-01-15T10:30:00.125+02:00"));
  }

  #[test]
  fn rejects_an_invalid_month() {
    assert!(!is_rfc3339("2023-13-15T10:30:00Z"));
  }

  #[test]
  fn rejects_feb_29_on_a_non_leap_year() {
    assert!(!is_rfc3339("2023-02-29T00:00:00Z"));
  }

  #[test]
  fn accepts_feb_29_on_a_leap_year() {
    assert!(is_rfc3339("2024-02-29T00:00:00Z"));
  }

  #[test]
  fn rejects_plain_text_with_colons() {
    assert!(!is_rfc3339("sub.field:value"));
  }
}
