use std::fmt;

/// The closed set of restriction operators (§3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  Has,
  In,
}

impl Comparator {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Eq => "=",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
      Self::Has => ":",
      Self::In => "IN",
    }
  }

  /// Ordered comparators are legal only between kinds with a meaningful
  /// order (§4.5 restriction legality matrix: "ordered only when kind is
  /// numeric/temporal/string").
  pub fn is_ordered(self) -> bool {
    matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
  }
}

impl fmt::Display for Comparator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
