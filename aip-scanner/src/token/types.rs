/// The closed set of lexical classes a filter source string can scan to
/// (§3 "Tokens"). Category predicates below are total functions over this
/// set, used by the parser and interpreter to branch without matching every
/// variant by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
  Whitespace,
  Eof,

  // Literals.
  StringLiteral,
  /// A bare word, number, keyword spelling, or timestamp candidate; callers
  /// that need to tell these apart read `Token::lexeme`, or let the
  /// per-kind value parser for the field in question settle it (§4.6).
  Text,
  Timestamp,

  // Logical keywords.
  And,
  Or,
  Not,
  Asc,
  Desc,
  In,

  // Comparators.
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  Has,

  // Punctuation.
  LeftParen,
  RightParen,
  Comma,
  Dot,
  LeftBracket,
  RightBracket,
  LeftBrace,
  RightBrace,
  Star,
  Minus,
}

impl TokenType {
  pub fn is_literal(self) -> bool {
    matches!(self, Self::StringLiteral | Self::Text | Self::Timestamp)
  }

  pub fn is_comparator(self) -> bool {
    matches!(
      self,
      Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::Has | Self::In
    )
  }

  pub fn is_logical(self) -> bool {
    matches!(self, Self::And | Self::Or | Self::Not)
  }

  pub fn is_keyword(self) -> bool {
    matches!(self, Self::And | Self::Or | Self::Not | Self::Asc | Self::Desc | Self::In)
  }

  /// True for the lexical shape `TokenType::Text` covers whose lexeme may
  /// parse as a decimal, hex, or octal integer; the distinction between
  /// those three forms is made by the per-kind value parser (§4.6), not the
  /// scanner.
  pub fn is_integer_candidate(self) -> bool {
    matches!(self, Self::Text)
  }

  pub fn is_punctuation(self) -> bool {
    matches!(
      self,
      Self::LeftParen
        | Self::RightParen
        | Self::Comma
        | Self::Dot
        | Self::LeftBracket
        | Self::RightBracket
        | Self::LeftBrace
        | Self::RightBrace
        | Self::Star
        | Self::Minus
    )
  }
}

impl std::fmt::Display for TokenType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let text = match self {
      Self::Whitespace => "WHITESPACE",
      Self::Eof => "EOF",
      Self::StringLiteral => "STRING",
      Self::Text => "TEXT",
      Self::Timestamp => "TIMESTAMP",
      Self::And => "AND",
      Self::Or => "OR",
      Self::Not => "NOT",
      Self::Asc => "ASC",
      Self::Desc => "DESC",
      Self::In => "IN",
      Self::Eq => "=",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
      Self::Has => ":",
      Self::LeftParen => "(",
      Self::RightParen => ")",
      Self::Comma => ",",
      Self::Dot => ".",
      Self::LeftBracket => "[",
      Self::RightBracket => "]",
      Self::LeftBrace => "{",
      Self::RightBrace => "}",
      Self::Star => "*",
      Self::Minus => "-",
    };
    write!(f, "{text}")
  }
}
