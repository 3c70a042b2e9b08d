/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  Warning,
  Note,
  Help,
}

/// Unique identifier for each kind of diagnostic emitted while scanning,
/// parsing or interpreting a filter source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
  // Scanner (§4.1)
  UnterminatedString,
  InvalidCharacter,

  // Parser (§4.2)
  UnexpectedToken,
  UnexpectedEof,
  ExpectedExpression,
  MissingClosingParen,
  MissingClosingBracket,
  MissingClosingBrace,
  ExpectedComparator,
  ExpectedFieldName,
  ExpectedColon,
  DialectNotEnabled,

  // Interpreter / composer (§4.4, §4.5, §6)
  ComposerEmptySelector,
  NoHandlerFound,
  InvalidField,
  InvalidValue,
  FieldNotFound,
  InvalidAst,
  AmbiguousField,
  Internal,
}

impl DiagnosticCode {
  pub fn code(&self) -> &'static str {
    match self {
      Self::UnterminatedString => "E0001",
      Self::InvalidCharacter => "E0002",
      Self::UnexpectedToken => "E0100",
      Self::UnexpectedEof => "E0101",
      Self::ExpectedExpression => "E0102",
      Self::MissingClosingParen => "E0103",
      Self::MissingClosingBracket => "E0104",
      Self::MissingClosingBrace => "E0105",
      Self::ExpectedComparator => "E0106",
      Self::ExpectedFieldName => "E0107",
      Self::ExpectedColon => "E0108",
      Self::DialectNotEnabled => "E0109",
      Self::ComposerEmptySelector => "E0200",
      Self::NoHandlerFound => "E0201",
      Self::InvalidField => "E0202",
      Self::InvalidValue => "E0203",
      Self::FieldNotFound => "E0204",
      Self::InvalidAst => "E0205",
      Self::AmbiguousField => "E0206",
      Self::Internal => "E0900",
    }
  }

  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}

/// The closed set of surface error kinds a caller can match on (§6). Every
/// semantic or syntactic failure returned from a parsing function carries one
/// of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
  #[error("empty field selector")]
  ComposerEmptySelector,
  #[error("no handler registered for this function call")]
  NoHandlerFound,
  #[error("not a valid field")]
  InvalidField,
  #[error("value does not match the field's kind")]
  InvalidValue,
  #[error("field not found on the bound message")]
  FieldNotFound,
  #[error("malformed syntax")]
  InvalidAst,
  #[error("internal invariant violation")]
  Internal,
  #[error("field referenced ambiguously by both sides of a comparison")]
  AmbiguousField,
}

impl From<DiagnosticCode> for ErrorKind {
  fn from(code: DiagnosticCode) -> Self {
    match code {
      DiagnosticCode::ComposerEmptySelector => ErrorKind::ComposerEmptySelector,
      DiagnosticCode::NoHandlerFound => ErrorKind::NoHandlerFound,
      DiagnosticCode::InvalidField => ErrorKind::InvalidField,
      DiagnosticCode::InvalidValue => ErrorKind::InvalidValue,
      DiagnosticCode::FieldNotFound => ErrorKind::FieldNotFound,
      DiagnosticCode::InvalidAst => ErrorKind::InvalidAst,
      DiagnosticCode::AmbiguousField => ErrorKind::AmbiguousField,
      // Anything purely syntactic is surfaced to callers as malformed syntax.
      _ => ErrorKind::InvalidAst,
    }
  }
}
