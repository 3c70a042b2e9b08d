use aip_diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  diagnostic_code::DiagnosticCode,
  DiagnosticEngine,
};

use crate::token::Token;

pub mod rfc3339;
pub mod token;
mod utils;

/// The three dialect switches the grammar can be parsed under (§4.1, §6).
/// Outside its own dialect, a character simply lexes as ordinary text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dialect {
  pub use_arrays: bool,
  pub use_structs: bool,
  pub use_in_comparator: bool,
}

impl Dialect {
  pub fn all() -> Self {
    Self {
      use_arrays: true,
      use_structs: true,
      use_in_comparator: true,
    }
  }
}

/// Saved scanner position for speculative lookahead (§4.1, §9 "scanner
/// rollback"). Carries the byte offset and the one-token peek buffer that was
/// live when the breakpoint was taken, so `restore` puts both back exactly.
#[derive(Debug, Clone)]
pub struct Breakpoint {
  offset: usize,
  peeked: Option<Token>,
}

/// Scans a UTF-8 filter source string left to right into a [`Token`] stream.
pub struct Scanner {
  source: String,
  current: usize,
  dialect: Dialect,
  peeked: Option<Token>,
  error_count: usize,
}

impl Scanner {
  pub fn new() -> Self {
    Self {
      source: String::new(),
      current: 0,
      dialect: Dialect::default(),
      peeked: None,
      error_count: 0,
    }
  }

  /// Re-initializes the scanner for a new source string. An optional BOM at
  /// offset 0 is skipped.
  pub fn reset(&mut self, src: &str, dialect: Dialect) {
    self.source = src.to_string();
    self.current = 0;
    self.dialect = dialect;
    self.peeked = None;
    self.error_count = 0;

    const BOM: &str = "\u{feff}";
    if self.source.starts_with(BOM) {
      self.current = BOM.len();
    }
  }

  pub fn position(&self) -> u32 {
    self.current as u32
  }

  pub fn error_count(&self) -> usize {
    self.error_count
  }

  pub fn breakpoint(&self) -> Breakpoint {
    Breakpoint {
      offset: self.current,
      peeked: self.peeked.clone(),
    }
  }

  /// Restores a breakpoint taken earlier by *this* scanner. Restoring one
  /// taken by a different scanner instance is a programmer error (§7:
  /// "panics are reserved for... restoring a scanner breakpoint that was not
  /// created by that scanner"), so it panics rather than silently corrupting
  /// position tracking.
  pub fn restore(&mut self, bp: Breakpoint) {
    assert!(bp.offset <= self.source.len(), "breakpoint does not belong to this scanner");
    self.current = bp.offset;
    self.peeked = bp.peeked;
  }

  /// Advances past any run of whitespace and returns how many bytes were
  /// skipped.
  pub fn skip_whitespace(&mut self) -> usize {
    let start = self.current;
    while let Some(c) = self.peek_char() {
      if is_whitespace(c) {
        self.advance_char();
      } else {
        break;
      }
    }
    self.current - start
  }

  /// Returns the next token without permanently consuming it: the scanner
  /// remembers it so the following `scan()` returns the same token.
  pub fn peek(&mut self, engine: &mut DiagnosticEngine) -> Token {
    if self.peeked.is_none() {
      let tok = self.scan_uncached(engine);
      self.peeked = Some(tok);
    }
    self.peeked.clone().unwrap()
  }

  /// Produces the next token, consuming a previously peeked one if present.
  pub fn scan(&mut self, engine: &mut DiagnosticEngine) -> Token {
    if let Some(tok) = self.peeked.take() {
      return tok;
    }
    self.scan_uncached(engine)
  }

  fn emit(&mut self, engine: &mut DiagnosticEngine, code: DiagnosticCode, message: impl Into<String>, at: u32) {
    self.error_count += 1;
    engine.emit(Diagnostic::new(code, message).with_label(Label::primary(Span::point(at), None)));
  }
}

impl Default for Scanner {
  fn default() -> Self {
    Self::new()
  }
}

fn is_whitespace(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\r' | '\n')
}
