use aip_diagnostic::{diagnostic_code::DiagnosticCode, DiagnosticEngine};

use crate::{
  is_whitespace,
  token::{types::TokenType, Token},
  Scanner,
};

impl Scanner {
  /// Core token recognizer (§4.1). Called by `scan`/`peek` once the one-token
  /// cache has been consulted.
  pub(crate) fn scan_uncached(&mut self, engine: &mut DiagnosticEngine) -> Token {
    self.skip_whitespace();
    let start = self.current;

    let Some(c) = self.peek_char() else {
      return Token::eof(start as u32);
    };

    match c {
      '(' => self.single(TokenType::LeftParen, start),
      ')' => self.single(TokenType::RightParen, start),
      ',' => self.single(TokenType::Comma, start),
      '.' => self.single(TokenType::Dot, start),
      '*' => self.single(TokenType::Star, start),
      '-' => self.single(TokenType::Minus, start),
      '[' if self.dialect.use_arrays => self.single(TokenType::LeftBracket, start),
      ']' if self.dialect.use_arrays => self.single(TokenType::RightBracket, start),
      '{' if self.dialect.use_structs => self.single(TokenType::LeftBrace, start),
      '}' if self.dialect.use_structs => self.single(TokenType::RightBrace, start),
      '<' => {
        self.advance_char();
        if self.peek_char() == Some('=') {
          self.advance_char();
          Token::new(TokenType::Le, "<=", start as u32)
        } else {
          Token::new(TokenType::Lt, "<", start as u32)
        }
      },
      '>' => {
        self.advance_char();
        if self.peek_char() == Some('=') {
          self.advance_char();
          Token::new(TokenType::Ge, ">=", start as u32)
        } else {
          Token::new(TokenType::Gt, ">", start as u32)
        }
      },
      '!' => {
        // A lone `!` without `=` is part of text (§4.1), so only the `!=`
        // two-character form is tokenized here.
        if self.peek_next_char() == Some('=') {
          self.advance_char();
          self.advance_char();
          Token::new(TokenType::Ne, "!=", start as u32)
        } else {
          self.scan_text(start)
        }
      },
      '=' => self.single(TokenType::Eq, start),
      ':' => self.single(TokenType::Has, start),
      '\'' | '"' => self.scan_string(engine, start, c),
      _ => self.scan_text(start),
    }
  }

  fn single(&mut self, token_type: TokenType, start: usize) -> Token {
    let lexeme = self.peek_char().map(|c| c.to_string()).unwrap_or_default();
    self.advance_char();
    Token::new(token_type, lexeme, start as u32)
  }

  /// Scans a maximal text run, handling the timestamp-vs-text ambiguity
  /// around embedded colons (§4.1 "Timestamp disambiguation").
  fn scan_text(&mut self, start: usize) -> Token {
    let mut colon_breaks = Vec::new();

    loop {
      let Some(c) = self.peek_char() else { break };

      if c == '!' {
        if self.peek_next_char() == Some('=') {
          break;
        }
        self.advance_char();
        continue;
      }

      if c == ':' {
        if colon_breaks.len() < 2 {
          colon_breaks.push(self.breakpoint());
        }
        self.advance_char();
        continue;
      }

      if self.is_text_terminator(c) {
        break;
      }
      self.advance_char();
    }

    let lexeme = self.source[start..self.current].to_string();

    if !colon_breaks.is_empty() {
      if crate::rfc3339::is_rfc3339(&lexeme) {
        return Token::new(TokenType::Timestamp, lexeme, start as u32);
      }
      let first_colon = colon_breaks.remove(0);
      self.restore(first_colon);
      let lexeme = self.source[start..self.current].to_string();
      let token_type = self.classify_text(&lexeme);
      return Token::new(token_type, lexeme, start as u32);
    }

    let token_type = self.classify_text(&lexeme);
    Token::new(token_type, lexeme, start as u32)
  }

  fn classify_text(&self, lexeme: &str) -> TokenType {
    match lexeme {
      "AND" => TokenType::And,
      "OR" => TokenType::Or,
      "NOT" => TokenType::Not,
      "ASC" => TokenType::Asc,
      "DESC" => TokenType::Desc,
      "IN" if self.dialect.use_in_comparator => TokenType::In,
      _ => TokenType::Text,
    }
  }

  fn is_text_terminator(&self, c: char) -> bool {
    if is_whitespace(c) {
      return true;
    }
    match c {
      '.' | '(' | ')' | ',' | '*' | '-' | '<' | '>' | '=' => true,
      '[' | ']' => self.dialect.use_arrays,
      '{' | '}' => self.dialect.use_structs,
      _ => false,
    }
  }

  /// Scans a quoted string; an unterminated string still yields whatever was
  /// consumed, with an error reported to `engine` (§4.1, §7).
  fn scan_string(&mut self, engine: &mut DiagnosticEngine, start: usize, quote: char) -> Token {
    self.advance_char(); // opening quote
    let content_start = self.current;

    loop {
      match self.peek_char() {
        None => {
          self.emit(engine, DiagnosticCode::UnterminatedString, "unterminated string literal", start as u32);
          break;
        },
        Some(c) if c == quote => break,
        Some(_) => {
          self.advance_char();
        },
      }
    }

    let content = self.source[content_start..self.current].to_string();
    if self.peek_char() == Some(quote) {
      self.advance_char();
    }
    Token::new(TokenType::StringLiteral, content, start as u32)
  }

  pub(crate) fn peek_char(&self) -> Option<char> {
    self.source[self.current..].chars().next()
  }

  fn peek_next_char(&self) -> Option<char> {
    let mut chars = self.source[self.current..].chars();
    chars.next()?;
    chars.next()
  }

  pub(crate) fn advance_char(&mut self) -> Option<char> {
    let c = self.peek_char()?;
    self.current += c.len_utf8();
    Some(c)
  }
}
