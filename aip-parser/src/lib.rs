//! Recursive-descent parser over the scanner's token stream.
//!
//! ```text
//! filter     := expression? EOF
//! expression := factor ("AND" factor)*
//! factor     := term ("OR" term)*
//! term       := ("NOT" | "-")? simple
//! simple     := restriction | composite
//! composite  := "(" expression ")"
//! restriction:= comparable (comparator arg)?
//! comparator := "<=" | "<" | ">=" | ">" | "!=" | "=" | ":" | "IN"
//! comparable := member | function
//! member     := value ("." field)*
//! function   := name ("." name)* "(" argList? ")"
//! arg        := comparable | composite | array | struct
//! value      := TEXT | STRING
//! field      := value | keyword
//! array      := "[" (arg ("," arg)*)? "]"         ; when use-arrays
//! struct     := (name ("." name)*)? "{" (structField ("," structField)*)? "}"  ; when use-structs
//! structField:= (STRING | name) ":" arg
//! ```
//!
//! Lookahead is a single token, served by the scanner's own peek buffer; the
//! parser never buffers a token stream of its own.

use aip_ast::{AstExpr, NameExpr, StructFieldExpr};
use aip_diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  diagnostic_code::DiagnosticCode,
  DiagnosticEngine,
};
use aip_scanner::{token::types::TokenType, token::Token, Dialect, Scanner};

/// A syntactic failure: the position it occurred at and a human-readable
/// message. The same information is also emitted to the [`DiagnosticEngine`]
/// passed to `parse`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
  pub position: u32,
  pub message: String,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser. Owns a [`Scanner`] rather than a token vector,
/// so rescanning never happens and the scanner's own breakpoint mechanism is
/// available for the one place this grammar needs lookahead beyond one
/// token: disambiguating a bare `name.path{...}` struct from a member path.
pub struct Parser {
  scanner: Scanner,
  dialect: Dialect,
}

impl Parser {
  pub fn new() -> Self {
    Self {
      scanner: Scanner::new(),
      dialect: Dialect::default(),
    }
  }

  /// Re-initializes the parser for a new source string under the given
  /// dialect (§4.2's `{use-arrays, use-structs, use-in-comparator}` option
  /// set).
  pub fn reset(&mut self, src: &str, dialect: Dialect) {
    self.scanner.reset(src, dialect);
    self.dialect = dialect;
  }

  /// Parses one full filter. Stops at the first unrecoverable syntax error;
  /// the diagnostic is both returned and recorded on `engine`.
  pub fn parse(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.peek(engine).position;
    if self.check(engine, TokenType::Eof) {
      return Ok(AstExpr::FilterExpr { expr: None, position });
    }
    let expr = self.parse_expression(engine)?;
    self.expect(engine, TokenType::Eof)?;
    Ok(AstExpr::FilterExpr { expr: Some(Box::new(expr)), position })
  }

  fn parse_expression(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.peek(engine).position;
    let mut factors = vec![self.parse_factor(engine)?];
    while self.check(engine, TokenType::And) {
      self.advance(engine);
      factors.push(self.parse_factor(engine)?);
    }
    Ok(AstExpr::ExpressionExpr { factors, position })
  }

  fn parse_factor(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.peek(engine).position;
    let mut terms = vec![self.parse_term(engine)?];
    while self.check(engine, TokenType::Or) {
      self.advance(engine);
      terms.push(self.parse_term(engine)?);
    }
    Ok(AstExpr::FactorExpr { terms, position })
  }

  fn parse_term(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let tok = self.peek(engine);
    let position = tok.position;
    let negated = matches!(tok.token_type, TokenType::Not | TokenType::Minus);
    if negated {
      self.advance(engine);
    }
    let expr = self.parse_simple(engine)?;
    Ok(AstExpr::TermExpr { negated, expr: Box::new(expr), position })
  }

  fn parse_simple(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    if self.check(engine, TokenType::LeftParen) {
      self.parse_composite(engine)
    } else {
      self.parse_restriction(engine)
    }
  }

  fn parse_composite(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.expect(engine, TokenType::LeftParen)?.position;
    let expr = self.parse_expression(engine)?;
    self.expect(engine, TokenType::RightParen)?;
    Ok(AstExpr::CompositeExpr { expr: Box::new(expr), position })
  }

  fn parse_restriction(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.peek(engine).position;
    let comparable = self.parse_comparable(engine)?;
    if self.check(engine, TokenType::Eof) || !self.peek(engine).token_type.is_comparator() {
      return Ok(AstExpr::RestrictionExpr {
        comparable: Box::new(comparable),
        comparator: None,
        arg: None,
        position,
      });
    }
    let comparator_tok = self.advance(engine);
    let comparator = AstExpr::ComparatorLiteral {
      token_type: comparator_tok.token_type,
      position: comparator_tok.position,
    };
    let arg = self.parse_arg(engine)?;
    Ok(AstExpr::RestrictionExpr {
      comparable: Box::new(comparable),
      comparator: Some(Box::new(comparator)),
      arg: Some(Box::new(arg)),
      position,
    })
  }

  /// `comparable := member | function`. Both share the dotted-segment
  /// prefix; which one comes out depends on whether a `(` follows and every
  /// segment so far was a plain name (function names cannot be quoted or a
  /// keyword — §4.2's `name` nonterminal, distinct from `field`).
  fn parse_comparable(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.peek(engine).position;
    let first = self.parse_value(engine)?;
    let mut all_names = is_plain_name(&first);
    let mut segments = vec![first];

    while self.check(engine, TokenType::Dot) {
      self.advance(engine);
      let field = self.parse_field(engine)?;
      all_names = all_names && is_plain_name(&field);
      segments.push(field);
    }

    if all_names && self.check(engine, TokenType::LeftParen) {
      self.advance(engine);
      let arg_list = self.parse_arg_list(engine)?;
      self.expect(engine, TokenType::RightParen)?;
      return Ok(AstExpr::FunctionCall { name: segments, arg_list, position });
    }

    let mut rest = segments.into_iter();
    let value = rest.next().expect("at least one segment was parsed");
    Ok(AstExpr::MemberExpr { value: Box::new(value), fields: rest.collect(), position })
  }

  /// `value := TEXT | STRING`. Legal as the first step of a member path.
  fn parse_value(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let tok = self.peek(engine);
    match tok.token_type {
      TokenType::StringLiteral => {
        self.advance(engine);
        Ok(AstExpr::StringLiteral { value: tok.lexeme, position: tok.position })
      },
      TokenType::Text | TokenType::Timestamp => {
        self.advance(engine);
        Ok(AstExpr::TextLiteral { value: tok.lexeme, token_type: tok.token_type, position: tok.position })
      },
      _ => Err(self.unexpected(engine, &tok, "a value")),
    }
  }

  /// `field := value | keyword`. Legal as a non-first step of a member path.
  fn parse_field(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let tok = self.peek(engine);
    if tok.token_type.is_keyword() {
      self.advance(engine);
      return Ok(AstExpr::KeywordExpr { token_type: tok.token_type, lexeme: tok.lexeme, position: tok.position });
    }
    self.parse_value(engine)
  }

  /// `arg := comparable | composite | array | struct`. The grammar's
  /// top-level `arg` production names only `comparable | composite`, but
  /// scenario 2 and 4 (`IN [...]`, map/message literals) require array and
  /// struct to be reachable here too when their dialects are active.
  fn parse_arg(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let tok = self.peek(engine);
    match tok.token_type {
      TokenType::LeftBracket if self.dialect.use_arrays => self.parse_array(engine),
      TokenType::LeftBrace if self.dialect.use_structs => self.parse_struct(engine, None),
      TokenType::LeftParen => self.parse_composite(engine),
      _ => {
        let comparable = self.parse_comparable(engine)?;
        if self.dialect.use_structs && self.check(engine, TokenType::LeftBrace) {
          let name = struct_name_prefix(comparable, &tok)?;
          return self.parse_struct(engine, Some(name));
        }
        Ok(comparable)
      },
    }
  }

  fn parse_arg_list(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<Vec<AstExpr>> {
    let mut args = Vec::new();
    if self.check(engine, TokenType::RightParen) {
      return Ok(args);
    }
    loop {
      args.push(self.parse_arg(engine)?);
      if self.check(engine, TokenType::Comma) {
        self.advance(engine);
        continue;
      }
      break;
    }
    Ok(args)
  }

  fn parse_array(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<AstExpr> {
    let position = self.expect(engine, TokenType::LeftBracket)?.position;
    let mut elements = Vec::new();
    if !self.check(engine, TokenType::RightBracket) {
      loop {
        elements.push(self.parse_arg(engine)?);
        if self.check(engine, TokenType::Comma) {
          self.advance(engine);
          continue;
        }
        break;
      }
    }
    self.expect_with(engine, TokenType::RightBracket, DiagnosticCode::MissingClosingBracket)?;
    Ok(AstExpr::ArrayExpr { elements, position })
  }

  fn parse_struct(&mut self, engine: &mut DiagnosticEngine, name: Option<Vec<AstExpr>>) -> ParseResult<AstExpr> {
    let position = name.as_ref().and_then(|segs| segs.first()).map(|n| n.position()).unwrap_or_else(|| self.peek(engine).position);
    self.expect(engine, TokenType::LeftBrace)?;
    let mut elements = Vec::new();
    if !self.check(engine, TokenType::RightBrace) {
      loop {
        elements.push(self.parse_struct_field(engine)?);
        if self.check(engine, TokenType::Comma) {
          self.advance(engine);
          continue;
        }
        break;
      }
    }
    self.expect_with(engine, TokenType::RightBrace, DiagnosticCode::MissingClosingBrace)?;
    Ok(AstExpr::StructExpr { name, elements, position })
  }

  fn parse_struct_field(&mut self, engine: &mut DiagnosticEngine) -> ParseResult<StructFieldExpr> {
    let tok = self.peek(engine);
    let position = tok.position;
    let name = match tok.token_type {
      TokenType::StringLiteral => {
        self.advance(engine);
        NameExpr::StringLiteral { value: tok.lexeme, position }
      },
      TokenType::Text => {
        self.advance(engine);
        NameExpr::Text { value: tok.lexeme, position }
      },
      _ => return Err(self.unexpected_with(engine, &tok, "a struct field name", DiagnosticCode::ExpectedFieldName)),
    };
    self.expect_with(engine, TokenType::Has, DiagnosticCode::ExpectedColon)?;
    let value = self.parse_arg(engine)?;
    Ok(StructFieldExpr { name, value: Box::new(value), position })
  }

  fn peek(&mut self, engine: &mut DiagnosticEngine) -> Token {
    self.scanner.peek(engine)
  }

  fn advance(&mut self, engine: &mut DiagnosticEngine) -> Token {
    self.scanner.scan(engine)
  }

  fn check(&mut self, engine: &mut DiagnosticEngine, token_type: TokenType) -> bool {
    self.peek(engine).token_type == token_type
  }

  fn expect(&mut self, engine: &mut DiagnosticEngine, token_type: TokenType) -> ParseResult<Token> {
    self.expect_with(engine, token_type, DiagnosticCode::UnexpectedToken)
  }

  fn expect_with(&mut self, engine: &mut DiagnosticEngine, token_type: TokenType, code: DiagnosticCode) -> ParseResult<Token> {
    let tok = self.peek(engine);
    if tok.token_type == token_type {
      Ok(self.advance(engine))
    } else {
      Err(self.unexpected_with(engine, &tok, &token_type.to_string(), code))
    }
  }

  fn unexpected(&mut self, engine: &mut DiagnosticEngine, tok: &Token, expected: &str) -> ParseError {
    self.unexpected_with(engine, tok, expected, DiagnosticCode::UnexpectedToken)
  }

  fn unexpected_with(&mut self, engine: &mut DiagnosticEngine, tok: &Token, expected: &str, code: DiagnosticCode) -> ParseError {
    let message = if tok.token_type == TokenType::Eof {
      format!("expected {expected}, found end of input")
    } else {
      format!("expected {expected}, found `{}`", tok.lexeme)
    };
    engine.emit(Diagnostic::new(code, message.clone()).with_label(Label::primary(Span::point(tok.position), None)));
    ParseError { position: tok.position, message }
  }
}

impl Default for Parser {
  fn default() -> Self {
    Self::new()
  }
}

fn is_plain_name(expr: &AstExpr) -> bool {
  matches!(expr, AstExpr::TextLiteral { token_type: TokenType::Text, .. })
}

/// Converts an already-parsed member path into the name-segment list a
/// struct prefix needs, rejecting shapes `name.path{...}` cannot start with
/// (a function call, or any non-plain-name segment).
fn struct_name_prefix(comparable: AstExpr, at: &Token) -> ParseResult<Vec<AstExpr>> {
  match comparable {
    AstExpr::MemberExpr { value, fields, .. } if is_plain_name(&value) && fields.iter().all(is_plain_name) => {
      let mut segments = vec![*value];
      segments.extend(fields);
      Ok(segments)
    },
    _ => Err(ParseError {
      position: at.position,
      message: "struct name prefix must be a dotted plain name".to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use aip_diagnostic::DiagnosticEngine;

  use super::*;

  fn parse(src: &str) -> ParseResult<AstExpr> {
    let mut parser = Parser::new();
    parser.reset(src, Dialect::all());
    let mut engine = DiagnosticEngine::new();
    parser.parse(&mut engine)
  }

  #[test]
  fn parses_a_simple_string_comparison() {
    let ast = parse("name = \"test\"").unwrap();
    assert!(matches!(ast, AstExpr::FilterExpr { expr: Some(_), .. }));
    assert_eq!(ast.render(true), "name = \"test\"");
  }

  #[test]
  fn parses_an_in_array_restriction() {
    let ast = parse("name IN [\"test\", \"test2\"]").unwrap();
    assert_eq!(ast.render(true), "name IN [\"test\", \"test2\"]");
  }

  #[test]
  fn parses_a_composite_disjunction_of_conjunctions() {
    let ast = parse("(a = 1 AND b = 2) OR c = 3").unwrap();
    assert_eq!(ast.render(true), "(a = 1 AND b = 2) OR c = 3");
  }

  #[test]
  fn parses_a_function_call_comparable() {
    let ast = parse("math.max(a, b) > 0").unwrap();
    assert_eq!(ast.render(true), "math.max(a, b) > 0");
  }

  #[test]
  fn parses_a_negated_restriction() {
    let ast = parse("NOT a:1").unwrap();
    assert_eq!(ast.render(true), "NOT a:1");
  }

  #[test]
  fn parses_a_map_key_has_restriction() {
    let ast = parse("map_str_duration.\"key\":1s").unwrap();
    assert_eq!(ast.render(true), "map_str_duration.\"key\":1s");
  }

  #[test]
  fn an_empty_filter_is_legal() {
    let ast = parse("").unwrap();
    assert!(matches!(ast, AstExpr::FilterExpr { expr: None, .. }));
  }

  #[test]
  fn an_unclosed_composite_is_a_parse_error() {
    let err = parse("(a = 1").unwrap_err();
    assert!(err.message.contains("end of input") || err.message.contains(")"));
  }

  #[test]
  fn parses_a_disjunction_of_enum_and_selector_comparisons() {
    let ast = parse("(enum = \"ONE\" AND i64 = 1) OR (enum = \"TWO\" AND i64 = sub.i32) OR rp_enum IN [\"ONE\",\"TWO\"]").unwrap();
    assert_eq!(
      ast.render(true),
      "(enum = \"ONE\" AND i64 = 1) OR (enum = \"TWO\" AND i64 = sub.i32) OR rp_enum IN [\"ONE\", \"TWO\"]"
    );
  }
}
