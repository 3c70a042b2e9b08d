use aip_diagnostic::DiagnosticEngine;
use aip_scanner::{token::types::TokenType, Dialect, Scanner};

fn tokenize(src: &str) -> Vec<TokenType> {
  let mut scanner = Scanner::new();
  scanner.reset(src, Dialect::all());
  let mut engine = DiagnosticEngine::new();
  let mut types = Vec::new();
  loop {
    let tok = scanner.scan(&mut engine);
    let done = tok.token_type == TokenType::Eof;
    types.push(tok.token_type);
    if done {
      break;
    }
  }
  types
}

#[test]
fn scans_a_simple_comparator_restriction() {
  let types = tokenize("name = \"foo\"");
  assert_eq!(types, vec![TokenType::Text, TokenType::Eq, TokenType::StringLiteral, TokenType::Eof]);
}

#[test]
fn scans_logical_connectives_and_negation() {
  let types = tokenize("a:1 AND NOT b:2 OR -c:3");
  assert_eq!(
    types,
    vec![
      TokenType::Text,
      TokenType::Has,
      TokenType::Text,
      TokenType::And,
      TokenType::Not,
      TokenType::Text,
      TokenType::Has,
      TokenType::Text,
      TokenType::Or,
      TokenType::Minus,
      TokenType::Text,
      TokenType::Has,
      TokenType::Text,
      TokenType::Eof,
    ]
  );
}

#[test]
fn disambiguates_a_timestamp_from_a_has_colon() {
  let types = tokenize("created_at > 2023-01-15T10:30:00Z");
  assert_eq!(types, vec![TokenType::Text, TokenType::Gt, TokenType::Timestamp, TokenType::Eof]);
}

#[test]
fn falls_back_to_has_when_the_colon_run_is_not_a_timestamp() {
  let types = tokenize("labels:prod");
  assert_eq!(types, vec![TokenType::Text, TokenType::Has, TokenType::Text, TokenType::Eof]);
}

#[test]
fn respects_dialect_switches_for_bracket_and_brace_punctuation() {
  let mut scanner = Scanner::new();
  scanner.reset("tags[0] = 1", Dialect { use_arrays: false, use_structs: false, use_in_comparator: false });
  let mut engine = DiagnosticEngine::new();
  let first = scanner.scan(&mut engine);
  assert_eq!(first.token_type, TokenType::Text);
  assert_eq!(first.lexeme, "tags[0]");
}

#[test]
fn an_unterminated_string_still_yields_a_token_and_reports_an_error() {
  let mut scanner = Scanner::new();
  scanner.reset("name = \"unterminated", Dialect::all());
  let mut engine = DiagnosticEngine::new();
  scanner.scan(&mut engine); // name
  scanner.scan(&mut engine); // =
  let tok = scanner.scan(&mut engine);
  assert_eq!(tok.token_type, TokenType::StringLiteral);
  assert_eq!(tok.lexeme, "unterminated");
  assert!(engine.has_errors());
}

#[test]
fn peek_does_not_consume_the_token() {
  let mut scanner = Scanner::new();
  scanner.reset("a = 1", Dialect::all());
  let mut engine = DiagnosticEngine::new();
  let peeked = scanner.peek(&mut engine);
  let scanned = scanner.scan(&mut engine);
  assert_eq!(peeked, scanned);
}
