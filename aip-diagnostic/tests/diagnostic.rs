use aip_diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  diagnostic_code::{DiagnosticCode, ErrorKind},
  DiagnosticEngine,
};

#[test]
fn formats_an_unterminated_string_diagnostic() {
  let source = r#"name = "unterminated"#;

  let mut engine = DiagnosticEngine::new();
  let error = Diagnostic::new(DiagnosticCode::UnterminatedString, "unterminated string")
    .with_label(Label::primary(
      Span { start: 7, length: 14 },
      Some("string is never closed".to_string()),
    ))
    .with_help("close the string with a matching quote");

  engine.emit(error);
  assert!(engine.has_errors());
  assert_eq!(engine.error_count(), 1);
  let rendered = engine.format_all_plain(source);
  assert!(rendered.contains("E0001"));
  assert!(rendered.contains("could not parse filter"));
}

#[test]
fn maps_diagnostic_codes_to_surface_error_kinds() {
  assert_eq!(ErrorKind::from(DiagnosticCode::FieldNotFound), ErrorKind::FieldNotFound);
  assert_eq!(ErrorKind::from(DiagnosticCode::AmbiguousField), ErrorKind::AmbiguousField);
  // Purely syntactic codes fall back to InvalidAst at the surface.
  assert_eq!(ErrorKind::from(DiagnosticCode::UnterminatedString), ErrorKind::InvalidAst);
}
