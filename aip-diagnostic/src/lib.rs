pub mod diagnostic;
pub mod diagnostic_code;
pub mod formatter;

use colored::*;

use crate::{diagnostic::Diagnostic, diagnostic_code::Severity, formatter::DiagnosticFormatter};

/// `(position, message)` callback threaded through a parse (§7, §9 "global
/// error handler is a config knob, not global mutable state"). Boxed rather
/// than generic so `Scanner`/`Parser`/`Interpreter` can all hold one without
/// becoming generic over a handler type.
pub type ErrorHandler<'a> = Box<dyn FnMut(u32, &str) + 'a>;

/// Collector for every diagnostic raised while scanning, parsing or
/// interpreting one filter source string.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
  diagnostics: Vec<Diagnostic>,
  error_count: usize,
  warning_count: usize,
}

impl DiagnosticEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn emit(&mut self, diagnostic: Diagnostic) {
    match diagnostic.severity {
      Severity::Error => self.error_count += 1,
      Severity::Warning => self.warning_count += 1,
      _ => {},
    }
    self.diagnostics.push(diagnostic);
  }

  pub fn has_errors(&self) -> bool {
    self.error_count > 0
  }

  pub fn error_count(&self) -> usize {
    self.error_count
  }

  pub fn warning_count(&self) -> usize {
    self.warning_count
  }

  /// Print all diagnostics with colors to stdout.
  pub fn print_all(&self, source: &str) {
    for diagnostic in &self.diagnostics {
      let formatter = DiagnosticFormatter::new(diagnostic, source);
      print!("{}", formatter.format());
    }
    self.print_summary();
  }

  /// Render all diagnostics as plain text, e.g. for a log sink.
  pub fn format_all_plain(&self, source: &str) -> String {
    let mut output = String::new();
    for diagnostic in &self.diagnostics {
      let formatter = DiagnosticFormatter::new(diagnostic, source);
      output.push_str(&formatter.format_plain());
      output.push('\n');
    }
    output.push_str(&self.format_summary_plain());
    output
  }

  fn print_summary(&self) {
    if self.error_count == 0 && self.warning_count == 0 {
      return;
    }
    println!();
    if self.has_errors() {
      println!(
        "{}: could not parse filter due to {} previous {}{}",
        "error".red().bold(),
        self.error_count.to_string().red().bold(),
        plural(self.error_count, "error", "errors"),
        self.warning_suffix()
      );
    } else {
      println!(
        "{}: {} {} emitted",
        "warning".yellow().bold(),
        self.warning_count.to_string().yellow().bold(),
        plural(self.warning_count, "warning", "warnings")
      );
    }
  }

  fn warning_suffix(&self) -> String {
    if self.warning_count == 0 {
      return String::new();
    }
    format!(
      "; {} {} emitted",
      self.warning_count.to_string().yellow().bold(),
      plural(self.warning_count, "warning", "warnings")
    )
  }

  fn format_summary_plain(&self) -> String {
    if self.error_count == 0 && self.warning_count == 0 {
      return String::new();
    }
    if self.has_errors() {
      format!(
        "error: could not parse filter due to {} previous {}",
        self.error_count,
        plural(self.error_count, "error", "errors")
      )
    } else {
      format!(
        "warning: {} {} emitted",
        self.warning_count,
        plural(self.warning_count, "warning", "warnings")
      )
    }
  }

  pub fn get_diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }
}

fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
  if count == 1 {
    singular
  } else {
    plural
  }
}
