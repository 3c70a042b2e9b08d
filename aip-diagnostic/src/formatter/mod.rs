use colored::*;

use crate::{
  diagnostic::{Diagnostic, LabelStyle},
  diagnostic_code::Severity,
};

/// Formats diagnostics like rustc, against a single-line-agnostic source
/// string addressed by byte offset rather than line/column (the filter
/// grammar has no newlines that matter to parsing).
pub struct DiagnosticFormatter<'a> {
  diagnostic: &'a Diagnostic,
  source: &'a str,
}

impl<'a> DiagnosticFormatter<'a> {
  pub fn new(diagnostic: &'a Diagnostic, source: &'a str) -> Self {
    Self { diagnostic, source }
  }

  fn severity_text(&self) -> &'static str {
    match self.diagnostic.severity {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Note => "note",
      Severity::Help => "help",
    }
  }

  fn underline_char(&self, style: LabelStyle) -> char {
    match style {
      LabelStyle::Primary => '^',
      LabelStyle::Secondary => '-',
    }
  }

  pub fn format(&self) -> String {
    let mut output = String::new();

    let header = match self.diagnostic.severity {
      Severity::Error => format!(
        "{}[{}]: {}",
        "error".red().bold(),
        self.diagnostic.code.code().red().bold(),
        self.diagnostic.message
      ),
      Severity::Warning => format!(
        "{}[{}]: {}",
        "warning".yellow().bold(),
        self.diagnostic.code.code().yellow().bold(),
        self.diagnostic.message
      ),
      _ => format!(
        "{}[{}]: {}",
        self.severity_text().cyan().bold(),
        self.diagnostic.code.code().cyan().bold(),
        self.diagnostic.message
      ),
    };
    output.push_str(&header);
    output.push('\n');

    output.push_str(&format!("  {} {}\n", "-->".blue().bold(), self.source));

    for label in &self.diagnostic.labels {
      let start = label.span.start as usize;
      let length = (label.span.length as usize).max(1);
      let padding = " ".repeat(start.min(self.source.len()) + 4);
      let underline_char = self.underline_char(label.style);
      let underline = underline_char.to_string().repeat(length);

      let colored_underline = match (self.diagnostic.severity, label.style) {
        (Severity::Error, LabelStyle::Primary) => underline.red().bold(),
        (Severity::Warning, LabelStyle::Primary) => underline.yellow().bold(),
        (_, LabelStyle::Secondary) => underline.cyan().bold(),
        _ => underline.cyan().bold(),
      };

      output.push_str(&format!("{}{}\n", padding, colored_underline));

      if let Some(msg) = &label.message {
        output.push_str(&format!("{}{}\n", padding, msg.dimmed()));
      }
    }

    for note in &self.diagnostic.notes {
      output.push_str(&format!("  {} {}: {}\n", "=".blue().bold(), "note".cyan().bold(), note));
    }

    if let Some(help) = &self.diagnostic.help {
      output.push_str(&format!("  {} {}: {}\n", "=".blue().bold(), "help".cyan().bold(), help));
    }

    output
  }

  /// Format without colors, for logging to a file or a non-tty sink.
  pub fn format_plain(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "{}[{}]: {}\n",
      self.severity_text(),
      self.diagnostic.code.code(),
      self.diagnostic.message
    ));

    for label in &self.diagnostic.labels {
      let start = label.span.start as usize;
      let length = (label.span.length as usize).max(1);
      let padding = " ".repeat(start);
      let underline_char = self.underline_char(label.style);
      let underline = underline_char.to_string().repeat(length);

      output.push_str(&format!("  at offset {}\n", start));
      output.push_str(&format!("  {}{}\n", padding, underline));

      if let Some(msg) = &label.message {
        output.push_str(&format!("  {}{}\n", padding, msg));
      }
    }

    for note in &self.diagnostic.notes {
      output.push_str(&format!("  = note: {}\n", note));
    }

    if let Some(help) = &self.diagnostic.help {
      output.push_str(&format!("  = help: {}\n", help));
    }

    output
  }
}
