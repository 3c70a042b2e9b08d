use crate::diagnostic_code::{DiagnosticCode, Severity};

/// A byte-offset span into the filter source string being scanned/parsed.
/// The source is always a single string (§3 "integer source position"), so
/// unlike the teacher's line/column `Span` this one only tracks an offset and
/// a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub start: u32,
  pub length: u32,
}

impl Span {
  pub fn point(start: u32) -> Self {
    Self { start, length: 1 }
  }
}

/// Label for underlining a specific part of the source.
#[derive(Debug, Clone)]
pub struct Label {
  pub span: Span,
  pub message: Option<String>,
  pub style: LabelStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
  Primary,
  Secondary,
}

impl Label {
  pub fn primary(span: Span, message: Option<String>) -> Self {
    Self {
      span,
      message,
      style: LabelStyle::Primary,
    }
  }

  pub fn secondary(span: Span, message: Option<String>) -> Self {
    Self {
      span,
      message,
      style: LabelStyle::Secondary,
    }
  }
}

/// A single diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub code: DiagnosticCode,
  pub severity: Severity,
  pub message: String,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
  pub help: Option<String>,
}

impl Diagnostic {
  pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
    Self {
      severity: code.severity(),
      code,
      message: message.into(),
      labels: Vec::new(),
      notes: Vec::new(),
      help: None,
    }
  }

  pub fn at(code: DiagnosticCode, message: impl Into<String>, position: u32) -> Self {
    Self::new(code, message).with_label(Label::primary(Span::point(position), None))
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn with_help(mut self, help: impl Into<String>) -> Self {
    self.help = Some(help.into());
    self
  }

  /// The position of the diagnostic's primary label, if any.
  pub fn position(&self) -> Option<u32> {
    self
      .labels
      .iter()
      .find(|l| l.style == LabelStyle::Primary)
      .or_else(|| self.labels.first())
      .map(|l| l.span.start)
  }
}
