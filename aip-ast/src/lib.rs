//! Typed AST nodes for a parsed filter source string (§3 "AST"). Nodes carry
//! only position and rendering behavior; schema binding and value coercion
//! happen downstream once a descriptor is available.

use aip_scanner::token::types::TokenType;

/// The name half of a struct field: either a bare/keyword name or a quoted
/// string (quoted names are what make a [`StructExpr`] a map literal).
#[derive(Debug, Clone, PartialEq)]
pub enum NameExpr {
  Text { value: String, position: u32 },
  StringLiteral { value: String, position: u32 },
}

impl NameExpr {
  pub fn position(&self) -> u32 {
    match self {
      Self::Text { position, .. } => *position,
      Self::StringLiteral { position, .. } => *position,
    }
  }

  pub fn is_quoted(&self) -> bool {
    matches!(self, Self::StringLiteral { .. })
  }

  pub fn value(&self) -> &str {
    match self {
      Self::Text { value, .. } => value,
      Self::StringLiteral { value, .. } => value,
    }
  }
}

/// One `name: value` pair inside a [`AstExpr::StructExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct StructFieldExpr {
  pub name: NameExpr,
  pub value: Box<AstExpr>,
  pub position: u32,
}

/// Every node the parser can produce (§3 "AST"). The category predicates
/// below (`is_value`, `is_comparable`, ...) are what the interpreter uses to
/// branch instead of matching every variant by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum AstExpr {
  /// A quoted literal, e.g. `"foo"`.
  StringLiteral { value: String, position: u32 },
  /// A bare word, number, or timestamp candidate; `token_type` tells callers
  /// which lexical class the scanner settled on.
  TextLiteral { value: String, token_type: TokenType, position: u32 },
  /// A reserved word used as a value (e.g. a bare field named `true`).
  /// `lexeme` is the original source text (`"desc"`, not `DESC`'s
  /// `Display`), which is what a schema lookup needs when a keyword doubles
  /// as a field name.
  KeywordExpr { token_type: TokenType, lexeme: String, position: u32 },
  /// A dotted path: `value.field.field...`.
  MemberExpr { value: Box<AstExpr>, fields: Vec<AstExpr>, position: u32 },
  /// A dotted function name with a positional argument list.
  FunctionCall { name: Vec<AstExpr>, arg_list: Vec<AstExpr>, position: u32 },
  /// `name.path{a: 1, "b": 2}` or bare `{...}`; a map when any element name
  /// is quoted.
  StructExpr { name: Option<Vec<AstExpr>>, elements: Vec<StructFieldExpr>, position: u32 },
  /// `[a, b, c]`.
  ArrayExpr { elements: Vec<AstExpr>, position: u32 },
  /// `comparable (comparator arg)?`; global (comparator/arg absent) when
  /// both are `None`.
  RestrictionExpr {
    comparable: Box<AstExpr>,
    comparator: Option<Box<AstExpr>>,
    arg: Option<Box<AstExpr>>,
    position: u32,
  },
  /// One of the comparator token kinds, carried as its own node so a
  /// restriction can report the comparator's own position.
  ComparatorLiteral { token_type: TokenType, position: u32 },
  /// `term (OR term)*`.
  FactorExpr { terms: Vec<AstExpr>, position: u32 },
  /// `(NOT | -)? simple`.
  TermExpr { negated: bool, expr: Box<AstExpr>, position: u32 },
  /// `(expression)`, kept distinct from its inner expression so grouping is
  /// preserved through to the expression tree.
  CompositeExpr { expr: Box<AstExpr>, position: u32 },
  /// `factor (AND factor)*`.
  ExpressionExpr { factors: Vec<AstExpr>, position: u32 },
  /// The parse root: `expression? EOF`.
  FilterExpr { expr: Option<Box<AstExpr>>, position: u32 },
}

impl AstExpr {
  pub fn position(&self) -> u32 {
    match self {
      Self::StringLiteral { position, .. }
      | Self::TextLiteral { position, .. }
      | Self::KeywordExpr { position, .. }
      | Self::MemberExpr { position, .. }
      | Self::FunctionCall { position, .. }
      | Self::StructExpr { position, .. }
      | Self::ArrayExpr { position, .. }
      | Self::RestrictionExpr { position, .. }
      | Self::ComparatorLiteral { position, .. }
      | Self::FactorExpr { position, .. }
      | Self::TermExpr { position, .. }
      | Self::CompositeExpr { position, .. }
      | Self::ExpressionExpr { position, .. }
      | Self::FilterExpr { position, .. } => *position,
    }
  }

  /// Renders the node back to filter source syntax. `quoted` controls
  /// whether string/text literals are wrapped in quotes; the interpreter
  /// needs the unquoted form when re-deriving a lexeme for a value parser.
  pub fn render(&self, quoted: bool) -> String {
    match self {
      Self::StringLiteral { value, .. } => {
        if quoted {
          format!("\"{value}\"")
        } else {
          value.clone()
        }
      },
      Self::TextLiteral { value, .. } => value.clone(),
      Self::KeywordExpr { lexeme, .. } => lexeme.clone(),
      Self::MemberExpr { value, fields, .. } => {
        let mut out = value.render(quoted);
        for field in fields {
          out.push('.');
          out.push_str(&field.render(quoted));
        }
        out
      },
      Self::FunctionCall { name, arg_list, .. } => {
        let name = name.iter().map(|n| n.render(quoted)).collect::<Vec<_>>().join(".");
        let args = arg_list.iter().map(|a| a.render(quoted)).collect::<Vec<_>>().join(", ");
        format!("{name}({args})")
      },
      Self::StructExpr { name, elements, .. } => {
        let prefix = name
          .as_ref()
          .map(|parts| parts.iter().map(|n| n.render(quoted)).collect::<Vec<_>>().join("."))
          .unwrap_or_default();
        let body = elements
          .iter()
          .map(|field| {
            let name = if field.name.is_quoted() {
              format!("\"{}\"", field.name.value())
            } else {
              field.name.value().to_string()
            };
            format!("{name}: {}", field.value.render(quoted))
          })
          .collect::<Vec<_>>()
          .join(", ");
        format!("{prefix}{{{body}}}")
      },
      Self::ArrayExpr { elements, .. } => {
        let body = elements.iter().map(|e| e.render(quoted)).collect::<Vec<_>>().join(", ");
        format!("[{body}]")
      },
      Self::RestrictionExpr { comparable, comparator, arg, .. } => match (comparator, arg) {
        (Some(cmp), Some(arg)) if matches!(cmp.as_ref(), Self::ComparatorLiteral { token_type: TokenType::Has, .. }) => {
          format!("{}{}{}", comparable.render(quoted), cmp.render(quoted), arg.render(quoted))
        },
        (Some(cmp), Some(arg)) => format!("{} {} {}", comparable.render(quoted), cmp.render(quoted), arg.render(quoted)),
        _ => comparable.render(quoted),
      },
      Self::ComparatorLiteral { token_type, .. } => token_type.to_string(),
      Self::FactorExpr { terms, .. } => terms.iter().map(|t| t.render(quoted)).collect::<Vec<_>>().join(" OR "),
      Self::TermExpr { negated, expr, .. } => {
        if *negated {
          format!("NOT {}", expr.render(quoted))
        } else {
          expr.render(quoted)
        }
      },
      Self::CompositeExpr { expr, .. } => format!("({})", expr.render(quoted)),
      Self::ExpressionExpr { factors, .. } => factors.iter().map(|f| f.render(quoted)).collect::<Vec<_>>().join(" AND "),
      Self::FilterExpr { expr, .. } => expr.as_ref().map(|e| e.render(quoted)).unwrap_or_default(),
    }
  }

  /// `ValueExpr`: an atomic value usable as a [`AstExpr::MemberExpr`] root.
  pub fn is_value(&self) -> bool {
    matches!(self, Self::StringLiteral { .. } | Self::TextLiteral { .. } | Self::KeywordExpr { .. })
  }

  /// `FieldExpr`: a step after the first one in a dotted path.
  pub fn is_field(&self) -> bool {
    matches!(self, Self::TextLiteral { .. } | Self::KeywordExpr { .. })
  }

  /// `NameExpr`-shaped: usable as a function or struct name segment.
  pub fn is_name(&self) -> bool {
    matches!(self, Self::TextLiteral { .. })
  }

  /// `ArgExpr`: legal as a restriction's right-hand side or a call argument.
  pub fn is_arg(&self) -> bool {
    self.is_comparable() || matches!(self, Self::CompositeExpr { .. } | Self::ArrayExpr { .. } | Self::StructExpr { .. })
  }

  /// `ComparableExpr`: a member path or a function call.
  pub fn is_comparable(&self) -> bool {
    matches!(self, Self::MemberExpr { .. } | Self::FunctionCall { .. })
  }

  /// `SimpleExpr`: a restriction or a parenthesized composite.
  pub fn is_simple(&self) -> bool {
    matches!(self, Self::RestrictionExpr { .. } | Self::CompositeExpr { .. })
  }

  pub fn is_factor(&self) -> bool {
    matches!(self, Self::FactorExpr { .. })
  }

  pub fn is_term(&self) -> bool {
    matches!(self, Self::TermExpr { .. })
  }

  pub fn is_restriction(&self) -> bool {
    matches!(self, Self::RestrictionExpr { .. })
  }

  pub fn is_composite(&self) -> bool {
    matches!(self, Self::CompositeExpr { .. })
  }

  pub fn is_function(&self) -> bool {
    matches!(self, Self::FunctionCall { .. })
  }

  pub fn is_struct(&self) -> bool {
    matches!(self, Self::StructExpr { .. })
  }

  pub fn is_array(&self) -> bool {
    matches!(self, Self::ArrayExpr { .. })
  }

  pub fn is_member(&self) -> bool {
    matches!(self, Self::MemberExpr { .. })
  }

  pub fn is_keyword(&self) -> bool {
    matches!(self, Self::KeywordExpr { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(value: &str, position: u32) -> AstExpr {
    AstExpr::TextLiteral {
      value: value.to_string(),
      token_type: TokenType::Text,
      position,
    }
  }

  #[test]
  fn renders_a_dotted_member_path() {
    let member = AstExpr::MemberExpr {
      value: Box::new(text("sub", 0)),
      fields: vec![text("field", 4)],
      position: 0,
    };
    assert_eq!(member.render(true), "sub.field");
    assert!(member.is_comparable());
  }

  #[test]
  fn renders_a_restriction_with_comparator_and_arg() {
    let restriction = AstExpr::RestrictionExpr {
      comparable: Box::new(AstExpr::MemberExpr {
        value: Box::new(text("name", 0)),
        fields: vec![],
        position: 0,
      }),
      comparator: Some(Box::new(AstExpr::ComparatorLiteral { token_type: TokenType::Eq, position: 5 })),
      arg: Some(Box::new(AstExpr::StringLiteral { value: "test".into(), position: 7 })),
      position: 0,
    };
    assert_eq!(restriction.render(true), "name = \"test\"");
  }

  #[test]
  fn a_quoted_struct_field_name_marks_a_map_literal() {
    let field = StructFieldExpr {
      name: NameExpr::StringLiteral { value: "key".into(), position: 1 },
      value: Box::new(text("1", 6)),
      position: 1,
    };
    assert!(field.name.is_quoted());
  }
}
