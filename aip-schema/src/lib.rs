//! The descriptor contract the interpreter binds against. The schema library
//! itself (field kinds, enum/message descriptors, option annotations) is an
//! external collaborator; this crate only states the shape the interpreter
//! needs of it, plus an in-memory test double under [`testing`].

pub mod testing;

/// A field's runtime value category (§4.6, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  Int32,
  Int64,
  Uint32,
  Uint64,
  Float,
  Double,
  Bool,
  String,
  Bytes,
  Enum,
  Message,
  Map,
  Timestamp,
  Duration,
  /// A JSON-struct field (§4.6 "JSON-struct").
  Struct,
}

impl Kind {
  pub fn is_signed_integer(self) -> bool {
    matches!(self, Self::Int32 | Self::Int64)
  }

  pub fn is_unsigned_integer(self) -> bool {
    matches!(self, Self::Uint32 | Self::Uint64)
  }

  pub fn is_integer(self) -> bool {
    self.is_signed_integer() || self.is_unsigned_integer()
  }

  pub fn is_float(self) -> bool {
    matches!(self, Self::Float | Self::Double)
  }

  pub fn is_numeric(self) -> bool {
    self.is_integer() || self.is_float()
  }

  pub fn is_temporal(self) -> bool {
    matches!(self, Self::Timestamp | Self::Duration)
  }

  /// §4.7's `isKindComparable`: numeric families compare across width and
  /// signedness, floats compare only with other floats, everything else
  /// compares only with itself (enum/message/map identity is checked
  /// separately, by full name).
  pub fn is_comparable_with(self, other: Kind) -> bool {
    if self.is_integer() && other.is_integer() {
      return true;
    }
    if self.is_float() && other.is_float() {
      return true;
    }
    self == other
  }
}

/// A field's repetition shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
  Optional,
  Required,
  Repeated,
}

/// An enum type's declared value names (§4.6 "enum").
pub trait EnumDescriptor {
  fn full_name(&self) -> &str;
  fn value_by_name(&self, name: &str) -> Option<i32>;
  fn name_by_value(&self, value: i32) -> Option<&str>;
}

/// A map field's key/value shape (§3 "Map-key step", §4.5 point 4).
pub trait MapDescriptor {
  fn key_kind(&self) -> Kind;
  fn value_field(&self) -> &dyn FieldDescriptor;
}

/// One field of a [`MessageDescriptor`] (§3 invariants 1, 4, 5; §4.5).
pub trait FieldDescriptor {
  fn name(&self) -> &str;
  fn kind(&self) -> Kind;
  fn cardinality(&self) -> Cardinality;

  fn is_repeated(&self) -> bool {
    self.cardinality() == Cardinality::Repeated
  }

  /// Whether this field accepts an explicit `null` literal (§4.6, every
  /// parser row).
  fn is_nullable(&self) -> bool;

  /// "Forbids filtering" (§4.5 point 3): traversal through this field is
  /// rejected outright.
  fn forbids_filtering(&self) -> bool;

  /// Present when `kind() == Kind::Message`.
  fn message(&self) -> Option<&dyn MessageDescriptor> {
    None
  }

  /// Present when `kind() == Kind::Map`.
  fn map_value(&self) -> Option<&dyn MapDescriptor> {
    None
  }

  /// Present when `kind() == Kind::Enum`.
  fn enum_descriptor(&self) -> Option<&dyn EnumDescriptor> {
    None
  }

  /// Downstream planner cost (§3 invariant 6, §4.5 "field-info cache").
  fn complexity(&self) -> i64;
}

/// A message type: the field namespace the interpreter resolves selectors
/// against (§4.5 "Field binding").
pub trait MessageDescriptor {
  fn full_name(&self) -> &str;

  fn field_by_name(&self, name: &str) -> Option<&dyn FieldDescriptor>;

  /// A field reachable through one of this message's oneofs (§4.5 point 1:
  /// "or a field inside one of its oneofs").
  fn oneof_field_by_name(&self, name: &str) -> Option<&dyn FieldDescriptor> {
    let _ = name;
    None
  }
}

/// One positional argument slot of a [`FunctionDeclaration`] (§4.5
/// "Function-call handling"). Enum/message identity and map shape are
/// recorded by full name/kind rather than by borrowed descriptor reference,
/// so a declaration can be built and stored independently of any one
/// message's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDeclaration {
  pub kind: Kind,
  pub cardinality: Cardinality,
  pub nullable: bool,
  pub allow_indirect: bool,
  pub enum_full_name: Option<String>,
  pub message_full_name: Option<String>,
  pub map_key_kind: Option<Kind>,
  pub map_value_kind: Option<Kind>,
  /// Names of "service-called" functions allowed to appear in this
  /// position when the argument is indirect.
  pub indirect_allowlist: Vec<String>,
}

/// The shape a function call produces when all its arguments are direct
/// (§4.5: "a returning declaration ... or no return").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnDeclaration {
  pub kind: Kind,
  pub cardinality: Cardinality,
  pub nullable: bool,
  pub map_key_kind: Option<Kind>,
  pub map_value_kind: Option<Kind>,
}

/// A declared callable: a dotted name, its argument shape, and (if direct)
/// what it returns. `returns: None` marks a "service-called" function whose
/// invocation is preserved opaquely for a downstream evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
  pub name: String,
  pub args: Vec<ArgDeclaration>,
  pub returns: Option<ReturnDeclaration>,
}

impl FunctionDeclaration {
  /// A function with no return declaration is "service-called" (§GLOSSARY).
  pub fn is_service_called(&self) -> bool {
    self.returns.is_none()
  }
}

/// The registry of callable functions an interpreter resolves calls against.
pub trait FunctionRegistry {
  fn lookup(&self, dotted_name: &str) -> Option<&FunctionDeclaration>;
}
