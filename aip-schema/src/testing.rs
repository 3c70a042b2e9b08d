//! An in-memory descriptor set for exercising the interpreter, composer, and
//! parser without a real schema library on hand — the contract equivalent of
//! building a `Stmt`/`Expr` tree by hand for a resolver test.

use std::collections::HashMap;

use crate::{Cardinality, EnumDescriptor, FieldDescriptor, FunctionDeclaration, FunctionRegistry, Kind, MapDescriptor, MessageDescriptor};

#[derive(Debug, Clone)]
pub struct TestField {
  pub name: String,
  pub kind: Kind,
  pub cardinality: Cardinality,
  pub nullable: bool,
  pub forbidden: bool,
  pub complexity: i64,
  pub message: Option<TestMessage>,
  pub map: Option<Box<TestMap>>,
  pub enum_descriptor: Option<TestEnum>,
}

impl TestField {
  pub fn scalar(name: impl Into<String>, kind: Kind) -> Self {
    Self {
      name: name.into(),
      kind,
      cardinality: Cardinality::Optional,
      nullable: false,
      forbidden: false,
      complexity: 1,
      message: None,
      map: None,
      enum_descriptor: None,
    }
  }

  pub fn repeated(mut self) -> Self {
    self.cardinality = Cardinality::Repeated;
    self
  }

  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  pub fn forbidden(mut self) -> Self {
    self.forbidden = true;
    self
  }

  pub fn with_complexity(mut self, complexity: i64) -> Self {
    self.complexity = complexity;
    self
  }

  pub fn with_message(mut self, message: TestMessage) -> Self {
    self.kind = Kind::Message;
    self.message = Some(message);
    self
  }

  pub fn with_map(mut self, map: TestMap) -> Self {
    self.kind = Kind::Map;
    self.map = Some(Box::new(map));
    self
  }

  pub fn with_enum(mut self, descriptor: TestEnum) -> Self {
    self.kind = Kind::Enum;
    self.enum_descriptor = Some(descriptor);
    self
  }
}

impl FieldDescriptor for TestField {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> Kind {
    self.kind
  }

  fn cardinality(&self) -> Cardinality {
    self.cardinality
  }

  fn is_nullable(&self) -> bool {
    self.nullable
  }

  fn forbids_filtering(&self) -> bool {
    self.forbidden
  }

  fn complexity(&self) -> i64 {
    self.complexity
  }

  fn message(&self) -> Option<&dyn MessageDescriptor> {
    self.message.as_ref().map(|m| m as &dyn MessageDescriptor)
  }

  fn map_value(&self) -> Option<&dyn MapDescriptor> {
    self.map.as_deref().map(|m| m as &dyn MapDescriptor)
  }

  fn enum_descriptor(&self) -> Option<&dyn EnumDescriptor> {
    self.enum_descriptor.as_ref().map(|e| e as &dyn EnumDescriptor)
  }
}

#[derive(Debug, Clone)]
pub struct TestMap {
  pub key_kind: Kind,
  pub value: TestField,
}

impl MapDescriptor for TestMap {
  fn key_kind(&self) -> Kind {
    self.key_kind
  }

  fn value_field(&self) -> &dyn FieldDescriptor {
    &self.value
  }
}

#[derive(Debug, Clone, Default)]
pub struct TestEnum {
  pub full_name: String,
  pub values: HashMap<String, i32>,
}

impl TestEnum {
  pub fn new(full_name: impl Into<String>, values: impl IntoIterator<Item = (&'static str, i32)>) -> Self {
    Self {
      full_name: full_name.into(),
      values: values.into_iter().map(|(name, value)| (name.to_string(), value)).collect(),
    }
  }
}

impl EnumDescriptor for TestEnum {
  fn full_name(&self) -> &str {
    &self.full_name
  }

  fn value_by_name(&self, name: &str) -> Option<i32> {
    self.values.get(name).copied()
  }

  fn name_by_value(&self, value: i32) -> Option<&str> {
    self.values.iter().find(|(_, v)| **v == value).map(|(name, _)| name.as_str())
  }
}

#[derive(Debug, Clone, Default)]
pub struct TestMessage {
  pub full_name: String,
  pub fields: HashMap<String, TestField>,
  pub oneof_fields: HashMap<String, TestField>,
}

impl TestMessage {
  pub fn new(full_name: impl Into<String>) -> Self {
    Self {
      full_name: full_name.into(),
      fields: HashMap::new(),
      oneof_fields: HashMap::new(),
    }
  }

  pub fn with_field(mut self, field: TestField) -> Self {
    self.fields.insert(field.name.clone(), field);
    self
  }

  pub fn with_oneof_field(mut self, field: TestField) -> Self {
    self.oneof_fields.insert(field.name.clone(), field);
    self
  }
}

impl MessageDescriptor for TestMessage {
  fn full_name(&self) -> &str {
    &self.full_name
  }

  fn field_by_name(&self, name: &str) -> Option<&dyn FieldDescriptor> {
    self.fields.get(name).map(|f| f as &dyn FieldDescriptor)
  }

  fn oneof_field_by_name(&self, name: &str) -> Option<&dyn FieldDescriptor> {
    self.oneof_fields.get(name).map(|f| f as &dyn FieldDescriptor)
  }
}

#[derive(Debug, Clone, Default)]
pub struct TestFunctionRegistry {
  pub declarations: HashMap<String, FunctionDeclaration>,
}

impl TestFunctionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_function(mut self, declaration: FunctionDeclaration) -> Self {
    self.declarations.insert(declaration.name.clone(), declaration);
    self
  }
}

impl FunctionRegistry for TestFunctionRegistry {
  fn lookup(&self, dotted_name: &str) -> Option<&FunctionDeclaration> {
    self.declarations.get(dotted_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_a_message_with_a_nested_map_field() {
    let message = TestMessage::new("test.Resource").with_field(
      TestField::scalar("labels", Kind::Map).with_map(TestMap {
        key_kind: Kind::String,
        value: TestField::scalar("value", Kind::String),
      }),
    );

    let field = message.field_by_name("labels").expect("field exists");
    assert_eq!(field.kind(), Kind::Map);
    let map = field.map_value().expect("map descriptor present");
    assert_eq!(map.key_kind(), Kind::String);
    assert_eq!(map.value_field().kind(), Kind::String);
  }

  #[test]
  fn resolves_enum_values_by_name() {
    let e = TestEnum::new("test.Status", [("ACTIVE", 1), ("INACTIVE", 2)]);
    assert_eq!(e.value_by_name("ACTIVE"), Some(1));
    assert_eq!(e.name_by_value(2), Some("INACTIVE"));
  }
}
