//! Field-info cache (§4.5 point 5): a single reader/writer lock guarding a
//! `(message, field) -> info` map so repeated binds of the same selector
//! don't re-derive complexity/nullability/forbidden-ness from the descriptor
//! every time. Keyed by name rather than by descriptor identity, since a
//! `&dyn FieldDescriptor` has no stable address guarantee across calls.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use aip_schema::FieldDescriptor;

#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
  pub complexity: i64,
  pub forbidden: bool,
  pub nullable: bool,
}

#[derive(Debug, Default)]
pub struct FieldInfoCache {
  entries: RwLock<FxHashMap<(String, String), FieldInfo>>,
}

impl FieldInfoCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get_or_insert(&self, message: &str, field: &dyn FieldDescriptor) -> FieldInfo {
    let key = (message.to_string(), field.name().to_string());
    if let Some(info) = self.entries.read().get(&key) {
      return *info;
    }
    let info = FieldInfo {
      complexity: field.complexity(),
      forbidden: field.forbids_filtering(),
      nullable: field.is_nullable(),
    };
    self.entries.write().insert(key, info);
    info
  }
}

#[cfg(test)]
mod tests {
  use aip_schema::{testing::TestField, Kind};

  use super::*;

  #[test]
  fn caches_a_fields_info_by_declaring_message_and_name() {
    let cache = FieldInfoCache::new();
    let field = TestField::scalar("name", Kind::String).with_complexity(3);
    let first = cache.get_or_insert("pkg.Msg", &field);
    let second = cache.get_or_insert("pkg.Msg", &field);
    assert_eq!(first.complexity, 3);
    assert_eq!(second.complexity, 3);
  }
}
