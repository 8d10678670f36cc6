use std::collections::HashMap;

use crate::model::Entity;

/// One record per entity id.
#[derive(Debug, Clone)]
pub struct EntityTable<T> {
    records: HashMap<String, T>,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityTable<T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.records.get_mut(id)
    }

    /// Insert or replace the record with the entity's id.
    pub fn upsert(&mut self, entity: T) {
        self.records.insert(entity.id().to_string(), entity);
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.records.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
