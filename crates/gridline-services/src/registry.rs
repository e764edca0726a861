use indexmap::IndexMap;
use std::sync::Arc;

use crate::configured::{ConfiguredTable, TableDefinition};
use crate::descriptor::DataTable;
use crate::error::{ServiceError, ServiceResult};

/// Tables addressable by name, in registration order
#[derive(Default, Clone)]
pub struct TableRegistry {
    tables: IndexMap<String, Arc<dyn DataTable>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TableDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(Arc::new(ConfiguredTable::new(definition)));
        }
        registry
    }

    /// Register `table`, replacing any table with the same name
    pub fn register(&mut self, table: Arc<dyn DataTable>) {
        let name = table.name().to_string();
        if self.tables.insert(name.clone(), table).is_some() {
            tracing::warn!(table = %name, "table registered twice, keeping the last definition");
        }
    }

    pub fn get(&self, name: &str) -> ServiceResult<Arc<dyn DataTable>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::TableNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
