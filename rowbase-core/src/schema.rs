use std::collections::HashMap;

/// Ordered column list for one table.
///
/// The descriptor's order decides the column order of every compiled
/// statement; rows supply values for a subset of these columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<String>,
}

impl TableDescriptor {
    pub fn new<N, C, S>(name: N, columns: C) -> Self
    where
        N: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Explicit, caller-held table metadata. There is no process-wide
/// registry; the handle is threaded through accessor construction.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table descriptor, replacing any previous entry with the
    /// same name.
    pub fn register(&mut self, table: TableDescriptor) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_preserves_column_order() {
        let t = TableDescriptor::new("users", ["id", "name", "updated_at"]);
        assert_eq!(t.columns(), &["id", "name", "updated_at"]);
        assert!(t.has_column("name"));
        assert!(!t.has_column("email"));
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());

        registry.register(TableDescriptor::new("users", ["id", "updated_at"]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("users").unwrap().name(), "users");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registry_replaces_on_reregister() {
        let mut registry = SchemaRegistry::new();
        registry.register(TableDescriptor::new("users", ["id"]));
        registry.register(TableDescriptor::new("users", ["id", "name"]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("users").unwrap().columns().len(), 2);
    }
}
