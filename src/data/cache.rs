use std::collections::HashMap;
use std::sync::Arc;

use super::model::PlayerTable;

/// Cleaned tables keyed by source URL or path.
///
/// Entries never expire on their own; a changed remote sheet is only seen
/// after [`TableCache::invalidate`] (the "Reload" action) or a restart.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<String, Arc<PlayerTable>>,
    hits: usize,
    misses: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, source_ref: &str) -> Option<Arc<PlayerTable>> {
        let found = self.tables.get(source_ref).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, source_ref: &str, table: PlayerTable) -> Arc<PlayerTable> {
        let table = Arc::new(table);
        self.tables.insert(source_ref.to_string(), Arc::clone(&table));
        table
    }

    /// Forget one source. Returns whether it was cached.
    pub fn invalidate(&mut self, source_ref: &str) -> bool {
        self.tables.remove(source_ref).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
