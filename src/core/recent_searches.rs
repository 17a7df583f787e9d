//! Recent search queries shown under the search bar

use std::sync::Arc;

use crate::core::storage::{KeyValueStore, StorageError};

pub const RECENT_SEARCHES_KEY: &str = "lumera_recent_searches";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first list of queries, persisted as a JSON array
#[derive(Clone)]
pub struct RecentSearches {
    storage: Arc<dyn KeyValueStore>,
}

impl RecentSearches {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Stored queries; unreadable data is dropped
    pub fn list(&self) -> Vec<String> {
        let Some(raw) = self.storage.get_item(RECENT_SEARCHES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(_) => {
                tracing::debug!("discarding malformed recent searches");
                let _ = self.storage.remove_item(RECENT_SEARCHES_KEY);
                Vec::new()
            }
        }
    }

    /// Put `query` first, dropping case-insensitive duplicates
    pub fn add(&self, query: &str) -> Result<Vec<String>, StorageError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.list());
        }

        let mut list = self.list();
        let needle = query.to_lowercase();
        list.retain(|q| q.to_lowercase() != needle);
        list.insert(0, query.to_string());
        list.truncate(MAX_RECENT_SEARCHES);

        self.save(&list)?;
        Ok(list)
    }

    pub fn remove(&self, query: &str) -> Result<Vec<String>, StorageError> {
        let mut list = self.list();
        list.retain(|q| q != query);
        self.save(&list)?;
        Ok(list)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(RECENT_SEARCHES_KEY)
    }

    fn save(&self, list: &[String]) -> Result<(), StorageError> {
        let json = serde_json::to_string(list)
            .map_err(|_| StorageError::WriteFailed(RECENT_SEARCHES_KEY.to_string()))?;
        self.storage.set_item(RECENT_SEARCHES_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn recent() -> (RecentSearches, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (RecentSearches::new(storage.clone()), storage)
    }

    #[test]
    fn test_add_keeps_newest_first_and_caps() {
        let (recent, _) = recent();

        for query in ["lashes", "brows", "nails", "makeup", "skincare", "hair"] {
            recent.add(query).unwrap();
        }

        assert_eq!(
            recent.list(),
            vec!["hair", "skincare", "makeup", "nails", "brows"]
        );
    }

    #[test]
    fn test_add_dedupes_case_insensitively() {
        let (recent, _) = recent();
        recent.add("Lashes").unwrap();
        recent.add("brows").unwrap();

        let list = recent.add("  LASHES ").unwrap();

        assert_eq!(list, vec!["LASHES", "brows"]);
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let (recent, storage) = recent();

        assert!(recent.add("   ").unwrap().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_malformed_value_is_removed() {
        let (recent, storage) = recent();
        storage.set_item(RECENT_SEARCHES_KEY, "not json").unwrap();

        assert!(recent.list().is_empty());
        assert_eq!(storage.get_item(RECENT_SEARCHES_KEY), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let (recent, storage) = recent();
        recent.add("lashes").unwrap();
        recent.add("brows").unwrap();

        assert_eq!(recent.remove("lashes").unwrap(), vec!["brows"]);

        recent.clear().unwrap();
        assert!(recent.list().is_empty());
        assert!(storage.is_empty());
    }
}
