//! Favorites list
//!
//! A small list of user-selected books, keyed by the same stable identifier as
//! search results and written back to a [`KeyValueStore`] after every change.
//! Storage is best effort: read failures yield an empty list and write failures
//! are logged and ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::book::Book;
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Store key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "bookfinder-favorites";

/// Reduced projection of a [`Book`] kept in the favorites list
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub cover_id: Option<i64>,
    #[serde(default)]
    pub isbns: Vec<String>,
}

impl From<&Book> for Favorite {
    fn from(book: &Book) -> Self {
        Favorite {
            id: book.id.clone(),
            title: book.title.clone(),
            authors: book.authors.clone(),
            year: book.year,
            cover_id: book.cover_id,
            isbns: book.isbns.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

pub struct Favorites<S: KeyValueStore> {
    store: S,
    items: Vec<Favorite>,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Load the persisted list, falling back to an empty one.
    pub fn load(store: S) -> Self {
        let items = match read_favorites(&store) {
            Ok(items) => items,
            Err(err) => {
                log::warn!("Ignoring stored favorites: {err}");
                Vec::new()
            }
        };

        Favorites { store, items }
    }

    /// Add the book if absent, remove it otherwise.
    pub fn toggle(&mut self, book: &Book) -> Toggled {
        let toggled = if let Some(pos) = self.position(&book.id) {
            self.items.remove(pos);
            Toggled::Removed
        } else {
            self.items.push(Favorite::from(book));
            Toggled::Added
        };

        self.persist();
        toggled
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.items.remove(pos);
                self.persist();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Favorite] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|f| f.id == id)
    }

    fn persist(&self) {
        if let Err(err) = write_favorites(&self.store, &self.items) {
            log::warn!("Failed to persist favorites: {err}");
        }
    }
}

fn read_favorites<S: KeyValueStore>(store: &S) -> Result<Vec<Favorite>, StorageError> {
    let items: Vec<Favorite> = match store.get(FAVORITES_KEY)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => return Ok(Vec::new()),
    };

    // First copy of a duplicated id wins.
    let mut seen = HashSet::new();
    Ok(items
        .into_iter()
        .filter(|favorite| seen.insert(favorite.id.clone()))
        .collect())
}

fn write_favorites<S: KeyValueStore>(store: &S, items: &[Favorite]) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)?;
    store.set(FAVORITES_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("read failed")))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("write failed")))
        }
    }

    fn book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            title: Some(format!("Title {id}")),
            authors: vec!["Author".to_string()],
            year: Some(2001),
            cover_id: Some(7),
            languages: vec!["eng".to_string()],
            subjects: vec!["Fiction".to_string()],
            isbns: vec!["9780000000001".to_string()],
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = Favorites::load(MemoryStore::new());

        assert_eq!(favorites.toggle(&book("/works/OL1W")), Toggled::Added);
        assert!(favorites.contains("/works/OL1W"));
        assert_eq!(favorites.len(), 1);

        assert_eq!(favorites.toggle(&book("/works/OL1W")), Toggled::Removed);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_double_toggle_restores_list() {
        let mut favorites = Favorites::load(MemoryStore::new());
        favorites.toggle(&book("/works/OL1W"));
        favorites.toggle(&book("/works/OL2W"));
        let before = favorites.items().to_vec();

        favorites.toggle(&book("/works/OL3W"));
        favorites.toggle(&book("/works/OL3W"));

        assert_eq!(favorites.items(), before.as_slice());
    }

    #[test]
    fn test_projection() {
        let favorite = Favorite::from(&book("/works/OL1W"));
        assert_eq!(favorite.id, "/works/OL1W");
        assert_eq!(favorite.title.as_deref(), Some("Title /works/OL1W"));
        assert_eq!(favorite.cover_id, Some(7));
        assert_eq!(favorite.isbns, vec!["9780000000001"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut favorites = Favorites::load(MemoryStore::new());
        favorites.toggle(&book("/works/OL1W"));

        assert!(!favorites.remove("/works/OL9W"));
        assert!(favorites.remove("/works/OL1W"));
        assert!(!favorites.remove("/works/OL1W"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut favorites = Favorites::load(MemoryStore::new());
        favorites.toggle(&book("/works/OL1W"));
        favorites.toggle(&book("/works/OL2W"));

        let raw = favorites.store().get(FAVORITES_KEY).unwrap().unwrap();
        let stored: Vec<Favorite> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, favorites.items());

        favorites.remove("/works/OL1W");
        let raw = favorites.store().get(FAVORITES_KEY).unwrap().unwrap();
        let stored: Vec<Favorite> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "/works/OL2W");
    }

    #[test]
    fn test_reload_from_file_store() {
        let temp_dir = TempDir::new().unwrap();

        let mut favorites = Favorites::load(FileStore::new(temp_dir.path()));
        favorites.toggle(&book("/works/OL1W"));
        favorites.toggle(&book("/works/OL2W"));
        let saved = favorites.items().to_vec();

        let reloaded = Favorites::load(FileStore::new(temp_dir.path()));
        assert_eq!(reloaded.items(), saved.as_slice());
    }

    #[test]
    fn test_corrupt_value_falls_back_to_empty() {
        let store = MemoryStore::new();
        store.set(FAVORITES_KEY, "{not json").unwrap();

        let favorites = Favorites::load(store);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_dropped_on_load() {
        let store = MemoryStore::new();
        let mut first = Favorite::from(&book("/works/OL1W"));
        first.title = Some("First".to_string());
        let mut second = Favorite::from(&book("/works/OL1W"));
        second.title = Some("Second".to_string());
        let other = Favorite::from(&book("/works/OL2W"));
        store
            .set(FAVORITES_KEY, &serde_json::to_string(&[first, other, second]).unwrap())
            .unwrap();

        let mut favorites = Favorites::load(store);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites.items()[0].title.as_deref(), Some("First"));
        assert_eq!(favorites.items()[1].id, "/works/OL2W");

        assert_eq!(favorites.toggle(&book("/works/OL1W")), Toggled::Removed);
        assert!(!favorites.contains("/works/OL1W"));
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut favorites = Favorites::load(FailingStore);
        assert!(favorites.is_empty());

        assert_eq!(favorites.toggle(&book("/works/OL1W")), Toggled::Added);
        assert!(favorites.contains("/works/OL1W"));
    }
}
