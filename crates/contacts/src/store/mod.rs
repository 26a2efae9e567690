//! Contact store.
//!
//! The web handlers and the CLI only talk to [`ContactStore`]. Two
//! implementations exist: [`SqliteStore`] for persistent data and
//! [`MemoryStore`] for throwaway sessions and tests.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::contact::{Contact, ContactId, ContactUpdate};
use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Record store for contacts.
///
/// Searches return contacts ordered by last name (unset names first), then
/// creation time, then identifier.
#[async_trait]
pub trait ContactStore: Send + Sync + std::fmt::Debug {
    /// Contacts whose first or last name contains `query`, ignoring case.
    ///
    /// `None` or an empty query returns every contact.
    async fn search(&self, query: Option<&str>) -> Result<Vec<Contact>>;

    /// Fetch one contact, `None` if it does not exist.
    async fn get(&self, id: ContactId) -> Result<Option<Contact>>;

    /// Create an empty contact and return it with its new identifier.
    async fn create(&self) -> Result<Contact>;

    /// Merge `fields` into an existing contact and return the stored result.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the contact
    /// does not exist.
    async fn update(&self, id: ContactId, fields: ContactUpdate) -> Result<Contact>;

    /// Remove a contact.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the contact
    /// does not exist.
    async fn delete(&self, id: ContactId) -> Result<()>;

    /// Counts over the whole store.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Statistics about the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Total number of contacts.
    pub total: u64,
    /// Number of contacts marked as favorites.
    pub favorites: u64,
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the `SQLite` database cannot be opened or migrated.
pub fn open(config: &Config) -> Result<Arc<dyn ContactStore>> {
    let store: Arc<dyn ContactStore> = match config.storage.backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(config.database_path())?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!("Using {} contact store", config.storage.backend);
    Ok(store)
}

/// Normalize a search query: an empty string means "no filter".
pub(crate) fn effective_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    async fn add(store: &dyn ContactStore, first: &str, last: &str) -> Contact {
        let contact = store.create().await.unwrap();
        store
            .update(
                contact.id,
                ContactUpdate {
                    first: Some(first.to_string()),
                    last: Some(last.to_string()),
                    ..ContactUpdate::default()
                },
            )
            .await
            .unwrap()
    }

    fn ids(contacts: &[Contact]) -> Vec<ContactId> {
        contacts.iter().map(|c| c.id).collect()
    }

    async fn check_create_then_get(store: &dyn ContactStore) {
        let created = store.create().await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(created, fetched);
        assert!(fetched.first.is_none());
        assert!(fetched.last.is_none());
        assert!(fetched.twitter.is_none());
        assert!(fetched.avatar.is_none());
        assert!(fetched.notes.is_none());
        assert!(!fetched.favorite);
    }

    async fn check_search(store: &dyn ContactStore) {
        let sarah = add(store, "Sarah", "Doe").await;
        let john = add(store, "John", "Smith").await;

        assert_eq!(ids(&store.search(Some("doe")).await.unwrap()), vec![sarah.id]);
        assert_eq!(ids(&store.search(Some("JOHN")).await.unwrap()), vec![john.id]);
        assert!(store.search(Some("zz")).await.unwrap().is_empty());
        assert_eq!(store.search(None).await.unwrap().len(), 2);
        assert_eq!(store.search(Some("")).await.unwrap().len(), 2);
    }

    async fn check_search_folds_non_ascii_case(store: &dyn ContactStore) {
        let odegard = add(store, "Zoë", "Ødegård").await;
        add(store, "Sarah", "Doe").await;

        assert_eq!(ids(&store.search(Some("øde")).await.unwrap()), vec![odegard.id]);
        assert_eq!(ids(&store.search(Some("ØDEGÅRD")).await.unwrap()), vec![odegard.id]);
        assert_eq!(ids(&store.search(Some("ZOË")).await.unwrap()), vec![odegard.id]);
    }

    async fn check_search_treats_wildcards_literally(store: &dyn ContactStore) {
        add(store, "Ann", "Lee").await;
        let percent = add(store, "100%", "Pure").await;

        assert_eq!(ids(&store.search(Some("%")).await.unwrap()), vec![percent.id]);
        assert!(store.search(Some("_")).await.unwrap().is_empty());
    }

    async fn check_search_order(store: &dyn ContactStore) {
        let zed = add(store, "Amy", "Zed").await;
        let abe = add(store, "Bob", "Abe").await;
        let nameless = store.create().await.unwrap();
        let abe_again = add(store, "Cat", "Abe").await;

        assert_eq!(
            ids(&store.search(None).await.unwrap()),
            vec![nameless.id, abe.id, abe_again.id, zed.id]
        );
    }

    async fn check_favorite_update_keeps_fields(store: &dyn ContactStore) {
        let contact = add(store, "Sarah", "Doe").await;
        let updated = store
            .update(contact.id, ContactUpdate::favorite(true))
            .await
            .unwrap();

        assert!(updated.favorite);
        assert_eq!(updated.first, contact.first);
        assert_eq!(updated.last, contact.last);
        assert_eq!(updated.created_at, contact.created_at);
        assert_eq!(store.get(contact.id).await.unwrap(), Some(updated));
    }

    async fn check_empty_string_is_kept(store: &dyn ContactStore) {
        let contact = store.create().await.unwrap();
        let updated = store
            .update(
                contact.id,
                ContactUpdate {
                    twitter: Some(String::new()),
                    ..ContactUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.twitter.as_deref(), Some(""));
        assert!(updated.notes.is_none());
    }

    async fn check_delete(store: &dyn ContactStore) {
        let contact = add(store, "Sarah", "Doe").await;
        store.delete(contact.id).await.unwrap();

        assert!(store.get(contact.id).await.unwrap().is_none());
        assert!(store.search(None).await.unwrap().is_empty());
        assert!(matches!(
            store.delete(contact.id).await,
            Err(Error::NotFound { .. })
        ));
    }

    async fn check_ids_not_reused(store: &dyn ContactStore) {
        let first = store.create().await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create().await.unwrap();

        assert!(second.id > first.id);
    }

    async fn check_update_missing(store: &dyn ContactStore) {
        let result = store
            .update(ContactId::new(9999), ContactUpdate::favorite(true))
            .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    async fn check_stats(store: &dyn ContactStore) {
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());

        let contact = add(store, "Sarah", "Doe").await;
        store.create().await.unwrap();
        store
            .update(contact.id, ContactUpdate::favorite(true))
            .await
            .unwrap();

        assert_eq!(
            store.stats().await.unwrap(),
            StoreStats {
                total: 2,
                favorites: 1
            }
        );
    }

    macro_rules! store_suite {
        ($name:ident, $make:expr) => {
            mod $name {
                use super::*;

                #[tokio::test]
                async fn create_then_get() {
                    check_create_then_get(&$make).await;
                }

                #[tokio::test]
                async fn search() {
                    check_search(&$make).await;
                }

                #[tokio::test]
                async fn search_folds_non_ascii_case() {
                    check_search_folds_non_ascii_case(&$make).await;
                }

                #[tokio::test]
                async fn search_treats_wildcards_literally() {
                    check_search_treats_wildcards_literally(&$make).await;
                }

                #[tokio::test]
                async fn search_order() {
                    check_search_order(&$make).await;
                }

                #[tokio::test]
                async fn favorite_update_keeps_fields() {
                    check_favorite_update_keeps_fields(&$make).await;
                }

                #[tokio::test]
                async fn empty_string_is_kept() {
                    check_empty_string_is_kept(&$make).await;
                }

                #[tokio::test]
                async fn delete() {
                    check_delete(&$make).await;
                }

                #[tokio::test]
                async fn ids_not_reused() {
                    check_ids_not_reused(&$make).await;
                }

                #[tokio::test]
                async fn update_missing() {
                    check_update_missing(&$make).await;
                }

                #[tokio::test]
                async fn stats() {
                    check_stats(&$make).await;
                }
            }
        };
    }

    store_suite!(memory_store, MemoryStore::new());
    store_suite!(
        sqlite_store,
        SqliteStore::open_in_memory().expect("failed to create test store")
    );

    #[test]
    fn test_effective_query() {
        assert_eq!(effective_query(None), None);
        assert_eq!(effective_query(Some("")), None);
        assert_eq!(effective_query(Some("doe")), Some("doe"));
    }

    #[test]
    fn test_open_memory_backend() {
        let mut config = Config::default();
        config.storage.backend = StoreBackend::Memory;
        assert!(open(&config).is_ok());
    }

    #[test]
    fn test_open_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("contacts.db"));

        assert!(open(&config).is_ok());
        assert!(dir.path().join("contacts.db").exists());
    }
}
