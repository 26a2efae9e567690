//! In-memory contact store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{effective_query, ContactStore, StoreStats};
use crate::contact::{Contact, ContactId, ContactUpdate};
use crate::error::{Error, Result};

/// Contact store held entirely in process memory.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Last identifier handed out; only ever grows.
    last_id: i64,
    contacts: BTreeMap<ContactId, Contact>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn list_order(a: &Contact, b: &Contact) -> Ordering {
    a.last
        .cmp(&b.last)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Contact>> {
        let inner = self.inner.read().await;
        let mut contacts: Vec<Contact> = match effective_query(query) {
            Some(query) => inner
                .contacts
                .values()
                .filter(|c| c.matches(query))
                .cloned()
                .collect(),
            None => inner.contacts.values().cloned().collect(),
        };
        contacts.sort_by(list_order);
        Ok(contacts)
    }

    async fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        Ok(self.inner.read().await.contacts.get(&id).cloned())
    }

    async fn create(&self) -> Result<Contact> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let contact = Contact::empty(ContactId::new(inner.last_id), Utc::now());
        inner.contacts.insert(contact.id, contact.clone());
        debug!("Inserted contact with id {}", contact.id);
        Ok(contact)
    }

    async fn update(&self, id: ContactId, fields: ContactUpdate) -> Result<Contact> {
        let mut inner = self.inner.write().await;
        let contact = inner
            .contacts
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(id))?;
        contact.apply(fields);
        debug!("Updated contact {id}");
        Ok(contact.clone())
    }

    async fn delete(&self, id: ContactId) -> Result<()> {
        self.inner
            .write()
            .await
            .contacts
            .remove(&id)
            .ok_or_else(|| Error::not_found(id))?;
        debug!("Deleted contact {id}");
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let inner = self.inner.read().await;
        let favorites = inner.contacts.values().filter(|c| c.favorite).count();
        Ok(StoreStats {
            total: inner.contacts.len() as u64,
            favorites: favorites as u64,
        })
    }
}
