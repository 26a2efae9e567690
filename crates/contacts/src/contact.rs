//! Core contact types.
//!
//! This module defines the contact record, its identifier, and the partial
//! update applied by edit and favorite submissions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a stored contact.
///
/// Assigned by the store at creation time, never reused after deletion.
/// Rendered in URLs as its decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid contact identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidContactId(String);

impl fmt::Display for InvalidContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid contact id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidContactId {}

impl FromStr for ContactId {
    type Err = InvalidContactId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(InvalidContactId(s.to_string())),
        }
    }
}

/// A stored contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier assigned by the store.
    pub id: ContactId,

    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,

    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,

    /// Twitter handle, without the leading URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    /// Avatar image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Whether the contact is marked as a favorite.
    #[serde(default)]
    pub favorite: bool,

    /// When the store created this record.
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Create an empty contact: every optional field unset, not a favorite.
    #[must_use]
    pub fn empty(id: ContactId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first: None,
            last: None,
            twitter: None,
            avatar: None,
            notes: None,
            favorite: false,
            created_at,
        }
    }

    /// Whether either name field holds non-empty text.
    #[must_use]
    pub fn has_name(&self) -> bool {
        non_empty(self.first.as_deref()) || non_empty(self.last.as_deref())
    }

    /// The "First Last" display name, or `None` when the contact has no name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if !self.has_name() {
            return None;
        }
        let full = format!(
            "{} {}",
            self.first.as_deref().unwrap_or_default(),
            self.last.as_deref().unwrap_or_default()
        );
        Some(full.trim().to_string())
    }

    /// Case-insensitive substring match against the first and last names.
    ///
    /// An empty query matches every contact.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        [self.first.as_deref(), self.last.as_deref()]
            .into_iter()
            .flatten()
            .any(|name| name.to_lowercase().contains(&needle))
    }

    /// Merge a partial update into this record.
    ///
    /// Present fields overwrite the stored value; absent fields are kept.
    pub fn apply(&mut self, update: ContactUpdate) {
        let ContactUpdate {
            first,
            last,
            twitter,
            avatar,
            notes,
            favorite,
        } = update;

        if first.is_some() {
            self.first = first;
        }
        if last.is_some() {
            self.last = last;
        }
        if twitter.is_some() {
            self.twitter = twitter;
        }
        if avatar.is_some() {
            self.avatar = avatar;
        }
        if notes.is_some() {
            self.notes = notes;
        }
        if let Some(favorite) = favorite {
            self.favorite = favorite;
        }
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// A partial contact: the fields to overwrite on an existing record.
///
/// Deserializes directly from the edit form. The last-name input is also
/// accepted under its legacy `Last` name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactUpdate {
    /// New first name.
    pub first: Option<String>,
    /// New last name.
    #[serde(alias = "Last")]
    pub last: Option<String>,
    /// New twitter handle.
    pub twitter: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New favorite flag.
    pub favorite: Option<bool>,
}

impl ContactUpdate {
    /// An update that only sets the favorite flag.
    #[must_use]
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(first: Option<&str>, last: Option<&str>) -> Contact {
        let mut contact = Contact::empty(ContactId::new(1), Utc::now());
        contact.first = first.map(str::to_string);
        contact.last = last.map(str::to_string);
        contact
    }

    #[test]
    fn test_contact_id_parse() {
        assert_eq!("42".parse::<ContactId>().unwrap(), ContactId::new(42));
        assert!("abc".parse::<ContactId>().is_err());
        assert!("0".parse::<ContactId>().is_err());
        assert!("-3".parse::<ContactId>().is_err());
        assert!("".parse::<ContactId>().is_err());
    }

    #[test]
    fn test_contact_id_display() {
        assert_eq!(ContactId::new(7).to_string(), "7");
    }

    #[test]
    fn test_empty_contact() {
        let contact = Contact::empty(ContactId::new(3), Utc::now());
        assert!(contact.first.is_none());
        assert!(contact.last.is_none());
        assert!(contact.twitter.is_none());
        assert!(contact.avatar.is_none());
        assert!(contact.notes.is_none());
        assert!(!contact.favorite);
        assert!(!contact.has_name());
        assert_eq!(contact.display_name(), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            named(Some("Sarah"), Some("Doe")).display_name().as_deref(),
            Some("Sarah Doe")
        );
        assert_eq!(
            named(Some("Sarah"), None).display_name().as_deref(),
            Some("Sarah")
        );
        assert_eq!(named(None, Some("Doe")).display_name().as_deref(), Some("Doe"));
        assert_eq!(named(Some(""), Some("")).display_name(), None);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let contact = named(Some("Sarah"), Some("Doe"));
        assert!(contact.matches("doe"));
        assert!(contact.matches("SAR"));
        assert!(contact.matches(""));
        assert!(!contact.matches("zz"));
    }

    #[test]
    fn test_matches_ignores_other_fields() {
        let mut contact = named(None, None);
        contact.notes = Some("doe".to_string());
        contact.twitter = Some("doe".to_string());
        assert!(!contact.matches("doe"));
    }

    #[test]
    fn test_apply_favorite_keeps_other_fields() {
        let mut contact = named(Some("Sarah"), Some("Doe"));
        contact.notes = Some("met at the conference".to_string());
        let before = contact.clone();

        contact.apply(ContactUpdate::favorite(true));

        assert!(contact.favorite);
        assert_eq!(contact.first, before.first);
        assert_eq!(contact.last, before.last);
        assert_eq!(contact.notes, before.notes);
    }

    #[test]
    fn test_apply_keeps_empty_string_distinct() {
        let mut contact = named(Some("Sarah"), None);
        contact.apply(ContactUpdate {
            first: Some(String::new()),
            ..ContactUpdate::default()
        });
        assert_eq!(contact.first.as_deref(), Some(""));
        assert!(contact.last.is_none());
    }

    #[test]
    fn test_update_accepts_legacy_last_field() {
        let update: ContactUpdate = serde_json::from_str(r#"{"Last": "Doe"}"#).unwrap();
        assert_eq!(update.last.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_contact_serialization_skips_unset_fields() {
        let contact = Contact::empty(ContactId::new(9), Utc::now());
        let json = serde_json::to_string(&contact).unwrap();
        assert!(json.contains("\"id\":9"));
        assert!(json.contains("\"favorite\":false"));
        assert!(!json.contains("first"));
    }
}
