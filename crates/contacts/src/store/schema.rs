//! `SQLite` schema definitions for the contact store.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the contacts table.
///
/// `AUTOINCREMENT` keeps identifiers of deleted rows from being handed out
/// again.
pub const CREATE_CONTACTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first TEXT,
    last TEXT,
    twitter TEXT,
    avatar TEXT,
    notes TEXT,
    favorite INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index matching the list ordering.
pub const CREATE_ORDER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_order ON contacts(last, created_at, id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_CONTACTS_TABLE,
    CREATE_ORDER_INDEX,
    CREATE_METADATA_TABLE,
];

/// Column list shared by every contact query, in `row_to_contact` order.
pub const CONTACT_COLUMNS: &str =
    "id, first, last, twitter, avatar, notes, favorite, created_at";
