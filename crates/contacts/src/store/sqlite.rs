//! `SQLite`-backed contact store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::schema::CONTACT_COLUMNS;
use super::{effective_query, migrations, ContactStore, StoreStats};
use crate::contact::{Contact, ContactId, ContactUpdate};
use crate::error::{Error, Result};

/// Persistent contact store.
///
/// Every operation runs on a single connection guarded by a mutex; writes
/// are short so handlers never hold the lock across an await point.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a contact database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        register_functions(&conn)?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store, used by tests and throwaway sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        register_functions(&conn)?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("contact database lock poisoned"))
    }

    fn fetch(conn: &Connection, id: ContactId) -> Result<Option<Contact>> {
        let contact = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                [id.get()],
                Self::row_to_contact,
            )
            .optional()?;
        Ok(contact)
    }

    /// Convert a database row to a Contact struct.
    fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
        let id: i64 = row.get(0)?;
        let created_at_str: String = row.get(7)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str).map_or_else(
            |_| {
                warn!("Unparsable created_at {created_at_str:?} on contact {id}");
                DateTime::<Utc>::default()
            },
            |dt| dt.with_timezone(&Utc),
        );

        Ok(Contact {
            id: ContactId::new(id),
            first: row.get(1)?,
            last: row.get(2)?,
            twitter: row.get(3)?,
            avatar: row.get(4)?,
            notes: row.get(5)?,
            favorite: row.get(6)?,
            created_at,
        })
    }
}

/// Register `lower_unicode(text)`: full Unicode lowercasing, where the
/// built-in `lower()` and `LIKE` only fold ASCII.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "lower_unicode",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Escape `LIKE` wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ContactStore for SqliteStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Contact>> {
        let conn = self.conn()?;
        let order = "ORDER BY last ASC, created_at ASC, id ASC";

        let contacts = match effective_query(query) {
            Some(query) => {
                let mut stmt = conn.prepare(&format!(
                    r"
                    SELECT {CONTACT_COLUMNS} FROM contacts
                    WHERE lower_unicode(first) LIKE ?1 ESCAPE '\'
                       OR lower_unicode(last) LIKE ?1 ESCAPE '\'
                    {order}
                    "
                ))?;
                let rows = stmt
                    .query_map([like_pattern(&query.to_lowercase())], Self::row_to_contact)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts {order}"))?;
                let rows = stmt
                    .query_map([], Self::row_to_contact)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(contacts)
    }

    async fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    async fn create(&self) -> Result<Contact> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        conn.execute(
            "INSERT INTO contacts (favorite, created_at) VALUES (0, ?1)",
            [created_at],
        )?;

        let id = ContactId::new(conn.last_insert_rowid());
        debug!("Inserted contact with id {id}");
        Self::fetch(&conn, id)?
            .ok_or_else(|| Error::internal(format!("contact {id} vanished after insert")))
    }

    async fn update(&self, id: ContactId, fields: ContactUpdate) -> Result<Contact> {
        let conn = self.conn()?;
        let mut contact = Self::fetch(&conn, id)?.ok_or_else(|| Error::not_found(id))?;
        contact.apply(fields);

        conn.execute(
            r"
            UPDATE contacts
            SET first = ?2, last = ?3, twitter = ?4, avatar = ?5, notes = ?6, favorite = ?7
            WHERE id = ?1
            ",
            params![
                id.get(),
                contact.first,
                contact.last,
                contact.twitter,
                contact.avatar,
                contact.notes,
                contact.favorite,
            ],
        )?;

        debug!("Updated contact {id}");
        Ok(contact)
    }

    async fn delete(&self, id: ContactId) -> Result<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM contacts WHERE id = ?1", [id.get()])?;
        if affected == 0 {
            return Err(Error::not_found(id));
        }
        debug!("Deleted contact {id}");
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let (total, favorites): (i64, i64) = self.conn()?.query_row(
            "SELECT COUNT(*), COALESCE(SUM(favorite), 0) FROM contacts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            total: u64::try_from(total).unwrap_or_default(),
            favorites: u64::try_from(favorites).unwrap_or_default(),
        })
    }
}
