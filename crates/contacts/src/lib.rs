//! `contacts` - A small contact manager served over HTTP
//!
//! This library provides the contact record model, the stores that persist
//! contacts, and the web application that lists, searches and edits them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use config::Config;
pub use contact::{Contact, ContactId, ContactUpdate};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::{ContactStore, MemoryStore, SqliteStore, StoreStats};
