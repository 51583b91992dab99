//! # Services
//!
//! Use cases the HTTP layer calls. They talk to storage only through the
//! port traits, so they run unchanged against SQLite or a mock.

pub mod accounts;
pub mod listing;
pub mod posts;
pub mod social;

use crate::forms::FormErrors;

/// Result of a form submission that passed the authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// Persisted; carries the stored record.
    Saved(T),
    /// Rejected by validation; nothing was written.
    Invalid(FormErrors),
}

impl<T> Submission<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Submission::Saved(_))
    }
}

/// A file received with a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
