//! Engine-level error taxonomy.
//!
//! Four conditions, three of them user errors. "Well-formed query, zero
//! matches" is deliberately absent: an empty result is a normal `ResultSet`
//! and the boundary layer decides what an empty page means (it maps to 404
//! on the HTTP surface). `BackendUnavailable` is the only retryable failure
//! and is propagated undisguised so the caller can choose its own policy.

use thiserror::Error;

use crate::filter::FilterError;
use crate::page::PageError;
use crate::query::BackendError;

#[derive(Debug, Error)]
pub enum SchemaQueryError {
    /// The class name does not exist in the schema. Distinct from an empty
    /// result: this is a malformed request.
    #[error("unknown schema class `{class}`")]
    TypeNotFound { class: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("invalid page window: {0}")]
    InvalidPage(#[from] PageError),

    #[error("query backend unavailable: {0}")]
    BackendUnavailable(#[source] BackendError),
}

impl SchemaQueryError {
    /// True for conditions the caller can fix by restating the request;
    /// false only for `BackendUnavailable`, which is retryable as-is.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::BackendUnavailable(_))
    }
}
