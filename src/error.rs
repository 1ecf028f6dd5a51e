//! Error taxonomy shared by all catalog operations.

use thiserror::Error;

/// Errors surfaced to the caller of a catalog operation.
///
/// Failures of a single derived field (distance, spectral type) are not errors:
/// they are carried as typed variants of that field instead, see
/// [`Distance`](crate::inventory::Distance) and
/// [`SpectralTypes`](crate::inventory::SpectralTypes).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed user input, e.g. a non-numeric source id or an unparsable search.
    #[error("bad input: {0}")]
    BadInput(String),

    /// No catalog object or rows matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store returned rows that violate the catalog schema.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// The catalog store itself failed.
    #[error("catalog store failure: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    /// Wrap any store error as an opaque upstream failure.
    pub fn upstream<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Upstream(Box::new(error))
    }

    /// Whether this error should be shown as a user input problem.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::BadInput(_))
    }

    /// Whether this error means nothing matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for all catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
