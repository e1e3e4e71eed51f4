use async_trait::async_trait;
use thiserror::Error;

use quotebox_core::domain::quote::{NewQuote, Quote, QuoteId};

pub mod memory;
pub mod quote;

pub use memory::InMemoryQuoteRepository;
pub use quote::SqlQuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{operation}: quote not found")]
    NotFound { operation: &'static str },
    #[error("{operation}: database error: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("decode error: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { operation, source }
    }
}

/// CRUD access to stored quotes.
///
/// Dropping a returned future cancels the in-flight store operation. Nothing
/// is retried; every failure surfaces once to the caller.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Persists a new quote and returns the identifier the store assigned.
    async fn add(&self, quote: NewQuote) -> Result<QuoteId, RepositoryError>;

    /// Every stored quote. An empty store is not an error.
    async fn list(&self) -> Result<Vec<Quote>, RepositoryError>;

    /// Quotes whose author equals `author` exactly (case-sensitive).
    async fn list_by_author(&self, author: &str) -> Result<Vec<Quote>, RepositoryError>;

    /// One quote sampled uniformly from the whole set, or
    /// [`RepositoryError::NotFound`] when the set is empty.
    async fn random(&self) -> Result<Quote, RepositoryError>;

    /// Removes the quote keyed by `id`. Fails with [`RepositoryError::NotFound`]
    /// when no row matched, including blank ids.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Releases store resources. Safe to call more than once.
    async fn close(&self) -> Result<(), RepositoryError>;
}
