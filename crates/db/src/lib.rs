pub mod connection;
pub mod repositories;
pub mod schema;

pub use connection::{connect_with_settings, DbPool};
pub use repositories::{
    InMemoryQuoteRepository, QuoteRepository, RepositoryError, SqlQuoteRepository,
};
