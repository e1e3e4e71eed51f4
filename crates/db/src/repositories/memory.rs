use std::collections::BTreeMap;

use rand::seq::IteratorRandom;
use tokio::sync::RwLock;

use quotebox_core::domain::quote::{NewQuote, Quote, QuoteId};

use super::{QuoteRepository, RepositoryError};

#[derive(Default)]
struct QuoteTable {
    last_id: i64,
    rows: BTreeMap<i64, Quote>,
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    table: RwLock<QuoteTable>,
}

impl InMemoryQuoteRepository {
    pub async fn with_quotes(
        quotes: impl IntoIterator<Item = NewQuote>,
    ) -> Result<Self, RepositoryError> {
        let repo = Self::default();
        for quote in quotes {
            repo.add(quote).await?;
        }
        Ok(repo)
    }
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn add(&self, quote: NewQuote) -> Result<QuoteId, RepositoryError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let row_id = table.last_id;
        let id = QuoteId::from(row_id);
        table.rows.insert(row_id, quote.into_quote(id.clone()));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Quote>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn list_by_author(&self, author: &str) -> Result<Vec<Quote>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|quote| quote.author == author).cloned().collect())
    }

    async fn random(&self) -> Result<Quote, RepositoryError> {
        let table = self.table.read().await;
        table
            .rows
            .values()
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(RepositoryError::NotFound { operation: "memory.random" })
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        id.parse::<i64>()
            .ok()
            .and_then(|row_id| table.rows.remove(&row_id))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound { operation: "memory.delete" })
    }

    async fn close(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quotebox_core::domain::quote::{NewQuote, QuoteId};

    use crate::repositories::{InMemoryQuoteRepository, QuoteRepository};

    #[tokio::test]
    async fn in_memory_quote_repo_round_trip() {
        let repo = InMemoryQuoteRepository::default();

        let id = repo.add(NewQuote::new("Author1", "Quote1")).await.expect("add quote");
        let found = repo.list().await.expect("list quotes");

        assert_eq!(id, QuoteId::from(1));
        assert_eq!(found, vec![NewQuote::new("Author1", "Quote1").into_quote(id)]);
    }

    #[tokio::test]
    async fn in_memory_repo_matches_not_found_contract() {
        let repo = InMemoryQuoteRepository::default();
        assert!(repo.random().await.expect_err("empty").is_not_found());
        assert!(repo.delete("").await.expect_err("blank id").is_not_found());

        let id = repo.add(NewQuote::new("Author", "Quote")).await.expect("add");
        assert_eq!(repo.random().await.expect("random").id, id);

        repo.delete(&id.0).await.expect("delete");
        assert!(repo.delete(&id.0).await.expect_err("already deleted").is_not_found());
        assert!(repo.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn in_memory_author_filter_is_case_sensitive() {
        let repo = InMemoryQuoteRepository::with_quotes([
            NewQuote::new("Author1", "Quote1"),
            NewQuote::new("author1", "Quote2"),
        ])
        .await
        .expect("seed quotes");

        let filtered = repo.list_by_author("Author1").await.expect("filter");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].quote, "Quote1");
        repo.close().await.expect("close");
    }

    #[tokio::test]
    async fn with_quotes_assigns_ids_in_insertion_order() {
        let repo = InMemoryQuoteRepository::with_quotes([
            NewQuote::new("Author1", "Quote1"),
            NewQuote::new("Author2", "Quote2"),
        ])
        .await
        .expect("seed quotes");

        let ids: Vec<QuoteId> =
            repo.list().await.expect("list").into_iter().map(|quote| quote.id).collect();
        assert_eq!(ids, vec![QuoteId::from(1), QuoteId::from(2)]);
    }
}
