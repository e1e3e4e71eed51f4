use sqlx::Row;

use quotebox_core::domain::quote::{NewQuote, Quote, QuoteId};

use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_quote(row: &sqlx::sqlite::SqliteRow) -> Result<Quote, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let author: String =
        row.try_get("author").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quote: String = row.try_get("quote").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Quote { id: QuoteId::from(id), author, quote })
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn add(&self, quote: NewQuote) -> Result<QuoteId, RepositoryError> {
        let result = sqlx::query("INSERT INTO quotes (author, quote) VALUES (?, ?)")
            .bind(&quote.author)
            .bind(&quote.quote)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::database("quotes.add"))?;

        Ok(QuoteId::from(result.last_insert_rowid()))
    }

    async fn list(&self) -> Result<Vec<Quote>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query("SELECT id, author, quote FROM quotes ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::database("quotes.list"))?;

        rows.iter().map(row_to_quote).collect::<Result<Vec<_>, _>>()
    }

    async fn list_by_author(&self, author: &str) -> Result<Vec<Quote>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query("SELECT id, author, quote FROM quotes WHERE author = ? ORDER BY id")
                .bind(author)
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::database("quotes.list_by_author"))?;

        rows.iter().map(row_to_quote).collect::<Result<Vec<_>, _>>()
    }

    async fn random(&self) -> Result<Quote, RepositoryError> {
        let row = sqlx::query("SELECT id, author, quote FROM quotes ORDER BY RANDOM() LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::database("quotes.random"))?;

        match row {
            Some(ref r) => row_to_quote(r),
            None => Err(RepositoryError::NotFound { operation: "quotes.random" }),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        // Keys that are not integers cannot match the primary key.
        let Ok(row_id) = id.parse::<i64>() else {
            return Err(RepositoryError::NotFound { operation: "quotes.delete" });
        };

        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(row_id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::database("quotes.delete"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { operation: "quotes.delete" });
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), RepositoryError> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use quotebox_core::domain::quote::{NewQuote, QuoteId};

    use super::SqlQuoteRepository;
    use crate::repositories::{QuoteRepository, RepositoryError};
    use crate::{connect_with_settings, schema};

    async fn repository() -> SqlQuoteRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        schema::ensure(&pool).await.expect("schema");
        SqlQuoteRepository::new(pool)
    }

    #[tokio::test]
    async fn add_then_list_shows_quote_once_with_assigned_id() {
        let repo = repository().await;

        let id = repo.add(NewQuote::new("Test Author", "Test Quote")).await.expect("add quote");
        let quotes = repo.list().await.expect("list quotes");

        assert!(!id.0.is_empty());
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, id);
        assert_eq!(quotes[0].author, "Test Author");
        assert_eq!(quotes[0].quote, "Test Quote");
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty_not_error() {
        let repo = repository().await;
        assert!(repo.list().await.expect("list quotes").is_empty());
    }

    #[tokio::test]
    async fn empty_author_and_body_are_stored_as_is() {
        let repo = repository().await;

        let id = repo.add(NewQuote::default()).await.expect("add empty quote");
        let quotes = repo.list_by_author("").await.expect("list by empty author");

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, id);
        assert_eq!(quotes[0].quote, "");
    }

    #[tokio::test]
    async fn author_filter_is_exact_subset_of_list() {
        let repo = repository().await;
        for (author, body) in [
            ("Seneca", "Luck is what happens when preparation meets opportunity."),
            ("seneca", "lowercase author"),
            ("Marcus Aurelius", "The impediment to action advances action."),
            ("Seneca", "We suffer more in imagination than in reality."),
        ] {
            repo.add(NewQuote::new(author, body)).await.expect("add quote");
        }

        let all = repo.list().await.expect("list quotes");
        for author in ["Seneca", "seneca", "Marcus Aurelius", "Epictetus", ""] {
            let filtered = repo.list_by_author(author).await.expect("list by author");
            let expected: Vec<_> = all.iter().filter(|q| q.author == author).cloned().collect();
            assert_eq!(filtered, expected, "author `{author}`");
        }

        assert_eq!(repo.list_by_author("Seneca").await.expect("list").len(), 2);
        assert!(repo.list_by_author("Epictetus").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn random_on_empty_store_is_not_found() {
        let repo = repository().await;

        let error = repo.random().await.expect_err("empty store has no random quote");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("quote not found"));
    }

    #[tokio::test]
    async fn random_samples_across_the_whole_set() {
        let repo = repository().await;
        let mut ids = HashSet::new();
        for n in 0..3 {
            ids.insert(repo.add(NewQuote::new("Author", format!("Quote {n}"))).await.expect("add"));
        }

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let quote = repo.random().await.expect("random quote on non-empty store");
            assert!(ids.contains(&quote.id));
            seen.insert(quote.id);
        }

        assert_eq!(seen, ids, "every stored quote should eventually be sampled");
    }

    #[tokio::test]
    async fn delete_removes_row_and_second_delete_is_not_found() {
        let repo = repository().await;
        let keep = repo.add(NewQuote::new("Author1", "Quote1")).await.expect("add");
        let doomed = repo.add(NewQuote::new("Author2", "Quote2")).await.expect("add");

        repo.delete(&doomed.0).await.expect("delete existing quote");

        let remaining = repo.list().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep);

        let error = repo.delete(&doomed.0).await.expect_err("second delete should fail");
        assert!(matches!(error, RepositoryError::NotFound { operation: "quotes.delete" }));
    }

    #[tokio::test]
    async fn delete_with_unknown_blank_or_non_numeric_id_is_not_found() {
        let repo = repository().await;
        repo.add(NewQuote::new("Author", "Quote")).await.expect("add");

        for id in ["123", "", "valid-id"] {
            let error = repo.delete(id).await.expect_err("no row should match");
            assert!(error.is_not_found(), "id `{id}` should be not found");
        }

        assert_eq!(repo.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = repository().await;
        let first = repo.add(NewQuote::new("Author", "First")).await.expect("add");
        repo.delete(&first.0).await.expect("delete");

        let second = repo.add(NewQuote::new("Author", "Second")).await.expect("add");
        assert_ne!(first, second);
        assert_eq!(second, QuoteId::from(2));
    }

    #[tokio::test]
    async fn close_is_repeatable_and_later_calls_fail_with_database_error() {
        let repo = repository().await;

        repo.close().await.expect("first close");
        repo.close().await.expect("second close");

        let error = repo.list().await.expect_err("closed pool should fail");
        assert!(matches!(error, RepositoryError::Database { operation: "quotes.list", .. }));

        let error = repo.add(NewQuote::new("Author", "Quote")).await.expect_err("closed pool");
        assert!(error.to_string().starts_with("quotes.add: database error"));
    }

    #[tokio::test]
    async fn missing_table_surfaces_as_database_error() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        let repo = SqlQuoteRepository::new(pool);

        let error = repo.random().await.expect_err("no schema");
        assert!(matches!(error, RepositoryError::Database { operation: "quotes.random", .. }));

        let error = repo.delete("1").await.expect_err("no schema");
        assert!(!error.is_not_found());
    }
}
