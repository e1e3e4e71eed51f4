use std::collections::BTreeSet;

use crate::commands::{connect, current_thread_runtime, CommandFailure, CommandResult};
use quotebox_core::config::{AppConfig, LoadOptions};
use quotebox_core::NewQuote;
use quotebox_db::{schema, QuoteRepository, SqlQuoteRepository};

pub(crate) const DEMO_QUOTES: &[(&str, &str)] = &[
    ("Ada Lovelace", "That brain of mine is something more than merely mortal; as time will show."),
    (
        "Grace Hopper",
        "The most dangerous phrase in the language is, 'We've always done it this way.'",
    ),
    ("Alan Kay", "The best way to predict the future is to invent it."),
    ("Edsger W. Dijkstra", "Simplicity is prerequisite for reliability."),
    ("Donald Knuth", "Premature optimization is the root of all evil."),
];

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(message) => return CommandResult::failure("seed", "runtime_init", message, 3),
    };

    let result = runtime.block_on(async {
        let pool = connect(&config).await?;
        schema::ensure(&pool).await.map_err(|error| ("schema", error.to_string(), 5u8))?;

        let repository = SqlQuoteRepository::new(pool);
        let outcome = seed_demo_quotes(&repository).await;
        let _ = repository.close().await;
        outcome
    });

    match result {
        Ok(inserted) => CommandResult::success("seed", seed_message(inserted)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Adds every demo quote whose author has nothing stored yet, so repeated runs
/// leave the table unchanged.
async fn seed_demo_quotes(repository: &dyn QuoteRepository) -> Result<usize, CommandFailure> {
    let seed_error =
        |error: quotebox_db::RepositoryError| ("seed_execution", error.to_string(), 5u8);

    let authors: BTreeSet<&str> = DEMO_QUOTES.iter().map(|(author, _)| *author).collect();
    let mut pending = BTreeSet::new();
    for author in authors {
        if repository.list_by_author(author).await.map_err(seed_error)?.is_empty() {
            pending.insert(author);
        }
    }

    let mut inserted = 0;
    for (author, quote) in DEMO_QUOTES.iter().filter(|(author, _)| pending.contains(author)) {
        repository.add(NewQuote::new(*author, *quote)).await.map_err(seed_error)?;
        inserted += 1;
    }

    Ok(inserted)
}

fn seed_message(inserted: usize) -> String {
    match inserted {
        0 => "demo quotes already present; nothing inserted".to_string(),
        n => format!("inserted {n} of {} demo quotes", DEMO_QUOTES.len()),
    }
}

#[cfg(test)]
mod tests {
    use quotebox_core::NewQuote;
    use quotebox_db::{InMemoryQuoteRepository, QuoteRepository};

    use super::{seed_demo_quotes, seed_message, DEMO_QUOTES};

    #[tokio::test]
    async fn seeding_twice_inserts_each_demo_quote_once() {
        let repository = InMemoryQuoteRepository::default();

        assert_eq!(seed_demo_quotes(&repository).await.expect("first seed"), DEMO_QUOTES.len());
        assert_eq!(seed_demo_quotes(&repository).await.expect("second seed"), 0);
        assert_eq!(repository.list().await.expect("list").len(), DEMO_QUOTES.len());
    }

    #[tokio::test]
    async fn seeding_skips_authors_already_present() {
        let repository = InMemoryQuoteRepository::default();
        repository
            .add(NewQuote::new("Alan Kay", "Perspective is worth 80 IQ points."))
            .await
            .expect("add");

        let inserted = seed_demo_quotes(&repository).await.expect("seed");

        assert_eq!(inserted, DEMO_QUOTES.len() - 1);
        assert_eq!(repository.list_by_author("Alan Kay").await.expect("list").len(), 1);
    }

    #[test]
    fn seed_message_reports_noop_runs() {
        assert_eq!(seed_message(0), "demo quotes already present; nothing inserted");
        assert_eq!(seed_message(2), format!("inserted 2 of {} demo quotes", DEMO_QUOTES.len()));
    }
}
