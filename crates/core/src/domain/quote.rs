use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned quote identifier, carried as a string at the interface boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl From<i64> for QuoteId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub author: String,
    pub quote: String,
}

/// Create payload. Any client-supplied `id` is ignored and absent fields are
/// stored as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewQuote {
    pub author: String,
    pub quote: String,
}

impl NewQuote {
    pub fn new(author: impl Into<String>, quote: impl Into<String>) -> Self {
        Self { author: author.into(), quote: quote.into() }
    }

    pub fn into_quote(self, id: QuoteId) -> Quote {
        Quote { id, author: self.author, quote: self.quote }
    }
}
