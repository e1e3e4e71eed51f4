pub mod config;
pub mod domain;

pub use domain::quote::{NewQuote, Quote, QuoteId};
