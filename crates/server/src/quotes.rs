//! Quote HTTP endpoints.
//!
//! - `POST   /quotes`           add a quote from a `{"author", "quote"}` body
//! - `GET    /quotes`           list quotes, filtered by `?author=` when non-empty
//! - `GET    /quotes/random`    one uniformly sampled quote
//! - `DELETE /quotes/{id}`      delete a quote by id
//!
//! Failures answer with fixed plain-text messages; repository detail is only
//! logged.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use quotebox_core::domain::quote::NewQuote;
use quotebox_db::QuoteRepository;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct QuotesState {
    repository: Arc<dyn QuoteRepository>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuotesQuery {
    pub author: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid request")]
    InvalidRequest,
    #[error("No quotes found")]
    NotFound,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{self}\n")).into_response()
    }
}

pub fn router(repository: Arc<dyn QuoteRepository>) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes).post(add_quote))
        .route("/quotes/random", get(random_quote))
        .route("/quotes/{id}", delete(delete_quote))
        .route("/quotes/", delete(delete_quote_without_id))
        .with_state(QuotesState { repository })
}

async fn add_quote(
    State(state): State<QuotesState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let quote = decode_new_quote(&body).map_err(|error| {
        warn!(
            event_name = "quotes.add.invalid_request",
            error = %error,
            "failed to decode request body"
        );
        ApiError::InvalidRequest
    })?;

    let id = state.repository.add(quote).await.map_err(|error| {
        error!(event_name = "quotes.add.failed", error = %error, "failed to add quote");
        ApiError::Internal
    })?;

    info!(event_name = "quotes.add.completed", quote_id = %id, "quote added");
    Ok(StatusCode::OK)
}

async fn list_quotes(
    State(state): State<QuotesState>,
    Query(query): Query<ListQuotesQuery>,
) -> Result<Response, ApiError> {
    let author = query.author.filter(|author| !author.is_empty());

    let result = match author.as_deref() {
        Some(author) => state.repository.list_by_author(author).await,
        None => state.repository.list().await,
    };

    let quotes = result.map_err(|error| {
        error!(
            event_name = "quotes.list.failed",
            author = author.as_deref().unwrap_or(""),
            error = %error,
            "failed to list quotes"
        );
        ApiError::Internal
    })?;

    json_line(&quotes)
}

async fn random_quote(State(state): State<QuotesState>) -> Result<Response, ApiError> {
    match state.repository.random().await {
        Ok(quote) => json_line(&quote),
        Err(error) if error.is_not_found() => {
            debug!(event_name = "quotes.random.empty", "no quotes stored");
            Err(ApiError::NotFound)
        }
        Err(error) => {
            error!(event_name = "quotes.random.failed", error = %error, "failed to sample quote");
            Err(ApiError::Internal)
        }
    }
}

async fn delete_quote(
    State(state): State<QuotesState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_quote(&state, &id).await
}

async fn delete_quote_without_id(State(state): State<QuotesState>) -> Result<StatusCode, ApiError> {
    remove_quote(&state, "").await
}

/// Not-found deletes answer 500 like any other repository failure.
async fn remove_quote(state: &QuotesState, id: &str) -> Result<StatusCode, ApiError> {
    state.repository.delete(id).await.map_err(|error| {
        error!(
            event_name = "quotes.delete.failed",
            quote_id = %id,
            error = %error,
            "failed to delete quote"
        );
        ApiError::Internal
    })?;

    info!(event_name = "quotes.delete.completed", quote_id = %id, "quote deleted");
    Ok(StatusCode::OK)
}

/// Decodes the first JSON value of an add body, ignoring any bytes after it.
/// A top-level `null` decodes to an empty quote. The Content-Type header is
/// not consulted.
fn decode_new_quote(body: &[u8]) -> Result<NewQuote, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let quote = Option::<NewQuote>::deserialize(&mut deserializer)?;
    Ok(quote.unwrap_or_default())
}

/// JSON body terminated by a newline, served as `application/json`.
fn json_line<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let mut body = serde_json::to_vec(value).map_err(|error| {
        error!(event_name = "quotes.encode.failed", error = %error, "failed to encode response");
        ApiError::Internal
    })?;
    body.push(b'\n');

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
