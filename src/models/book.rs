//! Book record model and related request/response types.
//!
//! Wire names are camelCase (`pageCount`, `readPage`, `insertedAt`, ...).
//! `finished` is never read from a request: it is recomputed from
//! `pageCount`/`readPage` whenever a record is built.
//!
//! `year`, `pageCount`, `readPage` and `reading` are stored exactly as the
//! client sent them. Only `name` and the page-progress rule are checked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Validation code raised when `readPage` is greater than `pageCount`
pub const READ_PAGE_OVERFLOW: &str = "read_page_exceeds_page_count";

/// Full book record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// 16-character random identifier
    pub id: String,
    pub name: String,
    #[schema(value_type = Option<i32>)]
    pub year: Option<Value>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    /// Total pages
    #[schema(value_type = Option<i64>)]
    pub page_count: Option<Value>,
    /// Pages read so far; when both are numbers, never greater than `page_count`
    #[schema(value_type = Option<i64>)]
    pub read_page: Option<Value>,
    /// True iff `read_page == page_count`
    pub finished: bool,
    #[schema(value_type = Option<bool>)]
    pub reading: Option<Value>,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a fresh record from a validated payload.
    pub fn new(id: String, payload: BookPayload, now: DateTime<Utc>) -> Self {
        let finished = payload.is_finished();
        Self {
            id,
            name: payload.name.unwrap_or_default(),
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished,
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replacement record for an update: keeps `id` and `inserted_at`,
    /// takes every other field from the payload and refreshes `updated_at`.
    pub fn replaced_with(&self, payload: BookPayload, now: DateTime<Utc>) -> Self {
        Self {
            inserted_at: self.inserted_at,
            ..Self::new(self.id.clone(), payload, now)
        }
    }

    /// Whether the reading flag is set, with JSON truthiness for non-booleans
    pub fn is_reading(&self) -> bool {
        self.reading.as_ref().is_some_and(truthy)
    }
}

/// `null`, `false`, `0`, `""` are falsy; everything else is truthy
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Request body for both create and update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_page_progress"))]
pub struct BookPayload {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub year: Option<Value>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    #[schema(value_type = Option<i64>)]
    pub page_count: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub read_page: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub reading: Option<Value>,
}

impl BookPayload {
    /// `readPage > pageCount`, checked only when both are JSON numbers
    pub fn read_page_exceeds_page_count(&self) -> bool {
        match (number(&self.read_page), number(&self.page_count)) {
            (Some(read), Some(total)) => read > total,
            _ => false,
        }
    }

    /// Numbers compare by value (`100` equals `100.0`), anything else
    /// must be identical; two absent values are equal.
    pub fn is_finished(&self) -> bool {
        match (number(&self.page_count), number(&self.read_page)) {
            (Some(total), Some(read)) => total == read,
            _ => self.page_count == self.read_page,
        }
    }
}

fn number(value: &Option<Value>) -> Option<f64> {
    value.as_ref().and_then(Value::as_f64)
}

fn validate_page_progress(payload: &BookPayload) -> Result<(), ValidationError> {
    if payload.read_page_exceeds_page_count() {
        let mut error = ValidationError::new(READ_PAGE_OVERFLOW);
        error.message = Some("readPage must not be greater than pageCount".into());
        return Err(error);
    }
    Ok(())
}

/// Book projection used by list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Query parameters for listing books
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1` for books being read, `0` for the rest
    pub reading: Option<String>,
    /// `1` for finished books, `0` for the rest
    pub finished: Option<String>,
}

/// Resolved list filter. Only one applies, in the order name, reading, finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Lowercased needle
    Name(String),
    Reading(bool),
    Finished(bool),
}

impl BookQuery {
    pub fn filter(&self) -> AppResult<BookFilter> {
        if let Some(name) = present(&self.name) {
            return Ok(BookFilter::Name(name.to_lowercase()));
        }
        if let Some(reading) = present(&self.reading) {
            return Ok(BookFilter::Reading(parse_flag("reading", reading)?));
        }
        if let Some(finished) = present(&self.finished) {
            return Ok(BookFilter::Finished(parse_flag("finished", finished)?));
        }
        Ok(BookFilter::All)
    }
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Name(needle) => book.name.to_lowercase().contains(needle.as_str()),
            BookFilter::Reading(reading) => book.is_reading() == *reading,
            BookFilter::Finished(finished) => book.finished == *finished,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_flag(param: &str, value: &str) -> AppResult<bool> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "Gagal menampilkan buku. Nilai filter {} harus 0 atau 1",
            param
        ))),
    }
}
