//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload, BookQuery, BookShort},
};

use super::{ApiResponse, JsonBody, QueryParams};

/// `data` of a successful create
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookIdData {
    pub book_id: String,
}

/// `data` of a successful list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BooksData {
    pub books: Vec<BookShort>,
}

/// `data` of a successful get
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created, data carries the new id", body = BookIdData),
        (status = 400, description = "Missing name, readPage greater than pageCount, or malformed body")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, ApiResponse<BookIdData>)> {
    let book = state.services.books.create_book(payload).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(BookIdData { book_id: book.id })
            .with_message("Buku berhasil ditambahkan"),
    ))
}

/// List books, optionally filtered by name, reading or finished
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books as id/name/publisher", body = BooksData),
        (status = 400, description = "reading or finished is not 0 or 1")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    QueryParams(query): QueryParams<BookQuery>,
) -> AppResult<ApiResponse<BooksData>> {
    let books = state.services.books.list_books(&query).await?;
    Ok(ApiResponse::success(BooksData { books }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookData),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
) -> AppResult<ApiResponse<BookData>> {
    let book = state.services.books.get_book(&book_id).await?;
    Ok(ApiResponse::success(BookData { book }))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{book_id}",
    tag = "books",
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Missing name, readPage greater than pageCount, or malformed body"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<ApiResponse<()>> {
    state.services.books.update_book(&book_id, payload).await?;
    Ok(ApiResponse::done("Buku berhasil diperbarui"))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.services.books.delete_book(&book_id).await?;
    Ok(ApiResponse::done("Buku berhasil dihapus"))
}
