//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPayload, BookQuery, BookShort},
    repository::Repository,
};

pub const BOOK_NOT_FOUND: &str = "Buku tidak ditemukan";
pub const UPDATE_ID_NOT_FOUND: &str = "Gagal memperbarui buku. Id tidak ditemukan";
pub const DELETE_ID_NOT_FOUND: &str = "Buku gagal dihapus. Id tidak ditemukan";

/// Which mutation a payload is checked for; selects the failure wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Update,
}

impl Mutation {
    fn missing_name(self) -> &'static str {
        match self {
            Mutation::Create => "Gagal menambahkan buku. Mohon isi nama buku",
            Mutation::Update => "Gagal memperbarui buku. Mohon isi nama buku",
        }
    }

    fn read_page_overflow(self) -> &'static str {
        match self {
            Mutation::Create => {
                "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
            }
            Mutation::Update => {
                "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
            }
        }
    }
}

/// Name is checked before page progress.
fn check_payload(payload: &BookPayload, mutation: Mutation) -> AppResult<()> {
    let Err(errors) = payload.validate() else {
        return Ok(());
    };

    let message = if errors.field_errors().contains_key("name") {
        mutation.missing_name()
    } else {
        mutation.read_page_overflow()
    };
    tracing::debug!("Rejected {:?} payload: {}", mutation, errors);
    Err(AppError::Validation(message.to_string()))
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate and store a new book
    pub async fn create_book(&self, payload: BookPayload) -> AppResult<Book> {
        check_payload(&payload, Mutation::Create)?;

        let book = self.repository.books.create(payload).await;
        tracing::info!("Book created id={} name={:?}", book.id, book.name);
        Ok(book)
    }

    /// List books matching the query, projected to id/name/publisher
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookShort>> {
        let filter = query.filter()?;
        Ok(self.repository.books.list(&filter).await)
    }

    /// Get a book by ID with full details
    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    /// Replace an existing book's fields, keeping its id and insertion time
    pub async fn update_book(&self, id: &str, payload: BookPayload) -> AppResult<Book> {
        // Check if book exists
        self.get_book(id).await?;
        check_payload(&payload, Mutation::Update)?;

        self.replace_book(id, payload).await
    }

    /// Locate-and-replace step of an update. The book may have been
    /// deleted since the existence check.
    pub(crate) async fn replace_book(&self, id: &str, payload: BookPayload) -> AppResult<Book> {
        let updated = self
            .repository
            .books
            .update(id, payload)
            .await
            .ok_or_else(|| AppError::NotFound(UPDATE_ID_NOT_FOUND.to_string()))?;

        tracing::info!("Book updated id={}", updated.id);
        Ok(updated)
    }

    /// Delete a book
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        match self.repository.books.delete(id).await {
            Some(book) => {
                tracing::info!("Book deleted id={}", book.id);
                Ok(())
            }
            None => Err(AppError::NotFound(DELETE_ID_NOT_FOUND.to_string())),
        }
    }

    /// Number of stored books
    pub async fn count(&self) -> usize {
        self.repository.books.count().await
    }
}
