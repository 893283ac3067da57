//! In-memory book storage.
//!
//! `BookStore` is the plain ordered collection; `BooksRepository` owns it
//! behind an `RwLock` and is the only handle the services see. Each call
//! takes the lock once, so a single locate+mutate step is atomic, but two
//! separate calls are not: concurrent updates to one id are last-write-wins.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;

use crate::models::book::{Book, BookFilter, BookPayload, BookShort};

/// Length of generated book identifiers
pub const BOOK_ID_LEN: usize = 16;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Random URL-safe identifier of `BOOK_ID_LEN` characters
pub fn generate_book_id() -> String {
    let mut rng = rand::thread_rng();
    (0..BOOK_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Ordered collection of books, in insertion order
#[derive(Debug, Default)]
pub struct BookStore {
    books: Vec<Book>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end. The caller guarantees the id is unused.
    pub fn append(&mut self, book: Book) {
        self.books.push(book);
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    /// Overwrite the record at `index`, returning the previous one
    pub fn replace_at(&mut self, index: usize, book: Book) -> Option<Book> {
        self.books
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, book))
    }

    /// Remove the record at `index`; remaining records keep their relative order
    pub fn remove_at(&mut self, index: usize) -> Option<Book> {
        if index < self.books.len() {
            Some(self.books.remove(index))
        } else {
            None
        }
    }

    pub fn all(&self) -> &[Book] {
        &self.books
    }

    pub(crate) fn len(&self) -> usize {
        self.books.len()
    }
}

#[derive(Clone, Default)]
pub struct BooksRepository {
    store: Arc<RwLock<BookStore>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new book built from an already validated payload.
    /// The id is generated under the write lock and redrawn on collision.
    pub async fn create(&self, payload: BookPayload) -> Book {
        let mut store = self.store.write().await;

        let mut id = generate_book_id();
        while store.find_by_id(&id).is_some() {
            id = generate_book_id();
        }

        let book = Book::new(id, payload, Utc::now());
        store.append(book.clone());
        book
    }

    /// Snapshot of the books matching `filter`, projected for listing
    pub async fn list(&self, filter: &BookFilter) -> Vec<BookShort> {
        let store = self.store.read().await;
        store
            .all()
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookShort::from)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Book> {
        self.store.read().await.find_by_id(id).cloned()
    }

    /// Replace the book with `id`, keeping its id and insertion time.
    /// Returns `None` when the id is no longer present.
    pub async fn update(&self, id: &str, payload: BookPayload) -> Option<Book> {
        let mut store = self.store.write().await;
        let index = store.index_of(id)?;
        let updated = store.all()[index].replaced_with(payload, Utc::now());
        store.replace_at(index, updated.clone());
        Some(updated)
    }

    /// Remove the book with `id`, returning it if it existed
    pub async fn delete(&self, id: &str) -> Option<Book> {
        let mut store = self.store.write().await;
        let index = store.index_of(id)?;
        store.remove_at(index)
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }
}
