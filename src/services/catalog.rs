//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }

        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book (refused while active requests reference it)
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
