//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookStatus, CreateBook, InventoryEntry, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with filters and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1) * per_page;
        let status = query.status.map(|s| s.as_str());

        let filter = r#"
            ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
            AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
            AND ($3::text IS NULL OR genre ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL
                 OR ($4 = 'available' AND available_copies > 0)
                 OR ($4 = 'out_of_stock' AND available_copies = 0))
        "#;

        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT * FROM books WHERE {} ORDER BY title LIMIT $5 OFFSET $6",
            filter
        ))
        .bind(&query.title)
        .bind(&query.author)
        .bind(&query.genre)
        .bind(status)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books WHERE {}", filter))
            .bind(&query.title)
            .bind(&query.author)
            .bind(&query.genre)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Check if another book already carries this ISBN
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publisher, published_year, genre,
                               cover_image_url, pages, summary, total_copies, available_copies,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.published_year)
        .bind(&book.genre)
        .bind(&book.cover_image_url)
        .bind(book.pages)
        .bind(&book.summary)
        .bind(book.total_copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing book.
    ///
    /// A change to `total_copies` shifts `available_copies` by the same
    /// delta (outstanding loans are preserved), clamped into the
    /// `0 <= available <= total` invariant.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                author = COALESCE($2, author),
                isbn = COALESCE($3, isbn),
                publisher = COALESCE($4, publisher),
                published_year = COALESCE($5, published_year),
                genre = COALESCE($6, genre),
                cover_image_url = COALESCE($7, cover_image_url),
                pages = COALESCE($8, pages),
                summary = COALESCE($9, summary),
                available_copies = CASE
                    WHEN $10::int IS NULL THEN available_copies
                    ELSE LEAST($10, GREATEST(0, available_copies + ($10 - total_copies)))
                END,
                total_copies = COALESCE($10, total_copies),
                updated_at = $11
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.published_year)
        .bind(&book.genre)
        .bind(&book.cover_image_url)
        .bind(book.pages)
        .bind(&book.summary)
        .bind(book.total_copies)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Delete a book. Refused while active requests reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE book_id = $1 AND status IN ('pending', 'approved'))",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_active {
            return Err(AppError::Conflict(
                "Book has active borrow requests and cannot be deleted".to_string(),
            ));
        }

        let affected = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Full inventory projection, ordered by title
    pub async fn inventory(&self) -> AppResult<Vec<InventoryEntry>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(books
            .into_iter()
            .map(|b| InventoryEntry {
                id: b.id,
                title: b.title,
                author: b.author,
                isbn: b.isbn,
                genre: b.genre,
                publisher: b.publisher,
                total_copies: b.total_copies,
                available_copies: b.available_copies,
                borrowed_copies: b.total_copies - b.available_copies,
                status: BookStatus::from_available(b.available_copies),
            })
            .collect())
    }

    /// Count catalog titles
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
