//! Book logs repository (read side of the append-only audit trail).
//!
//! Log rows are written inside the ledger transactions in
//! [`super::requests`]; this repository only reads them.

use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::log::{LogAction, LogDetails, LogQuery},
};

#[derive(Clone)]
pub struct LogsRepository {
    pool: Pool<Postgres>,
}

impl LogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Filtered log listing joined with book and user names, newest first
    pub async fn search(&self, query: &LogQuery) -> AppResult<(Vec<LogDetails>, i64)> {
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1) * per_page;
        let action = query.action.map(|a| a.as_str());

        let filter = r#"
            ($1::int IS NULL OR l.book_id = $1)
            AND ($2::int IS NULL OR l.user_id = $2)
            AND ($3::text IS NULL OR l.action = $3)
        "#;

        let rows = sqlx::query(&format!(
            r#"
            SELECT l.id, l.action, l.book_id, l.user_id, l.librarian_id,
                   l.borrow_request_id, l.notes, l.action_date,
                   b.title as book_title, u.name as user_name, lib.name as librarian_name
            FROM book_logs l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            LEFT JOIN users lib ON l.librarian_id = lib.id
            WHERE {}
            ORDER BY l.action_date DESC
            LIMIT $4 OFFSET $5
            "#,
            filter
        ))
        .bind(query.book_id)
        .bind(query.user_id)
        .bind(action)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM book_logs l WHERE {}",
            filter
        ))
        .bind(query.book_id)
        .bind(query.user_id)
        .bind(action)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.iter().map(details_from_row).collect(), total))
    }

    /// Log entry counts per action kind
    pub async fn count_by_action(&self) -> AppResult<Vec<(LogAction, i64)>> {
        let rows = sqlx::query("SELECT action, COUNT(*) as count FROM book_logs GROUP BY action")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<LogAction, _>("action"), row.get::<i64, _>("count")))
            .collect())
    }
}

fn details_from_row(row: &PgRow) -> LogDetails {
    LogDetails {
        id: row.get("id"),
        action: row.get("action"),
        book_id: row.get("book_id"),
        book_title: row.get("book_title"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        librarian_name: row.get("librarian_name"),
        borrow_request_id: row.get("borrow_request_id"),
        notes: row.get("notes"),
        action_date: row.get("action_date"),
    }
}
