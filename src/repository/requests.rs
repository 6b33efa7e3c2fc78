//! Borrow request ledger: submission checks, decision transactions, projections.
//!
//! This module exclusively owns `borrow_requests.status` and
//! `books.available_copies`. Approve, reject, and return run as single
//! transactions with `FOR UPDATE` row locks so concurrent decisions on the
//! same request or the same book serialize instead of double-spending copies.

use chrono::{Duration, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    config::BorrowingConfig,
    error::{AppError, AppResult},
    models::{
        book::BookShort,
        log::LogAction,
        request::{BorrowRequest, RequestDetails, RequestStatus, RequestSummary},
        user::UserShort,
    },
};

/// Default librarian note recorded when approving without an explicit one.
const DEFAULT_APPROVAL_NOTE: &str = "Request approved by librarian";

/// Name of the partial unique index stopping duplicate pending submissions.
const PENDING_UNIQUE_CONSTRAINT: &str = "uq_borrow_requests_pending";

// --- Pure policy checks ---
// Evaluated in precondition order; the first failing rule wins.

/// Submission-time rules: active-request cap, duplicate prevention, availability.
fn check_submission(
    active_count: i64,
    has_pending_duplicate: bool,
    available_copies: i32,
    policy: &BorrowingConfig,
) -> AppResult<()> {
    if active_count >= policy.max_active_requests {
        return Err(AppError::BorrowLimitExceeded {
            current: active_count,
            limit: policy.max_active_requests,
        });
    }
    if has_pending_duplicate {
        return Err(AppError::DuplicateRequest);
    }
    if available_copies <= 0 {
        return Err(AppError::BookUnavailable {
            available: available_copies,
        });
    }
    Ok(())
}

/// A decision is only possible while the request is still pending.
fn check_decision(status: RequestStatus) -> AppResult<()> {
    if status.is_pending() {
        Ok(())
    } else {
        Err(AppError::AlreadyProcessed {
            current_status: status,
        })
    }
}

/// Approval-time rules: availability is re-checked under lock, then the
/// reader's open-loan cap.
fn check_approval(available_copies: i32, open_loans: i64, policy: &BorrowingConfig) -> AppResult<()> {
    if available_copies <= 0 {
        return Err(AppError::BookUnavailable {
            available: available_copies,
        });
    }
    if open_loans >= policy.max_open_loans {
        return Err(AppError::BorrowLimitExceeded {
            current: open_loans,
            limit: policy.max_open_loans,
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Submit a new borrow request for a reader.
    ///
    /// No inventory change happens here; copies are only decremented at
    /// approval time. The duplicate check is re-enforced by a partial unique
    /// index, so a concurrent duplicate submission fails on insert instead of
    /// slipping past the read.
    pub async fn submit(
        &self,
        user_id: i32,
        book_id: i32,
        requested_days: i32,
        policy: &BorrowingConfig,
    ) -> AppResult<BorrowRequest> {
        let available: i32 =
            sqlx::query_scalar("SELECT available_copies FROM books WHERE id = $1")
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_requests WHERE user_id = $1 AND status IN ('pending', 'approved')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let has_pending_duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE user_id = $1 AND book_id = $2 AND status = 'pending')",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        check_submission(active_count, has_pending_duplicate, available, policy)?;

        sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (user_id, book_id, status, requested_days, created_at)
            VALUES ($1, $2, 'pending', $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(requested_days)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.constraint() == Some(PENDING_UNIQUE_CONSTRAINT) {
                    return AppError::DuplicateRequest;
                }
            }
            AppError::Database(e)
        })
    }

    /// Approve a pending request.
    ///
    /// Atomic effect: status transition, due-date assignment, inventory
    /// decrement, and the `borrowed` log entry all commit together or not at
    /// all.
    pub async fn approve(
        &self,
        request_id: i32,
        librarian_id: i32,
        notes: Option<String>,
        policy: &BorrowingConfig,
    ) -> AppResult<BorrowRequest> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", request_id)))?;

        check_decision(request.status)?;

        // Lock the book row: concurrent approvals serialize on availability
        let available: i32 =
            sqlx::query_scalar("SELECT available_copies FROM books WHERE id = $1 FOR UPDATE")
                .bind(request.book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Book with id {} not found", request.book_id))
                })?;

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_requests WHERE user_id = $1 AND status = 'approved'",
        )
        .bind(request.user_id)
        .fetch_one(&mut *tx)
        .await?;

        check_approval(available, open_loans, policy)?;

        let due_date = now + Duration::days(policy.loan_period_days);
        let notes = notes.filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APPROVAL_NOTE.to_string());

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'approved', approved_by = $1, decided_at = $2, due_date = $3, notes = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(librarian_id)
        .bind(now)
        .bind(due_date)
        .bind(&notes)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        // Availability guard repeated in the WHERE clause; the CHECK
        // constraint stays authoritative even if the lock is bypassed.
        let affected = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1, updated_at = $2 WHERE id = $1 AND available_copies > 0",
        )
        .bind(request.book_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::BookUnavailable { available: 0 });
        }

        sqlx::query(
            r#"
            INSERT INTO book_logs (action, book_id, user_id, librarian_id, borrow_request_id, notes, action_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(LogAction::Borrowed)
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(librarian_id)
        .bind(request_id)
        .bind("Book approved and borrowed")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Reject a pending request. Inventory is untouched.
    pub async fn reject(
        &self,
        request_id: i32,
        librarian_id: i32,
        reason: &str,
    ) -> AppResult<BorrowRequest> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", request_id)))?;

        check_decision(request.status)?;

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'rejected', rejected_by = $1, decided_at = $2, notes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(librarian_id)
        .bind(now)
        .bind(reason)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO book_logs (action, book_id, user_id, librarian_id, borrow_request_id, notes, action_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(LogAction::RequestRejected)
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(librarian_id)
        .bind(request_id)
        .bind(format!("Request rejected: {}", reason))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Record the return of an approved loan, restoring one copy.
    pub async fn mark_returned(&self, request_id: i32, librarian_id: i32) -> AppResult<BorrowRequest> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", request_id)))?;

        match request.status {
            RequestStatus::Approved => {}
            RequestStatus::Returned => {
                return Err(AppError::AlreadyProcessed {
                    current_status: RequestStatus::Returned,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "Only approved requests can be returned (current status: {})",
                    other
                )))
            }
        }

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'returned', returned_at = $1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        // Restore one copy; never above total_copies
        sqlx::query(
            r#"
            UPDATE books
            SET available_copies = LEAST(total_copies, available_copies + 1), updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(request.book_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO book_logs (action, book_id, user_id, librarian_id, borrow_request_id, notes, action_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(LogAction::Returned)
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(librarian_id)
        .bind(request_id)
        .bind("Book returned")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Pending requests joined with book and reader, oldest first (FIFO review)
    pub async fn list_pending(&self) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(&details_query("WHERE r.status = 'pending'", "ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// All requests joined with book and reader, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(&details_query("", "DESC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// One reader's requests, most recent first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(&details_query("WHERE r.user_id = $1", "DESC"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Request counts per status
    pub async fn count_by_status(&self) -> AppResult<RequestSummary> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM borrow_requests GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut summary = RequestSummary::default();
        for row in rows {
            let status: RequestStatus = row.get("status");
            let count: i64 = row.get("count");
            summary.total += count;
            match status {
                RequestStatus::Pending => summary.pending = count,
                RequestStatus::Approved => summary.approved = count,
                RequestStatus::Rejected => summary.rejected = count,
                RequestStatus::Returned => summary.returned = count,
            }
        }

        Ok(summary)
    }
}

fn details_query(where_clause: &str, order: &str) -> String {
    format!(
        r#"
        SELECT r.id, r.status, r.created_at, r.decided_at, r.due_date, r.returned_at, r.notes,
               u.id as user_id, u.name as user_name, u.email as user_email,
               b.id as book_id, b.title as book_title, b.author as book_author,
               b.isbn as book_isbn, b.available_copies as book_available
        FROM borrow_requests r
        JOIN users u ON r.user_id = u.id
        JOIN books b ON r.book_id = b.id
        {}
        ORDER BY r.created_at {}
        "#,
        where_clause, order
    )
}

fn details_from_row(row: &PgRow) -> RequestDetails {
    RequestDetails {
        id: row.get("id"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        decided_at: row.get("decided_at"),
        due_date: row.get("due_date"),
        returned_at: row.get("returned_at"),
        notes: row.get("notes"),
        user: UserShort {
            id: row.get("user_id"),
            name: row.get("user_name"),
            email: row.get("user_email"),
        },
        book: BookShort {
            id: row.get("book_id"),
            title: row.get("book_title"),
            author: row.get("book_author"),
            isbn: row.get("book_isbn"),
            available_copies: row.get("book_available"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BorrowingConfig {
        BorrowingConfig::default()
    }

    #[test]
    fn submission_rejected_when_active_limit_reached() {
        // Scenario C: three active requests, the fourth is refused
        let err = check_submission(3, false, 5, &policy()).unwrap_err();
        assert!(matches!(
            err,
            AppError::BorrowLimitExceeded { current: 3, limit: 3 }
        ));
    }

    #[test]
    fn submission_rejected_on_pending_duplicate() {
        // Scenario B: a second request for the same book while one is pending
        let err = check_submission(1, true, 2, &policy()).unwrap_err();
        assert!(matches!(err, AppError::DuplicateRequest));
    }

    #[test]
    fn submission_rejected_when_book_unavailable() {
        // Scenario A: zero available copies
        let err = check_submission(0, false, 0, &policy()).unwrap_err();
        assert!(matches!(err, AppError::BookUnavailable { available: 0 }));
    }

    #[test]
    fn submission_checks_run_in_precondition_order() {
        // All three rules violated at once: the limit fires first,
        // then the duplicate, then availability
        let err = check_submission(3, true, 0, &policy()).unwrap_err();
        assert!(matches!(err, AppError::BorrowLimitExceeded { .. }));

        let err = check_submission(0, true, 0, &policy()).unwrap_err();
        assert!(matches!(err, AppError::DuplicateRequest));
    }

    #[test]
    fn submission_accepted_within_limits() {
        assert!(check_submission(2, false, 1, &policy()).is_ok());
    }

    #[test]
    fn decision_requires_pending_status() {
        assert!(check_decision(RequestStatus::Pending).is_ok());

        for status in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            let err = check_decision(status).unwrap_err();
            match err {
                AppError::AlreadyProcessed { current_status } => {
                    assert_eq!(current_status, status)
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn approval_rechecks_availability() {
        let err = check_approval(0, 0, &policy()).unwrap_err();
        assert!(matches!(err, AppError::BookUnavailable { available: 0 }));
    }

    #[test]
    fn approval_enforces_open_loan_cap() {
        // Five not-yet-returned loans: the librarian-side cap refuses a sixth
        let err = check_approval(2, 5, &policy()).unwrap_err();
        assert!(matches!(
            err,
            AppError::BorrowLimitExceeded { current: 5, limit: 5 }
        ));
        assert!(check_approval(2, 4, &policy()).is_ok());
    }

    #[test]
    fn approval_checks_availability_before_loan_cap() {
        let err = check_approval(0, 5, &policy()).unwrap_err();
        assert!(matches!(err, AppError::BookUnavailable { .. }));
    }
}
