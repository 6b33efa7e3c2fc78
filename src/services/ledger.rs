//! Borrow-request ledger service.
//!
//! Thin orchestration over the transactional repository: resolves policy
//! defaults, verifies referenced rows, and exposes the read projections.

use crate::{
    config::BorrowingConfig,
    error::AppResult,
    models::{
        book::{InventoryEntry, InventorySummary},
        log::{LogDetails, LogQuery},
        request::{BorrowRequest, RequestDetails, RequestSummary},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    policy: BorrowingConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, policy: BorrowingConfig) -> Self {
        Self { repository, policy }
    }

    /// Submit a borrow request for a reader
    pub async fn submit_request(
        &self,
        user_id: i32,
        book_id: i32,
        requested_days: Option<i32>,
    ) -> AppResult<BorrowRequest> {
        let days = requested_days.unwrap_or(self.policy.default_request_days);
        let request = self
            .repository
            .requests
            .submit(user_id, book_id, days, &self.policy)
            .await?;

        tracing::info!(
            request_id = request.id,
            user_id,
            book_id,
            "Borrow request submitted"
        );

        Ok(request)
    }

    /// Approve a pending request (librarian decision)
    pub async fn approve(
        &self,
        request_id: i32,
        librarian_id: i32,
        notes: Option<String>,
    ) -> AppResult<BorrowRequest> {
        let request = self
            .repository
            .requests
            .approve(request_id, librarian_id, notes, &self.policy)
            .await?;

        tracing::info!(request_id, librarian_id, "Borrow request approved");

        Ok(request)
    }

    /// Reject a pending request (librarian decision)
    pub async fn reject(
        &self,
        request_id: i32,
        librarian_id: i32,
        reason: &str,
    ) -> AppResult<BorrowRequest> {
        let request = self
            .repository
            .requests
            .reject(request_id, librarian_id, reason)
            .await?;

        tracing::info!(request_id, librarian_id, "Borrow request rejected");

        Ok(request)
    }

    /// Record a return, restoring one copy to the shelf
    pub async fn mark_returned(&self, request_id: i32, librarian_id: i32) -> AppResult<BorrowRequest> {
        let request = self
            .repository
            .requests
            .mark_returned(request_id, librarian_id)
            .await?;

        tracing::info!(request_id, librarian_id, "Borrowed book returned");

        Ok(request)
    }

    /// Pending requests, oldest first
    pub async fn list_pending(&self) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_pending().await
    }

    /// All requests with status summary, most recent first
    pub async fn list_all(&self) -> AppResult<(Vec<RequestDetails>, RequestSummary)> {
        let requests = self.repository.requests.list_all().await?;
        let summary = self.repository.requests.count_by_status().await?;
        Ok((requests, summary))
    }

    /// One reader's requests, most recent first
    pub async fn list_for_reader(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_for_user(user_id).await
    }

    /// Browse the audit log
    pub async fn list_logs(&self, query: &LogQuery) -> AppResult<(Vec<LogDetails>, i64)> {
        self.repository.logs.search(query).await
    }

    /// Current inventory with aggregate summary
    pub async fn inventory(&self) -> AppResult<(InventorySummary, Vec<InventoryEntry>)> {
        let entries = self.repository.books.inventory().await?;

        let mut summary = InventorySummary {
            total_books: entries.len() as i64,
            available_books: 0,
            out_of_stock_books: 0,
            total_copies: 0,
            available_copies: 0,
            borrowed_copies: 0,
        };
        for entry in &entries {
            if entry.available_copies > 0 {
                summary.available_books += 1;
            } else {
                summary.out_of_stock_books += 1;
            }
            summary.total_copies += entry.total_copies as i64;
            summary.available_copies += entry.available_copies as i64;
            summary.borrowed_copies += entry.borrowed_copies as i64;
        }

        Ok((summary, entries))
    }
}
