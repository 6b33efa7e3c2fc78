//! Statistics service

use sqlx::Row;

use crate::{
    api::stats::{BookStats, StatEntry, StatsResponse, UserStats},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Aggregate library statistics for the admin dashboard
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as titles,
                   COALESCE(SUM(total_copies), 0)::bigint as total_copies,
                   COALESCE(SUM(available_copies), 0)::bigint as available_copies
            FROM books
            "#,
        )
        .fetch_one(pool)
        .await?;

        let titles: i64 = row.get("titles");
        let total_copies: i64 = row.get("total_copies");
        let available_copies: i64 = row.get("available_copies");

        let users_by_role = self
            .repository
            .users
            .count_by_role()
            .await?
            .into_iter()
            .map(|(role, count)| StatEntry {
                label: role.to_string(),
                value: count,
            })
            .collect::<Vec<_>>();

        let users_total: i64 = users_by_role.iter().map(|e| e.value).sum();

        let requests = self.repository.requests.count_by_status().await?;

        let logs_by_action = self
            .repository
            .logs
            .count_by_action()
            .await?
            .into_iter()
            .map(|(action, count)| StatEntry {
                label: action.to_string(),
                value: count,
            })
            .collect();

        Ok(StatsResponse {
            books: BookStats {
                titles,
                total_copies,
                available_copies,
                borrowed_copies: total_copies - available_copies,
            },
            users: UserStats {
                total: users_total,
                by_role: users_by_role,
            },
            requests,
            logs_by_action,
        })
    }
}
