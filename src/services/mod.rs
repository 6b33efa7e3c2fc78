//! Business logic services

pub mod auth;
pub mod catalog;
pub mod ledger;
pub mod stats;

use crate::{
    config::{AuthConfig, BorrowingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        borrowing_config: BorrowingConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), borrowing_config),
            stats: stats::StatsService::new(repository),
        }
    }
}
