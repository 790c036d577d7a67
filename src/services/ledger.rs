use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    database::{queries::StorageQueries, Database},
    errors::{AppError, Result},
    models::StorageAccount,
};

/// Outcome of handling an account-created event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// Durable per-user storage counters.
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    async fn get_account(&self, user_id: &str) -> Result<StorageAccount>;

    /// Atomically adds `delta` bytes and moves the file count by its sign.
    async fn apply_delta(&self, user_id: &str, delta: i64) -> Result<StorageAccount>;

    /// Moves the file count without touching the byte total.
    async fn adjust_file_count(&self, user_id: &str, delta: i64) -> Result<StorageAccount>;

    /// Creates a zeroed row. Re-delivery for an existing user is a no-op.
    async fn provision(&self, user_id: &str) -> Result<Provisioned>;

    /// Overwrites both counters with values recomputed from the object store.
    async fn reconcile(
        &self,
        user_id: &str,
        used_storage: i64,
        total_files: i64,
    ) -> Result<StorageAccount>;

    async fn ping(&self) -> Result<()>;
}

pub fn validate_delta(delta: i64) -> Result<()> {
    if delta == 0 {
        return Err(AppError::Validation("Size cannot be 0".to_string()));
    }
    Ok(())
}

fn account_not_found(user_id: &str) -> AppError {
    AppError::NotFound(format!("Storage account not found for user {}", user_id))
}

pub struct PgQuotaLedger {
    database: Database,
}

impl PgQuotaLedger {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl QuotaLedger for PgQuotaLedger {
    async fn get_account(&self, user_id: &str) -> Result<StorageAccount> {
        StorageQueries::find_by_user(self.database.pool(), user_id)
            .await?
            .ok_or_else(|| account_not_found(user_id))
    }

    async fn apply_delta(&self, user_id: &str, delta: i64) -> Result<StorageAccount> {
        validate_delta(delta)?;

        let account = StorageQueries::apply_delta(self.database.pool(), user_id, delta)
            .await?
            .ok_or_else(|| account_not_found(user_id))?;

        tracing::debug!(
            user_id,
            delta,
            used_storage = account.used_storage,
            total_files = account.total_files,
            "Applied storage delta"
        );

        Ok(account)
    }

    async fn adjust_file_count(&self, user_id: &str, delta: i64) -> Result<StorageAccount> {
        StorageQueries::adjust_file_count(self.database.pool(), user_id, delta)
            .await?
            .ok_or_else(|| account_not_found(user_id))
    }

    async fn provision(&self, user_id: &str) -> Result<Provisioned> {
        if StorageQueries::insert_account(self.database.pool(), user_id).await? {
            Ok(Provisioned::Created)
        } else {
            Ok(Provisioned::AlreadyExists)
        }
    }

    async fn reconcile(
        &self,
        user_id: &str,
        used_storage: i64,
        total_files: i64,
    ) -> Result<StorageAccount> {
        StorageQueries::overwrite_counters(self.database.pool(), user_id, used_storage, total_files)
            .await?
            .ok_or_else(|| account_not_found(user_id))
    }

    async fn ping(&self) -> Result<()> {
        StorageQueries::ping(self.database.pool()).await
    }
}

/// Process-local ledger for tests and single-node development.
#[derive(Default)]
pub struct MemoryQuotaLedger {
    accounts: RwLock<HashMap<String, StorageAccount>>,
}

impl MemoryQuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotaLedger for MemoryQuotaLedger {
    async fn get_account(&self, user_id: &str) -> Result<StorageAccount> {
        self.accounts
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| account_not_found(user_id))
    }

    async fn apply_delta(&self, user_id: &str, delta: i64) -> Result<StorageAccount> {
        validate_delta(delta)?;

        // Read and write happen under one write guard.
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| account_not_found(user_id))?;
        account.apply_delta(delta);

        Ok(account.clone())
    }

    async fn adjust_file_count(&self, user_id: &str, delta: i64) -> Result<StorageAccount> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| account_not_found(user_id))?;
        account.total_files = (account.total_files + delta).max(0);

        Ok(account.clone())
    }

    async fn provision(&self, user_id: &str) -> Result<Provisioned> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(user_id) {
            return Ok(Provisioned::AlreadyExists);
        }
        accounts.insert(user_id.to_string(), StorageAccount::new(user_id));
        Ok(Provisioned::Created)
    }

    async fn reconcile(
        &self,
        user_id: &str,
        used_storage: i64,
        total_files: i64,
    ) -> Result<StorageAccount> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| account_not_found(user_id))?;
        account.used_storage = used_storage.max(0);
        account.total_files = total_files.max(0);

        Ok(account.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
