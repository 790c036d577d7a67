use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Per-user quota ledger row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    pub user_id: String,
    pub used_storage: i64,
    pub total_files: i64,
}

impl StorageAccount {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            used_storage: 0,
            total_files: 0,
        }
    }

    /// Applies a signed byte delta. The file count moves by the sign of the
    /// delta and neither counter drops below zero.
    pub fn apply_delta(&mut self, delta: i64) {
        self.used_storage = (self.used_storage + delta).max(0);
        self.total_files = (self.total_files + delta.signum()).max(0);
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStorageRequest {
    /// Signed byte delta: positive for an added object, negative for a removed one.
    pub size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StorageListResponse {
    pub storage: Vec<StorageAccount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StorageUpdateResponse {
    pub message: String,
    pub storage: StorageAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeUsage {
    pub kind: String,
    pub count: u64,
    pub bytes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageSummary {
    pub used_storage: i64,
    pub total_files: i64,
    pub limit_bytes: i64,
    pub remaining_bytes: i64,
    pub usage_percent: f64,
    pub used_display: String,
    pub limit_display: String,
    pub by_type: Vec<TypeUsage>,
}
