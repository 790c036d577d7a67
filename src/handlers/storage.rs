use axum::{extract::State, response::Json};

use crate::{
    errors::Result,
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{StorageListResponse, StorageSummary, StorageUpdateResponse, UpdateStorageRequest},
    services::listing,
    utils::format::format_file_size,
};

/// Returns the caller's ledger row as a one-element collection.
#[utoipa::path(
    get,
    path = "/api/storage",
    responses(
        (status = 200, description = "Caller's storage account", body = StorageListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account was never provisioned")
    ),
    tag = "storage"
)]
pub async fn get_storage(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StorageListResponse>> {
    let account = state.ledger.get_account(&user.id).await?;

    Ok(Json(StorageListResponse {
        storage: vec![account],
    }))
}

/// Applies a signed byte delta to the caller's own ledger row.
#[utoipa::path(
    post,
    path = "/api/storage",
    request_body = UpdateStorageRequest,
    responses(
        (status = 200, description = "Storage updated", body = StorageUpdateResponse),
        (status = 400, description = "Size cannot be 0"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account was never provisioned")
    ),
    tag = "storage"
)]
pub async fn update_storage(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateStorageRequest>,
) -> Result<Json<StorageUpdateResponse>> {
    let account = state.ledger.apply_delta(&user.id, request.size).await?;

    Ok(Json(StorageUpdateResponse {
        message: "Storage updated".to_string(),
        storage: account,
    }))
}

#[utoipa::path(
    get,
    path = "/api/storage/summary",
    responses(
        (status = 200, description = "Usage against the storage limit", body = StorageSummary),
        (status = 401, description = "Unauthorized")
    ),
    tag = "storage"
)]
pub async fn storage_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StorageSummary>> {
    let account = state.ledger.get_account(&user.id).await?;
    let objects = state.files.list_all(&user.id).await?;
    let limit = state.config.storage_limit_bytes;

    Ok(Json(StorageSummary {
        used_storage: account.used_storage,
        total_files: account.total_files,
        limit_bytes: limit,
        remaining_bytes: (limit - account.used_storage).max(0),
        usage_percent: listing::usage_percent(account.used_storage, limit),
        used_display: format_file_size(account.used_storage),
        limit_display: format_file_size(limit),
        by_type: listing::usage_breakdown(&objects),
    }))
}

/// Recomputes the caller's counters from what the object store holds.
#[utoipa::path(
    post,
    path = "/api/storage/reconcile",
    responses(
        (status = 200, description = "Ledger recomputed", body = StorageUpdateResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "storage"
)]
pub async fn reconcile_storage(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StorageUpdateResponse>> {
    let account = state.files.reconcile(&user.id).await?;

    Ok(Json(StorageUpdateResponse {
        message: "Storage reconciled".to_string(),
        storage: account,
    }))
}
