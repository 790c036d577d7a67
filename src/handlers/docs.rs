use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

use crate::handlers::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::storage::get_storage,
        crate::handlers::storage::update_storage,
        crate::handlers::storage::storage_summary,
        crate::handlers::storage::reconcile_storage,
        crate::handlers::webhook::identity_webhook,
        crate::handlers::files::list_files,
        crate::handlers::files::recent_files,
        crate::handlers::files::upload_files,
        crate::handlers::files::delete_file,
        crate::handlers::files::rename_file,
        crate::handlers::files::signed_url,
        crate::handlers::files::download,
    ),
    components(
        schemas(
            crate::models::StorageAccount,
            crate::models::UpdateStorageRequest,
            crate::models::StorageListResponse,
            crate::models::StorageUpdateResponse,
            crate::models::StorageSummary,
            crate::models::TypeUsage,
            crate::models::IdentityEvent,
            crate::models::IdentityEventData,
            crate::models::MessageResponse,
            crate::models::StoredObject,
            crate::models::SortKey,
            crate::models::RenameRequest,
            crate::models::FileListResponse,
            crate::models::RecentFilesResponse,
            crate::models::SignedUrlResponse,
            crate::models::RenameResponse,
            crate::models::DeleteResponse,
            crate::models::UploadResponse,
        )
    ),
    tags(
        (name = "storage", description = "Per-user storage ledger"),
        (name = "files", description = "File management endpoints"),
        (name = "webhook", description = "Identity provider events")
    ),
    info(
        title = "Cloud Drive API",
        version = "1.0.0",
        description = "Personal cloud storage with a per-user quota ledger"
    )
)]
pub struct ApiDoc;

pub fn create_docs_router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
