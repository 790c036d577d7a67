use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tokio_util::io::ReaderStream;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        DeleteResponse, DownloadQuery, FileListResponse, ListFilesQuery, RecentFilesQuery,
        RecentFilesResponse, RenameRequest, RenameResponse, SignedUrlResponse, SortKey,
        UploadResponse,
    },
    services::listing,
};

/// Lists the caller's files, optionally filtered by name and sorted.
#[utoipa::path(
    get,
    path = "/api/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Matching files", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<FileListResponse>> {
    let objects = state.files.list(&user.id).await?;

    let mut files = listing::filter_by_name(objects, query.q.as_deref().unwrap_or(""));
    listing::sort_objects(&mut files, query.sort.unwrap_or_default());

    Ok(Json(FileListResponse {
        total: files.len(),
        files,
    }))
}

/// Most recent uploads grouped by calendar day in the caller's time zone.
#[utoipa::path(
    get,
    path = "/api/recent",
    params(RecentFilesQuery),
    responses(
        (status = 200, description = "Recent files by day", body = RecentFilesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "files"
)]
pub async fn recent_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RecentFilesQuery>,
) -> Result<Json<RecentFilesResponse>> {
    let mut objects = state.files.list(&user.id).await?;
    listing::sort_objects(&mut objects, SortKey::Date);
    objects.truncate(state.config.recent_limit);

    let total = objects.len();
    let groups = listing::group_by_day(objects, &listing::caller_now(query.tz_offset_minutes));

    Ok(Json(RecentFilesResponse {
        today: groups.today,
        yesterday: groups.yesterday,
        older: groups.older,
        total,
    }))
}

/// Uploads one or more files from the `file` fields of a multipart form.
#[utoipa::path(
    post,
    path = "/api/files",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Files stored and counted", body = UploadResponse),
        (status = 400, description = "Missing or empty file"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A file with that name already exists"),
        (status = 413, description = "File too large")
    ),
    tag = "files"
)]
pub async fn upload_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    // Read and size-check the whole form before anything is written.
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(format!("Failed to parse multipart data: {}", e))
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("File name is required".to_string()))?;

        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                AppError::Validation(format!("Failed to read file data: {}", e))
            }
        })?;

        if data.len() > state.config.max_file_size {
            return Err(AppError::PayloadTooLarge);
        }

        files.push((file_name, data));
    }

    let (uploaded, account) = state.files.upload_all(&user.id, &files[..]).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            files: uploaded,
            storage: account,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/files/{name}",
    params(("name" = String, Path, description = "File name")),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let account = state.files.delete(&user.id, &name).await?;

    Ok(Json(DeleteResponse {
        message: "File deleted".to_string(),
        storage: account,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/files/{name}",
    params(("name" = String, Path, description = "Current file name")),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "File renamed", body = RenameResponse),
        (status = 400, description = "Invalid file name"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 409, description = "Target name already exists")
    ),
    tag = "files"
)]
pub async fn rename_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(name): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<RenameResponse>> {
    let file = state.files.rename(&user.id, &name, &request.new_name).await?;

    Ok(Json(RenameResponse {
        message: "File renamed".to_string(),
        file,
    }))
}

/// Issues a short-lived link for previewing or downloading a file.
#[utoipa::path(
    get,
    path = "/api/files/{name}/url",
    params(("name" = String, Path, description = "File name")),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn signed_url(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<Json<SignedUrlResponse>> {
    let url = state.files.signed_url(&user.id, &name).await?;

    Ok(Json(SignedUrlResponse {
        url,
        expires_in: state.signer.ttl_secs(),
    }))
}

/// Streams an object named by a signed download token.
#[utoipa::path(
    get,
    path = "/api/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File contents"),
        (status = 401, description = "Invalid or expired link"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let path = state.signer.verify(&query.token)?;
    let meta = state.objects.stat(&path).await?;
    let reader = state.objects.open(&path).await?;

    let disposition = format!("inline; filename=\"{}\"", meta.name.replace('"', "'"));
    let headers = [
        (header::CONTENT_TYPE, meta.content_type),
        (header::CONTENT_LENGTH, meta.size.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(reader))).into_response())
}
