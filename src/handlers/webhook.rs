use axum::{extract::State, response::Json};

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    models::{IdentityEvent, MessageResponse},
    services::Provisioned,
    storage::validate_file_name,
};

/// Receives account events from the identity provider and provisions a
/// zeroed ledger row for each new user.
#[utoipa::path(
    post,
    path = "/api/webhook/clerk",
    request_body = IdentityEvent,
    responses(
        (status = 200, description = "Event handled", body = MessageResponse),
        (status = 401, description = "Event carried no user id"),
        (status = 500, description = "Ledger failure")
    ),
    tag = "webhook"
)]
pub async fn identity_webhook(
    State(state): State<AppState>,
    Json(event): Json<IdentityEvent>,
) -> Result<Json<MessageResponse>> {
    // Ids that cannot name a storage folder would never pass authentication.
    let user_id = event
        .user_id()
        .filter(|id| validate_file_name(id).is_ok())
        .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

    if !event.is_user_created() {
        tracing::debug!(user_id, event_type = ?event.event_type, "Ignoring identity event");
        return Ok(Json(MessageResponse {
            message: "Event ignored".to_string(),
        }));
    }

    let provisioned = state.ledger.provision(user_id).await.map_err(|e| {
        tracing::error!(user_id, "Failed to provision storage account: {}", e);
        AppError::Internal(anyhow::anyhow!("Failed to provision storage account"))
    })?;

    let message = match provisioned {
        Provisioned::Created => {
            tracing::info!(user_id, "Provisioned storage account");
            "User created"
        }
        Provisioned::AlreadyExists => {
            tracing::info!(user_id, "Storage account already provisioned");
            "User already exists"
        }
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
