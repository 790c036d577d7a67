use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{errors::AppError, handlers::AppState, storage::validate_file_name};

/// Caller identity taken from the identity provider's session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

        let claims = state.jwt.verify_session_token(token)?;

        // The id doubles as the caller's folder name in the object store.
        if validate_file_name(&claims.sub).is_err() {
            return Err(AppError::Auth("Unauthorized".to_string()));
        }

        Ok(AuthenticatedUser { id: claims.sub })
    }
}
