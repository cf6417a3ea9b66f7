//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use quill_shared::dto::{AuthResponse, LoginRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::users::user_view;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Unknown email and wrong password are indistinguishable to the caller
    let Some(user) = state.users.find_by_email(&req.email).await? else {
        return Err(reject_unknown(&state, &req.password));
    };

    let (Some(id), Some(hash)) = (user.id, user.password_hash.as_deref()) else {
        return Err(reject_unknown(&state, &req.password));
    };

    let valid = state
        .passwords
        .verify(&req.password, hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(user_id = id, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    let token = state
        .tokens
        .generate_token(
            id,
            user.user_identifier(),
            user.effective_roles().into_iter().collect(),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = id, "User logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}

/// Spend one hashing round on a login miss so it costs as much as a real
/// verification.
fn reject_unknown(state: &AppState, password: &str) -> AppError {
    if let Err(e) = state.passwords.hash(password) {
        tracing::warn!(error = %e, "Hashing failed on login miss");
    }
    AppError::Unauthorized
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", identity.user_id)))?;

    Ok(HttpResponse::Ok().json(user_view(&user)?))
}
