/*
 * Responsibility
 * - POST /users: sign-up (DTO validation → AccountRegistrar)
 * - GET /users/me: access filter が付与した AuthCtx を返す
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::users::{MeResponse, SignUpRequest, SignUpResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let user_id = state.registrar.create_account(req.into_draft()).await?;

    Ok((StatusCode::CREATED, Json(SignUpResponse { user_id })))
}

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: ctx.user_id,
        auth_provider: ctx.auth_provider,
    })
}
