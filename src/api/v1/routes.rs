/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - access filter は app 側で Router 全体に掛ける。ここでは route だけ
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::users::{me, sign_up};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(sign_up))
        .route("/users/me", get(me))
}
