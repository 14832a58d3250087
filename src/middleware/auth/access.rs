//! access token 検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` がなければそのまま通す (認可は handler/extractor 側)
//! - 検証に失敗した場合は downstream を呼ばずに JSON error を返す
//! - downstream が呼ばれた後はレスポンスに手を加えない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::authenticator::{self, AuthOutcome};
use crate::state::AppState;

/// Router 全体に access middleware を掛ける。
///
/// 例：
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes());
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    debug!(method = %req.method(), uri = %req.uri(), "access filter start");

    let outcome =
        authenticator::authenticate(req.headers(), &state.tokens, state.accounts.as_ref()).await;

    let res = match outcome {
        Ok(AuthOutcome::Authenticated(auth_ctx)) => {
            debug!(user_id = %auth_ctx.user_id, provider = %auth_ctx.auth_provider, "authenticated");
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(auth_ctx);
            next.run(req).await
        }
        Ok(AuthOutcome::Anonymous) => next.run(req).await,
        Err(rejection) => {
            error!(
                kind = rejection.kind(),
                message = %rejection,
                trace = %rejection.chain(),
                "request rejected by access filter"
            );
            rejection.into_response()
        }
    };

    debug!(status = %res.status(), "access filter finish");
    res
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::models::{AuthProvider, Role};
    use crate::repos::memory::MemoryUserStore;
    use crate::repos::{AccountTx, NewAccount, RepoError, RepoResult, UserStore};
    use crate::services::account::AccountRegistrar;
    use crate::services::auth::TokenValidator;
    use crate::services::auth::access_jwt::test_tokens::{SECRET, sign};

    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn exists(&self, _: &str, _: AuthProvider) -> RepoResult<bool> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn begin(&self) -> RepoResult<Box<dyn AccountTx>> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }
    }

    fn state_with(store: Arc<dyn UserStore>) -> AppState {
        AppState::new(
            Arc::new(TokenValidator::new(SECRET, 0)),
            store.clone(),
            AccountRegistrar::new(store),
        )
    }

    fn app(state: AppState) -> Router {
        async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
            format!("{}:{}", ctx.user_id, ctx.auth_provider)
        }

        let router = Router::new()
            .route("/open", get(|| async { "downstream" }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .route("/me", get(whoami));

        apply(router, state.clone()).with_state(state)
    }

    async fn seeded_store() -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .seed(NewAccount {
                user_id: "u1".into(),
                nickname: "nick".into(),
                gender: None,
                email: None,
                age_range: None,
                profile_image: None,
                role: Role::User,
                auth_provider: AuthProvider::Google,
            })
            .await;
        store
    }

    fn get_with_auth(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, String) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_or_non_bearer_header_passes_through() {
        let state = state_with(Arc::new(seeded_store().await));

        for auth in [None, Some("Basic dTE6cHc="), Some("bearer lowercase")] {
            let (status, _, body) = send(app(state.clone()), get_with_auth("/open", auth)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "downstream");
        }
    }

    #[tokio::test]
    async fn anonymous_request_is_refused_by_identity_extractor_not_by_filter() {
        let state = state_with(Arc::new(seeded_store().await));

        let (status, _, body) = send(app(state), get_with_auth("/me", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error_code":"401","error_message":"UNAUTHORIZED"}"#);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_401() {
        let state = state_with(Arc::new(seeded_store().await));
        let token = sign(SECRET, "u1", "GOOGLE", -300);

        let (status, content_type, body) = send(
            app(state),
            get_with_auth("/open", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(
            body,
            r#"{"error_code":"401","error_message":"EXPIRED_ACCESS_TOKEN"}"#
        );
    }

    #[tokio::test]
    async fn malformed_token_is_treated_as_expired() {
        let state = state_with(Arc::new(seeded_store().await));

        let (status, _, body) =
            send(app(state), get_with_auth("/open", Some("Bearer abc.def.ghi"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            r#"{"error_code":"401","error_message":"EXPIRED_ACCESS_TOKEN"}"#
        );
    }

    #[tokio::test]
    async fn signed_token_with_blank_user_id_is_treated_as_expired() {
        let state = state_with(Arc::new(seeded_store().await));
        let token = sign(SECRET, "", "GOOGLE", 600);

        let (status, _, body) = send(
            app(state),
            get_with_auth("/open", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            r#"{"error_code":"401","error_message":"EXPIRED_ACCESS_TOKEN"}"#
        );
    }

    #[tokio::test]
    async fn valid_token_without_account_is_rejected() {
        let state = state_with(Arc::new(MemoryUserStore::new()));
        let token = sign(SECRET, "u1", "GOOGLE", 600);

        let (status, _, body) = send(
            app(state),
            get_with_auth("/open", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            r#"{"error_code":"401","error_message":"CANNOT_FOUND_USER"}"#
        );
    }

    #[tokio::test]
    async fn valid_token_with_account_reaches_handler_with_identity() {
        let state = state_with(Arc::new(seeded_store().await));
        let token = sign(SECRET, "u1", "GOOGLE", 600);

        let (status, _, body) = send(
            app(state),
            get_with_auth("/me", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u1:GOOGLE");
    }

    #[tokio::test]
    async fn downstream_status_is_left_untouched() {
        let state = state_with(Arc::new(seeded_store().await));
        let token = sign(SECRET, "u1", "GOOGLE", 600);

        let (status, _, body) = send(
            app(state),
            get_with_auth("/teapot", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_500_without_detail() {
        let state = state_with(Arc::new(BrokenStore));
        let token = sign(SECRET, "u1", "GOOGLE", 600);

        let (status, _, body) = send(
            app(state),
            get_with_auth("/open", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            r#"{"error_code":"500","error_message":"INTERNAL_SERVER_ERROR"}"#
        );
        assert!(!body.contains("pool"));
    }
}
