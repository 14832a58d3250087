/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::models::AuthProvider;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - token の claims から取り出し、user store に存在することを確認済みの識別子ペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
    pub auth_provider: AuthProvider,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>, auth_provider: AuthProvider) -> Self {
        Self {
            user_id: user_id.into(),
            auth_provider,
        }
    }
}
