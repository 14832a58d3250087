/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenValidator, accounts: UserStore, registrar: AccountRegistrar
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::UserStore;
use crate::services::{account::AccountRegistrar, auth::TokenValidator};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenValidator>,
    pub accounts: Arc<dyn UserStore>,
    pub registrar: AccountRegistrar,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenValidator>,
        accounts: Arc<dyn UserStore>,
        registrar: AccountRegistrar,
    ) -> Self {
        Self {
            tokens,
            accounts,
            registrar,
        }
    }
}
