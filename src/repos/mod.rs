/*
 * Responsibility
 * - user store (アカウント永続化) の公開インターフェース
 */
pub mod account_repo;
pub mod error;
#[cfg(test)]
pub mod memory;

pub use account_repo::{AccountTx, NewAccount, PgUserStore, UserStore};
pub use error::{RepoError, RepoResult};
