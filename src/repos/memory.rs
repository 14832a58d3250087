//! In-memory `UserStore` for tests.
//!
//! A unit of work holds the store lock until it is committed or dropped, so
//! check-then-insert is serialized the same way a transaction plus unique
//! index serializes it in Postgres.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::AuthProvider;
use crate::repos::account_repo::{Account, AccountTx, NewAccount, UserStore};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    accounts: Arc<Mutex<Vec<Account>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().await.clone()
    }

    /// Seed an account without going through a unit of work.
    pub async fn seed(&self, account: NewAccount) {
        self.accounts.lock().await.push(materialize(&account));
    }
}

fn materialize(account: &NewAccount) -> Account {
    Account {
        id: Uuid::new_v4(),
        user_id: account.user_id.clone(),
        role: account.role,
        auth_provider: account.auth_provider,
        created_at: Utc::now(),
    }
}

fn matches(account: &Account, user_id: &str, provider: AuthProvider) -> bool {
    account.user_id == user_id && account.auth_provider == provider
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists(&self, user_id: &str, provider: AuthProvider) -> RepoResult<bool> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.iter().any(|a| matches(a, user_id, provider)))
    }

    async fn begin(&self) -> RepoResult<Box<dyn AccountTx>> {
        let guard = self.accounts.clone().lock_owned().await;
        Ok(Box::new(MemoryAccountTx {
            guard,
            pending: Vec::new(),
        }))
    }
}

struct MemoryAccountTx {
    guard: OwnedMutexGuard<Vec<Account>>,
    pending: Vec<Account>,
}

impl MemoryAccountTx {
    fn contains(&self, user_id: &str, provider: AuthProvider) -> bool {
        self.guard
            .iter()
            .chain(self.pending.iter())
            .any(|a| matches(a, user_id, provider))
    }
}

#[async_trait]
impl AccountTx for MemoryAccountTx {
    async fn exists(&mut self, user_id: &str, provider: AuthProvider) -> RepoResult<bool> {
        Ok(self.contains(user_id, provider))
    }

    async fn insert(&mut self, account: &NewAccount) -> RepoResult<Account> {
        if self.contains(&account.user_id, account.auth_provider) {
            return Err(RepoError::Conflict);
        }
        let stored = materialize(account);
        self.pending.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let MemoryAccountTx { mut guard, pending } = *self;
        guard.extend(pending);
        Ok(())
    }
}
