/*
 * Responsibility
 * - user_accounts テーブル向け SQLx 操作
 * - UserStore / AccountTx trait (auth middleware と registrar が使う境界)
 * - (user_id, auth_provider) の一意性は DB の unique index が最終的に保証する
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{AuthProvider, Role};
use crate::repos::error::{RepoError, RepoResult};

/// Account about to be inserted. Role is already decided by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub user_id: String,
    pub nickname: String,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub age_range: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub auth_provider: AuthProvider,
}

/// Stored account as returned by an insert. Profile columns are write-only here.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub user_id: String,
    pub role: Role,
    pub auth_provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

/// Read/insert access to accounts.
///
/// `exists` is the per-request lookup. Sign-up goes through `begin`, so the
/// existence check and the insert share one unit of work.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists(&self, user_id: &str, provider: AuthProvider) -> RepoResult<bool>;

    async fn begin(&self) -> RepoResult<Box<dyn AccountTx>>;
}

/// A unit of work against the account store.
///
/// Dropping it without `commit` discards everything done through it.
#[async_trait]
pub trait AccountTx: Send {
    async fn exists(&mut self, user_id: &str, provider: AuthProvider) -> RepoResult<bool>;

    /// Returns `RepoError::Conflict` when the identifying pair is already taken.
    async fn insert(&mut self, account: &NewAccount) -> RepoResult<Account>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    user_id: String,
    role: String,
    auth_provider: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepoError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_key(&row.role)
            .ok_or_else(|| RepoError::Corrupt(format!("role {}", row.role)))?;
        let auth_provider = AuthProvider::from_code(&row.auth_provider)
            .ok_or_else(|| RepoError::Corrupt(format!("auth_provider {}", row.auth_provider)))?;

        Ok(Account {
            id: row.id,
            user_id: row.user_id,
            role,
            auth_provider,
            created_at: row.created_at,
        })
    }
}

const EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM user_accounts
        WHERE user_id = $1 AND auth_provider = $2
    )
"#;

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists(&self, user_id: &str, provider: AuthProvider) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(EXISTS_SQL)
            .bind(user_id)
            .bind(provider.code())
            .fetch_one(&self.pool)
            .await?;

        Ok(found)
    }

    async fn begin(&self) -> RepoResult<Box<dyn AccountTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgAccountTx { tx }))
    }
}

pub struct PgAccountTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountTx for PgAccountTx {
    async fn exists(&mut self, user_id: &str, provider: AuthProvider) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(EXISTS_SQL)
            .bind(user_id)
            .bind(provider.code())
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(found)
    }

    async fn insert(&mut self, account: &NewAccount) -> RepoResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO user_accounts
                (user_id, nickname, gender, email, age_range, profile_image, role, auth_provider)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, role, auth_provider, created_at
            "#,
        )
        .bind(&account.user_id)
        .bind(&account.nickname)
        .bind(account.gender.as_deref())
        .bind(account.email.as_deref())
        .bind(account.age_range.as_deref())
        .bind(account.profile_image.as_deref())
        .bind(account.role.key())
        .bind(account.auth_provider.code())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        Account::try_from(row)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let PgAccountTx { tx } = *self;
        tx.commit().await.map_err(RepoError::from_sqlx)
    }
}
