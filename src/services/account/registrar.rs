use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::models::{AuthProvider, Role};
use crate::repos::{NewAccount, RepoError, UserStore};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("account already exists: {user_id} ({provider})")]
    DuplicateAccount {
        user_id: String,
        provider: AuthProvider,
    },
    #[error("account store failure")]
    Store(#[from] RepoError),
}

/// Profile submitted at sign-up. The account role is not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub user_id: String,
    pub nickname: String,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub age_range: Option<String>,
    pub profile_image: Option<String>,
    pub auth_provider: AuthProvider,
}

/// Creates accounts. Each call runs one unit of work on the store:
/// existence check, insert, commit.
#[derive(Clone)]
pub struct AccountRegistrar {
    store: Arc<dyn UserStore>,
}

impl AccountRegistrar {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Returns the new account's user id.
    pub async fn create_account(&self, draft: AccountDraft) -> Result<String, RegistrationError> {
        let duplicate = || RegistrationError::DuplicateAccount {
            user_id: draft.user_id.clone(),
            provider: draft.auth_provider,
        };

        let mut tx = self.store.begin().await?;

        if tx.exists(&draft.user_id, draft.auth_provider).await? {
            return Err(duplicate());
        }

        let account = NewAccount {
            user_id: draft.user_id.clone(),
            nickname: draft.nickname.clone(),
            gender: draft.gender.clone(),
            email: draft.email.clone(),
            age_range: draft.age_range.clone(),
            profile_image: draft.profile_image.clone(),
            role: Role::User,
            auth_provider: draft.auth_provider,
        };

        // a concurrent sign-up can still win between the check and the insert;
        // the store reports that as Conflict
        let stored = match tx.insert(&account).await {
            Ok(stored) => stored,
            Err(RepoError::Conflict) => return Err(duplicate()),
            Err(e) => return Err(e.into()),
        };

        tx.commit().await.map_err(|e| match e {
            RepoError::Conflict => duplicate(),
            e => e.into(),
        })?;

        info!(
            account_id = %stored.id,
            user_id = %stored.user_id,
            provider = stored.auth_provider.display_name(),
            role = stored.role.title(),
            created_at = %stored.created_at,
            "account created"
        );

        Ok(stored.user_id)
    }
}
