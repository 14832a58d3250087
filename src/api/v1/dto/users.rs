/*
 * Responsibility
 * - Users の request/response DTO
 * - validate() で形式チェック → service 用の AccountDraft に変換
 */
use serde::{Deserialize, Serialize};

use crate::models::AuthProvider;
use crate::services::account::AccountDraft;

const MAX_TEXT_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub id: String,
    pub nickname: String,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub age_range: Option<String>,
    pub profile_image: Option<String>,
    pub auth_provider: AuthProvider,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("id is required");
        }
        if self.nickname.trim().is_empty() {
            return Err("nickname is required");
        }
        if self.id.len() > MAX_TEXT_LEN || self.nickname.len() > MAX_TEXT_LEN {
            return Err("id and nickname must be <= 256 chars");
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err("email is malformed");
        }
        if let Some(url) = &self.profile_image
            && url.len() > MAX_TEXT_LEN
        {
            return Err("profile_image must be <= 256 chars");
        }

        Ok(())
    }

    pub fn into_draft(self) -> AccountDraft {
        AccountDraft {
            user_id: self.id,
            nickname: self.nickname,
            gender: self.gender,
            email: self.email,
            age_range: self.age_range,
            profile_image: self.profile_image,
            auth_provider: self.auth_provider,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub auth_provider: AuthProvider,
}
