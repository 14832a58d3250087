use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External identity provider that issued the user's credentials.
///
/// The wire code (`"GOOGLE"`, ...) is what appears in token claims, request
/// bodies and the `user_accounts.auth_provider` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthProvider {
    Kakao,
    Naver,
    Google,
    Apple,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown auth provider: {0}")]
pub struct UnknownProvider(pub String);

impl AuthProvider {
    // code, display name
    const TABLE: [(AuthProvider, &'static str, &'static str); 4] = [
        (AuthProvider::Kakao, "KAKAO", "Kakao"),
        (AuthProvider::Naver, "NAVER", "Naver"),
        (AuthProvider::Google, "GOOGLE", "Google"),
        (AuthProvider::Apple, "APPLE", "Apple"),
    ];

    pub fn code(self) -> &'static str {
        Self::entry(self).1
    }

    pub fn display_name(self) -> &'static str {
        Self::entry(self).2
    }

    /// Look up a provider by its wire code. Codes are matched exactly.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(p, _, _)| *p)
    }

    fn entry(self) -> (AuthProvider, &'static str, &'static str) {
        // TABLE is indexed in declaration order
        Self::TABLE[self as usize]
    }
}

impl FromStr for AuthProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
