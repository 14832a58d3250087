use serde::{Deserialize, Serialize};

/// Account role. Assigned when the account is created, never taken from a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Guest,
    User,
}

impl Role {
    pub fn key(self) -> &'static str {
        match self {
            Role::Guest => "GUEST",
            Role::User => "USER",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::User => "Regular user",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "GUEST" => Some(Role::Guest),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}
