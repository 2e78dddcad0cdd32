use serde::{Deserialize, Serialize};

/// Authenticated session persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl Session {
    pub fn new(id: impl Into<String>, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}
