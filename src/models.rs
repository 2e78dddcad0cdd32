use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterReqDto {
    pub username: String,
    pub password: String,
}

/// Reply to both login and register.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default, alias = "id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape. Some backends answer `{"error": ..}` instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn text(self) -> Option<String> {
        [self.message, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}
