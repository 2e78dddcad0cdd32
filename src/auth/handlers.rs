use tracing::{debug, info, instrument};

use crate::{
    error::{ApiError, ApiResult, Operation},
    http::{ApiClient, Body},
    model::user::Session,
    models::{AuthResponse, LoginReqDto, RegisterReqDto},
    routes::Endpoint,
};

impl ApiClient {
    /// Log in and persist the session. Only a reply carrying a token counts as
    /// success.
    #[instrument(name = "auth_login", skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        info!("Login request");

        // 1️⃣ Basic validation
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(vec![
                "Username and password are required".to_string(),
            ]));
        }

        // 2️⃣ Ask the backend
        let body = Body::json(
            &LoginReqDto {
                username: username.trim().to_string(),
                password: password.to_string(),
            },
            &Operation::Login,
        )?;
        let reply = self.send(&Endpoint::Login, Operation::Login, body).await?;
        let auth: AuthResponse = reply.decode(Operation::Login)?;

        // 3️⃣ Token is mandatory
        let token = match auth.token.filter(|t| !t.trim().is_empty()) {
            Some(t) => t,
            None => {
                info!("Login reply carried no token");
                return Err(ApiError::request(
                    Operation::Login,
                    Some(reply.status.as_u16()),
                    auth.message,
                ));
            }
        };

        // 4️⃣ Persist
        let session = Session::new(
            auth.user_id.unwrap_or_default(),
            auth.username.unwrap_or_else(|| username.trim().to_string()),
            token,
        );
        self.session().save(session.clone())?;

        info!("Login successful");
        Ok(session)
    }

    /// Register a new account. Requires an authenticated session.
    #[instrument(name = "auth_register", skip(self, password), fields(username = %username))]
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(vec![
                "Username and password are required for registration".to_string(),
            ]));
        }

        let body = Body::json(
            &RegisterReqDto {
                username: username.trim().to_string(),
                password: password.to_string(),
            },
            &Operation::Register,
        )?;
        let reply = self
            .send(&Endpoint::Register, Operation::Register, body)
            .await?;

        debug!(status = reply.status.as_u16(), "User registered");
        if reply.is_empty() {
            return Ok(AuthResponse {
                username: Some(username.trim().to_string()),
                ..Default::default()
            });
        }
        reply.decode(Operation::Register)
    }

    /// Drop the local session. The backend keeps no server-side logout.
    pub fn logout(&self) -> ApiResult<()> {
        info!("Logging out");
        self.session().clear()
    }
}
