//! HTTP client for the employee-management backend

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::error::{ApiError, ApiResult, ConfigError, Operation};
use crate::models::MessageResponse;
use crate::routes::Endpoint;

/// Request payload encoding
#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Value),
}

impl Body {
    pub fn json<B: Serialize>(body: &B, operation: &Operation) -> ApiResult<Self> {
        encode(body, operation).map(Body::Json)
    }

    pub fn form<B: Serialize>(body: &B, operation: &Operation) -> ApiResult<Self> {
        encode(body, operation).map(Body::Form)
    }
}

fn encode<B: Serialize>(body: &B, operation: &Operation) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        warn!(error = %e, %operation, "Unencodable request body");
        ApiError::request(operation.clone(), None, Some(e.to_string()))
    })
}

/// Successful response, body kept as text until the caller decodes it
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub text: String,
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        self.status == StatusCode::NO_CONTENT || self.text.trim().is_empty()
    }

    pub fn decode<T: DeserializeOwned>(&self, operation: Operation) -> ApiResult<T> {
        serde_json::from_str(&self.text).map_err(|e| {
            warn!(error = %e, %operation, "Undecodable response body");
            ApiError::request(operation, Some(self.status.as_u16()), None)
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| ConfigError::Invalid {
            name: "API_BASE_URL",
            value: config.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL",
                value: config.api_base_url.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                value: config.request_timeout.as_secs().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, endpoint: &Endpoint) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(endpoint.segments());
        }
        if let Some((key, value)) = endpoint.query() {
            url.query_pairs_mut().append_pair(key, &value);
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint, operation: Operation) -> ApiResult<T> {
        self.send(&endpoint, operation.clone(), Body::Empty)
            .await?
            .decode(operation)
    }

    /// Same as [`ApiClient::send`] with a url-encoded form body.
    pub async fn post_form<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        operation: Operation,
        body: &B,
    ) -> ApiResult<Reply> {
        let body = Body::form(body, &operation)?;
        self.send(endpoint, operation, body).await
    }

    /// Sends one request and maps every failure onto [`ApiError`].
    pub async fn send(&self, endpoint: &Endpoint, operation: Operation, body: Body) -> ApiResult<Reply> {
        let url = self.url(endpoint);
        let mut request = self.client.request(endpoint.method(), url.clone());

        if endpoint.is_protected() {
            let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Form(value) => request.form(&value),
        };

        debug!(method = %endpoint.method(), %url, %operation, "Sending request");

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, %operation, "Request failed");
            ApiError::request(operation.clone(), None, None)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            warn!(error = %e, %operation, "Failed to read response body");
            ApiError::request(operation.clone(), Some(status.as_u16()), None)
        })?;

        if status.is_success() {
            return Ok(Reply { status, text });
        }

        if status == StatusCode::UNAUTHORIZED && endpoint.is_protected() {
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to remove session file");
            }
            info!("Session expired or unauthorized. Please log in again.");
            return Err(ApiError::SessionExpired);
        }

        warn!(status = status.as_u16(), %operation, "Backend rejected request");
        Err(ApiError::request(operation, Some(status.as_u16()), error_message(&text)))
    }
}

/// Backend message from an error body: JSON `message`/`error`, or short plain text.
fn error_message(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<MessageResponse>(text) {
        Ok(body) => body.text(),
        Err(_) if text.starts_with('{') || text.starts_with('[') => None,
        Err(_) if text.len() <= 200 => Some(text.to_string()),
        Err(_) => None,
    }
}
