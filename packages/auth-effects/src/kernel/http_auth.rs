//! `BaseAuthService` against the admin API over HTTP.

use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{BaseAuthService, SignUpForm, SignUpResponse};
use crate::config::Config;
use crate::domains::auth::{AuthError, ErrorBody};

const TOKEN_PATH: &str = "oauth/token";
const REGISTER_PATH: &str = "user/register";
const PASSWORD_PATH: &str = "user/me/password";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
    is_allow_statistics: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

/// Admin API client. The access token from the last login is kept in memory
/// and sent as a bearer token by calls that need a session.
pub struct HttpAuthService {
    client: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<String>>,
}

impl HttpAuthService {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .with_context(|| format!("FRS_API_URL is not a valid URL: {}", config.api_url))?;
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            token: RwLock::new(None),
        })
    }

    /// Access token held since the last login, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the held token, returning the previous one.
    fn replace_token(&self, token: Option<String>) -> Option<String> {
        let mut slot = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *slot, token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::Network(format!("invalid endpoint {}: {}", path, e)))
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn a non-2xx response into `AuthError::Http`.
    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %text, "admin API returned an error");
        Err(AuthError::Http {
            status: status.as_u16(),
            body: ErrorBody::from_text(&text),
        })
    }
}

#[async_trait]
impl BaseAuthService for HttpAuthService {
    async fn log_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let form = [
            ("username", email),
            ("password", password),
            ("grant_type", "password"),
        ];

        let response = self
            .client
            .post(self.endpoint(TOKEN_PATH)?)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&form)
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?.json().await?;

        debug!(email, "access token received");
        self.replace_token(Some(token.access_token));
        Ok(())
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResponse, AuthError> {
        let body = RegisterRequest {
            first_name: &form.first_name,
            last_name: &form.last_name,
            email: &form.email,
            password: &form.password,
            is_allow_statistics: form.allow_statistics,
        };

        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(SignUpResponse {
            status: response.status().as_u16(),
        })
    }

    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let body = ChangePasswordRequest {
            old_password,
            new_password,
        };

        let request = self.client.put(self.endpoint(PASSWORD_PATH)?).json(&body);
        let response = self.with_token(request).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn clear_user_token(&self) -> Result<(), AuthError> {
        let Some(token) = self.replace_token(None) else {
            debug!("no token held, nothing to revoke");
            return Ok(());
        };

        let response = self
            .client
            .delete(self.endpoint(TOKEN_PATH)?)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        debug!("access token revoked");
        Ok(())
    }
}

impl std::fmt::Debug for HttpAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthService")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_url: &str) -> HttpAuthService {
        let config = Config::from_vars(|key| match key {
            "FRS_API_URL" => Some(api_url.to_string()),
            _ => None,
        })
        .unwrap();
        HttpAuthService::new(&config).unwrap()
    }

    #[test]
    fn endpoints_stay_under_base_path() {
        let service = service("https://frs.example.org/admin");

        assert_eq!(
            service.endpoint(TOKEN_PATH).unwrap().as_str(),
            "https://frs.example.org/admin/oauth/token"
        );
        assert_eq!(
            service.endpoint(PASSWORD_PATH).unwrap().as_str(),
            "https://frs.example.org/admin/user/me/password"
        );
    }

    #[test]
    fn register_body_uses_api_field_names() {
        let body = RegisterRequest {
            first_name: "Ada",
            last_name: "Lovelace",
            email: "ada@example.org",
            password: "secret",
            is_allow_statistics: true,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.org",
                "password": "secret",
                "isAllowStatistics": true,
            })
        );
    }

    #[test]
    fn replace_token_returns_previous() {
        let service = service("http://localhost:8000/admin/");

        assert_eq!(service.replace_token(Some("a".into())), None);
        assert_eq!(service.token().as_deref(), Some("a"));
        assert_eq!(service.replace_token(None).as_deref(), Some("a"));
        assert_eq!(service.token(), None);
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = Config::from_vars(|key| match key {
            "FRS_API_URL" => Some("not a url".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(HttpAuthService::new(&config).is_err());
    }
}
