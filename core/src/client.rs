use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::schema;
use crate::session::Session;
use crate::types::*;

/// Single HTTP entry point for every call to the remote API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Create a new API client. Fails with `ConfigError` when the base URL is missing.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base = config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> ClientResult<Url> {
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), endpoint.path());
        Url::parse(&joined)
            .map_err(|e| ClientError::ConfigError(format!("Invalid endpoint URL {joined}: {e}")))
    }

    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> ClientResult<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        debug!(path = endpoint.path(), status = status.as_u16(), "Response received");
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Logs in or registers.
    ///
    /// Login posts the OAuth2 password form (`username`, `password`),
    /// persists the returned token and hands it back in `LoggedIn`.
    /// Register posts JSON and never issues a credential.
    /// Blank input fails before any request is made.
    #[instrument(skip(self, session, email, password))]
    pub async fn authenticate(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
        mode: AuthMode,
    ) -> ClientResult<AuthOutcome> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }

        match mode {
            AuthMode::Login => {
                let request = self
                    .client
                    .post(self.endpoint_url(Endpoint::Login)?)
                    .form(&LoginForm {
                        username: email,
                        password,
                    });
                let (status, body) = self.send(Endpoint::Login, request).await?;
                if !status.is_success() {
                    warn!(status = status.as_u16(), "Login rejected");
                    return Err(ClientError::AuthError(schema::error_detail(&body)));
                }

                let token = serde_json::from_str::<Value>(&body)
                    .ok()
                    .as_ref()
                    .and_then(schema::parse_token)
                    .ok_or_else(|| {
                        ClientError::AuthError("response did not include an access token".to_string())
                    })?;

                session.establish(token.clone())?;
                Ok(AuthOutcome::LoggedIn(token))
            }
            AuthMode::Register => {
                let request = self
                    .client
                    .post(self.endpoint_url(Endpoint::Register)?)
                    .json(&RegisterRequest { email, password });
                let (status, body) = self.send(Endpoint::Register, request).await?;
                if !status.is_success() {
                    warn!(status = status.as_u16(), "Registration rejected");
                    return Err(ClientError::AuthError(schema::error_detail(&body)));
                }
                Ok(AuthOutcome::Registered)
            }
        }
    }

    /// Issues one request and returns the decoded JSON body.
    ///
    /// The bearer header is attached only when the session holds a credential;
    /// endpoints that require one fail with `NotAuthenticated` without touching
    /// the network. The session is never modified.
    #[instrument(skip(self, session, payload), fields(path = endpoint.path()))]
    pub async fn call<P: Serialize + ?Sized>(
        &self,
        session: &Session,
        endpoint: Endpoint,
        payload: Option<&P>,
    ) -> ClientResult<Value> {
        if endpoint.requires_auth() && !session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }

        let mut request = self
            .client
            .request(endpoint.method(), self.endpoint_url(endpoint)?)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = payload {
            request = request.body(serde_json::to_vec(payload)?);
        }

        let (status, body) = self.send(endpoint, request).await?;
        if !status.is_success() {
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::shape(format!("response body is not JSON: {e}")))
    }

    /// Forgets the credential. Safe to call when already logged out.
    pub fn logout(&self, session: &mut Session) -> ClientResult<()> {
        session.end()
    }
}
