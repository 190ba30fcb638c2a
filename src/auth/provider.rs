//! External identity provider (GitHub) client
//!
//! Two server-to-server calls: exchanging an authorization code for an
//! access token, and looking up the authenticated login handle. Both
//! are single-shot with no internal retry; a failure is surfaced to the
//! caller as a terminal error for that request.

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::metrics::PROVIDER_REQUESTS_TOTAL;

/// Provider token response
#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    access_token: Option<String>,
}

/// Provider user info
#[derive(Debug, Deserialize)]
struct ProviderUser {
    login: String,
}

/// Identity provider client
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Build the browser redirect to the provider's authorization page
    ///
    /// # Arguments
    /// * `callback_uri` - the bridge's own callback endpoint
    /// * `state` - the signed bridge state to round-trip
    pub fn authorize_redirect(&self, callback_uri: &str, state: &str) -> Result<String, AppError> {
        let mut location = url::Url::parse(&self.config.authorize_url).map_err(|_| {
            AppError::Config("auth.provider.authorize_url is not a valid URL".to_string())
        })?;
        location
            .query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", callback_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(location.to_string())
    }

    /// Exchange an authorization code for a provider access token
    ///
    /// # Errors
    /// `ProviderAuth` when the provider rejects the exchange or returns
    /// no token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                PROVIDER_REQUESTS_TOTAL
                    .with_label_values(&["exchange", "error"])
                    .inc();
                return Err(AppError::HttpClient(error));
            }
        };

        if !response.status().is_success() {
            PROVIDER_REQUESTS_TOTAL
                .with_label_values(&["exchange", "error"])
                .inc();
            return Err(AppError::ProviderAuth(format!(
                "token exchange returned {}",
                response.status()
            )));
        }

        let token: ProviderTokenResponse = response.json().await.map_err(|_| {
            PROVIDER_REQUESTS_TOTAL
                .with_label_values(&["exchange", "error"])
                .inc();
            AppError::ProviderAuth("token exchange returned an unreadable body".to_string())
        })?;

        match token.access_token.filter(|token| !token.is_empty()) {
            Some(access_token) => {
                PROVIDER_REQUESTS_TOTAL
                    .with_label_values(&["exchange", "ok"])
                    .inc();
                Ok(access_token)
            }
            None => {
                PROVIDER_REQUESTS_TOTAL
                    .with_label_values(&["exchange", "error"])
                    .inc();
                Err(AppError::ProviderAuth(
                    "token exchange returned no access token".to_string(),
                ))
            }
        }
    }

    /// Fetch the login handle of the identity behind an access token
    ///
    /// # Errors
    /// `Unauthorized` when the provider rejects the token;
    /// `ProviderAuth` for any other provider failure.
    pub async fn fetch_login(&self, access_token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(&self.config.user_url)
            .header("Accept", "application/json")
            .bearer_auth(access_token)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                PROVIDER_REQUESTS_TOTAL
                    .with_label_values(&["lookup", "error"])
                    .inc();
                return Err(AppError::HttpClient(error));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            PROVIDER_REQUESTS_TOTAL
                .with_label_values(&["lookup", "rejected"])
                .inc();
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            PROVIDER_REQUESTS_TOTAL
                .with_label_values(&["lookup", "error"])
                .inc();
            return Err(AppError::ProviderAuth(format!(
                "identity lookup returned {}",
                status
            )));
        }

        let user: ProviderUser = response.json().await.map_err(|_| {
            PROVIDER_REQUESTS_TOTAL
                .with_label_values(&["lookup", "error"])
                .inc();
            AppError::ProviderAuth("identity lookup returned an unreadable body".to_string())
        })?;

        PROVIDER_REQUESTS_TOTAL
            .with_label_values(&["lookup", "ok"])
            .inc();
        Ok(user.login)
    }
}
