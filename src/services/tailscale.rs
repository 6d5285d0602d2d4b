use crate::domain::constants::OAUTH_SCOPE;
use crate::domain::models::Device;
use crate::services::inventory::DeviceDirectory;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("either api key or oauth credentials must be provided")]
    Missing,
    #[error("oauth credentials need both a client id and a client secret")]
    IncompleteOAuth,
}

impl CredentialsError {
    pub fn code(&self) -> &'static str {
        match self {
            CredentialsError::Missing => "MISSING_CREDENTIALS",
            CredentialsError::IncompleteOAuth => "INCOMPLETE_OAUTH",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    OAuth {
        client_id: String,
        client_secret: String,
    },
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(..)"),
            Credentials::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Credentials {
    /// OAuth wins whenever any OAuth value is set; otherwise the API key is used.
    pub fn resolve(
        api_key: Option<&str>,
        oauth_id: Option<&str>,
        oauth_secret: Option<&str>,
    ) -> Result<Self, CredentialsError> {
        match (present(api_key), present(oauth_id), present(oauth_secret)) {
            (_, Some(id), Some(secret)) => Ok(Credentials::OAuth {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
            }),
            (_, Some(_), None) | (_, None, Some(_)) => Err(CredentialsError::IncompleteOAuth),
            (Some(key), None, None) => Ok(Credentials::ApiKey(key.to_string())),
            (None, None, None) => Err(CredentialsError::Missing),
        }
    }
}

#[derive(Deserialize)]
struct DeviceList {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Blocking client for the Tailscale v2 API.
pub struct TailscaleClient {
    http: reqwest::blocking::Client,
    base_url: String,
    tailnet: String,
    credentials: Credentials,
}

impl TailscaleClient {
    pub fn new(base_url: &str, tailnet: &str, credentials: Credentials) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tailnet: tailnet.to_string(),
            credentials,
        })
    }

    fn access_token(&self) -> anyhow::Result<String> {
        let (client_id, client_secret) = match &self.credentials {
            Credentials::ApiKey(key) => return Ok(key.clone()),
            Credentials::OAuth {
                client_id,
                client_secret,
            } => (client_id, client_secret),
        };
        let url = format!("{}/api/v2/oauth/token", self.base_url);
        debug!(%url, client_id = %client_id, "exchanging oauth client credentials");
        let token: TokenResponse = self
            .http
            .post(&url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", OAUTH_SCOPE),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(token.access_token)
    }
}

impl DeviceDirectory for TailscaleClient {
    fn list_devices(&self) -> anyhow::Result<Vec<Device>> {
        let token = self
            .access_token()
            .context("failed to obtain an oauth access token")?;
        let url = format!("{}/api/v2/tailnet/{}/devices", self.base_url, self.tailnet);
        debug!(%url, "listing devices");
        let list: DeviceList = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(list.devices)
    }
}
