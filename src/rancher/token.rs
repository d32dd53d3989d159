use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{RancherError, host_base_url};

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Which login endpoint issues the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenApi {
    #[default]
    V1,
    V3,
}

impl TokenApi {
    fn endpoint(&self) -> &'static str {
        match self {
            TokenApi::V1 => "/v1/token",
            TokenApi::V3 => "/v3/token",
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

/// Exchanges a username and password for a bearer token.
///
/// Certificate verification is off: test servers use self-signed certs.
pub async fn generate_user_token(
    host: &str,
    username: &str,
    password: &str,
    api: TokenApi,
) -> Result<String, RancherError> {
    let url = format!("{}{}", host_base_url(host), api.endpoint());

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(TOKEN_TIMEOUT)
        .build()?;

    let response = client
        .post(&url)
        .json(&TokenRequest { username, password })
        .send()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "token request failed"))?;

    let status = response.status();
    if status.as_u16() >= 300 {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "token request failed");
        return Err(RancherError::TokenStatus(status.as_u16()));
    }

    let body: TokenResponse = response.json().await.map_err(|e| RancherError::Decode {
        what: "token response".to_string(),
        message: e.to_string(),
    })?;

    if body.token.is_empty() {
        tracing::error!("received empty token in response");
        return Err(RancherError::EmptyToken);
    }

    Ok(body.token)
}
