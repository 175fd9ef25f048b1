//! Login step.
//!
//! It posts the probe credentials to the Agora login endpoint and extracts the
//! `auth_token` used to authorize the following requests.
use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::console::probe::client::{self, Client, LOGIN_PATH};
use crate::console::probe::config::Credentials;

/// Opaque token returned by the login endpoint. It only lives for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self(token.to_owned())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Cannot login.")]
    CannotLogin { code: StatusCode, body: String },
    #[error("Could not retrieve auth_token.")]
    MissingToken { body: String },
    #[error(transparent)]
    Client(#[from] client::Error),
}

impl Error {
    /// Raw response body, if a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::CannotLogin { body, .. } | Error::MissingToken { body } => Some(body.as_str()),
            Error::Client(_) => None,
        }
    }
}

/// # Errors
///
/// Will return an error if the login is rejected, the response has no token,
/// or the request could not be completed.
pub async fn run(client: &Client, credentials: &Credentials) -> Result<AuthToken, Error> {
    tracing::debug!("Logging in as {:?} ...", credentials.username);

    let url = client.url(LOGIN_PATH)?;

    let reply = client.send(client.post(url).json(credentials)).await?;

    let reply = match reply.expect_status(StatusCode::OK) {
        Ok(reply) => reply,
        Err(client::Error::UnsuccessfulResponse { code, body, .. }) => return Err(Error::CannotLogin { code, body }),
        Err(err) => return Err(err.into()),
    };

    let json = reply.json()?;

    extract_token(&json).ok_or(Error::MissingToken { body: reply.body })
}

fn extract_token(json: &Value) -> Option<AuthToken> {
    match json.get("auth_token")? {
        Value::Null => None,
        Value::String(token) => Some(AuthToken::new(token)),
        other => Some(AuthToken(other.to_string())),
    }
}
