//! Resource-check step.
//!
//! It lists the Agora resources with the token obtained at login. An empty
//! list means the service is degraded, not down.
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use super::login::AuthToken;
use crate::console::probe::client::{self, Client, RESOURCES_PATH};

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Could not retrieve resources.")]
    CannotRetrieve { code: StatusCode, body: String },
    #[error("No resources available.")]
    NoResources { body: String },
    #[error("Unexpected resource listing at {url}")]
    UnexpectedBody { url: Url, body: String },
    #[error(transparent)]
    Client(#[from] client::Error),
}

impl Error {
    /// Raw response body, if a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::CannotRetrieve { body, .. } | Error::NoResources { body } | Error::UnexpectedBody { body, .. } => {
                Some(body.as_str())
            }
            Error::Client(_) => None,
        }
    }
}

/// Builds the authorized listing request. The token is only attached to this
/// request.
#[must_use]
pub fn request(client: &Client, url: Url, token: &AuthToken) -> RequestBuilder {
    client.get(url).header(AUTHORIZATION, token.authorization())
}

/// It returns the number of resources.
///
/// # Errors
///
/// Will return an error if the listing can't be retrieved, is not a
/// collection, or is empty.
pub async fn run(client: &Client, token: &AuthToken) -> Result<usize, Error> {
    tracing::debug!("Checking resources ...");

    let url = client.url(RESOURCES_PATH)?;

    let reply = client.send(request(client, url, token)).await?;

    let reply = match reply.expect_status(StatusCode::OK) {
        Ok(reply) => reply,
        Err(client::Error::UnsuccessfulResponse { code, body, .. }) => return Err(Error::CannotRetrieve { code, body }),
        Err(err) => return Err(err.into()),
    };

    let json = reply.json()?;

    match length(&json) {
        Some(0) => Err(Error::NoResources { body: reply.body }),
        Some(count) => Ok(count),
        None => Err(Error::UnexpectedBody {
            url: reply.url,
            body: reply.body,
        }),
    }
}

/// Number of elements of a JSON collection or characters of a JSON string.
#[must_use]
pub fn length(json: &Value) -> Option<usize> {
    match json {
        Value::Array(items) => Some(items.len()),
        Value::Object(fields) => Some(fields.len()),
        Value::String(text) => Some(text.chars().count()),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}
