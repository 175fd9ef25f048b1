//! Generic endpoint check.
//!
//! A plain `GET` against any path of the Agora instance, without
//! authentication. It is not part of the default probe run, but it is handy to
//! check public endpoints.
use reqwest::Url;
use thiserror::Error;

use super::resources::length;
use crate::console::probe::client::{self, Client, TransportKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid response code: {code}")]
    InvalidResponseCode { code: u16 },
    #[error("SSL Error")]
    Ssl,
    #[error("Cannot connect to endpoint {endpoint}")]
    CannotConnect { endpoint: String },
    #[error("Malformed JSON at {endpoint}")]
    MalformedJson { endpoint: String },
    #[error("No services found at {endpoint}")]
    NoServices { endpoint: String },
}

/// The endpoint is the base URL followed by `extension`, verbatim.
#[must_use]
pub fn endpoint(client: &Client, extension: &str) -> String {
    format!("{}{extension}", client.base_url().as_str().trim_end_matches('/'))
}

/// When `check_json` is set the body must be a non-empty JSON collection.
///
/// # Errors
///
/// Will return an error describing the first problem found.
pub async fn run(client: &Client, extension: &str, check_json: bool) -> Result<(), Error> {
    let endpoint = endpoint(client, extension);

    tracing::debug!("Checking endpoint {endpoint} ...");

    let Ok(url) = endpoint.parse::<Url>() else {
        return Err(Error::CannotConnect { endpoint });
    };

    let reply = match client.send(client.get(url)).await.and_then(client::Reply::expect_success) {
        Ok(reply) => reply,
        Err(client::Error::UnsuccessfulResponse { code, .. }) => {
            return Err(Error::InvalidResponseCode { code: code.as_u16() })
        }
        Err(client::Error::Transport {
            kind: TransportKind::Tls, ..
        }) => return Err(Error::Ssl),
        Err(_) => return Err(Error::CannotConnect { endpoint }),
    };

    if !check_json {
        return Ok(());
    }

    let Ok(json) = reply.json() else {
        return Err(Error::MalformedJson { endpoint });
    };

    match length(&json) {
        Some(0) => Err(Error::NoServices { endpoint }),
        Some(_) => Ok(()),
        None => Err(Error::MalformedJson { endpoint }),
    }
}
