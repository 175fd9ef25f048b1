//! Thin wrapper around the `reqwest` client used by the probe checks.
//!
//! Every request goes through [`Client::send`], which turns whatever happened
//! on the wire into an explicit [`Reply`] or [`Error`]. The checks match on
//! the error variants to decide which status and message to report.
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// Login path, relative to the Agora base URL.
pub const LOGIN_PATH: &str = "api/v2/auth/login/";

/// Resource listing path, relative to the Agora base URL.
pub const RESOURCES_PATH: &str = "api/v2/resources/";

/// Fragments of TLS library error messages. `reqwest` does not expose the TLS
/// failure as a type, so the error chain text is all there is to go on.
const TLS_ERROR_MARKERS: [&str; 6] = ["ssl", "tls", "certificate", "handshake", "corrupt message", "invalidcontenttype"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// TLS handshake or certificate verification failed.
    Tls,
    Timeout,
    /// Connection refused or reset, DNS failure, and anything else below HTTP.
    Connection,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TransportKind::Tls => "TLS error",
            TransportKind::Timeout => "timeout",
            TransportKind::Connection => "connection error",
        };

        f.write_str(kind)
    }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Failed to build an HTTP client: {err}")]
    ClientBuildingError { err: Arc<reqwest::Error> },
    #[error("Failed to build the URL for path `{path}`: {err}")]
    InvalidUrl { path: String, err: url::ParseError },
    #[error("Request to {url} failed with a {kind}: {details}")]
    Transport {
        url: Url,
        kind: TransportKind,
        details: String,
    },
    #[error("Request to {url} returned an unexpected status code: {code}")]
    UnsuccessfulResponse { url: Url, code: StatusCode, body: String },
    #[error("Request to {url} returned malformed JSON: {err}")]
    MalformedJson {
        url: Url,
        body: String,
        err: Arc<serde_json::Error>,
    },
}

/// A response that was fully received, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// # Errors
    ///
    /// Will return [`Error::UnsuccessfulResponse`] if the status is not exactly `expected`.
    pub fn expect_status(self, expected: StatusCode) -> Result<Self, Error> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_unsuccessful())
        }
    }

    /// # Errors
    ///
    /// Will return [`Error::UnsuccessfulResponse`] if the status is not `2xx`.
    pub fn expect_success(self) -> Result<Self, Error> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(self.into_unsuccessful())
        }
    }

    /// # Errors
    ///
    /// Will return [`Error::MalformedJson`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, Error> {
        serde_json::from_str(&self.body).map_err(|err| Error::MalformedJson {
            url: self.url.clone(),
            body: self.body.clone(),
            err: err.into(),
        })
    }

    fn into_unsuccessful(self) -> Error {
        Error::UnsuccessfulResponse {
            url: self.url,
            code: self.status,
            body: self.body,
        }
    }
}

/// HTTP client bound to one Agora instance.
///
/// URL components in this context:
///
/// ```text
/// https://agora.example.org/api/v2/resources/
/// \________________________/\_______________/
///             |                     |
///          base url                path
/// ```
pub struct Client {
    base_url: Url,
    reqwest: HttpClient,
}

impl Client {
    /// # Errors
    ///
    /// Will return an error if the underlying HTTP client can't be built.
    pub fn new(base_url: Url, timeout: Duration, verify_ssl: bool) -> Result<Self, Error> {
        let reqwest = HttpClient::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| Error::ClientBuildingError { err: e.into() })?;

        Ok(Self { base_url, reqwest })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// # Errors
    ///
    /// Will return an error if `path` can't be joined to the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(|err| Error::InvalidUrl {
            path: path.to_owned(),
            err,
        })
    }

    #[must_use]
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.reqwest.get(url)
    }

    #[must_use]
    pub fn post(&self, url: Url) -> RequestBuilder {
        self.reqwest.post(url)
    }

    /// Sends the request and reads the whole body.
    ///
    /// # Errors
    ///
    /// Will return [`Error::Transport`] if no complete response was received.
    /// The status code is not checked here.
    pub async fn send(&self, request: RequestBuilder) -> Result<Reply, Error> {
        let request = request.build().map_err(|e| Error::ClientBuildingError { err: e.into() })?;
        let url = request.url().clone();

        tracing::debug!("{} {url}", request.method());

        let response = self
            .reqwest
            .execute(request)
            .await
            .map_err(|err| transport_error(url.clone(), &err))?;

        let status = response.status();

        let body = response.text().await.map_err(|err| transport_error(url.clone(), &err))?;

        tracing::debug!("{url} responded with {status}");

        Ok(Reply { url, status, body })
    }
}

fn transport_error(url: Url, err: &reqwest::Error) -> Error {
    // The top-level `reqwest` message contains the URL, which must not be
    // mistaken for a TLS marker.
    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else {
        err.source().map_or(TransportKind::Connection, classify)
    };

    let details = describe(err);

    tracing::warn!("{kind} while requesting {url}: {details}");

    Error::Transport { url, kind, details }
}

/// Classifies a transport failure by looking at the whole error chain.
#[must_use]
pub fn classify(err: &(dyn StdError + 'static)) -> TransportKind {
    let mut timed_out = false;
    let mut current = Some(err);

    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();

        if TLS_ERROR_MARKERS.iter().any(|marker| message.contains(marker)) {
            return TransportKind::Tls;
        }

        if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
            timed_out |= io_err.kind() == std::io::ErrorKind::TimedOut;
        }

        current = e.source();
    }

    if timed_out {
        TransportKind::Timeout
    } else {
        TransportKind::Connection
    }
}

/// The messages of the error and all its sources, joined by `: `.
#[must_use]
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut messages = vec![err.to_string()];
    let mut current = err.source();

    while let Some(e) = current {
        messages.push(e.to_string());
        current = e.source();
    }

    messages.join(": ")
}
