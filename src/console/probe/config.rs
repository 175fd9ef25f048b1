use std::fmt;
use std::time::Duration;

use reqwest::Url as ServiceUrl;
use serde::Serialize;
use thiserror::Error;

/// Default timeout for each request, in seconds.
pub const DEFAULT_TIMEOUT_SEC: i64 = 180;

/// DTO with the probe options as they come from the command line.
///
/// Configuration does not need to be valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainConfiguration {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: i64,
    pub verbose: bool,
    pub insecure: bool,
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Agora base URL. It always ends with `/` so API paths can be joined to it.
    pub base_url: ServiceUrl,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub verbose: bool,
    pub verify_ssl: bool,
}

/// Login payload.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Invalid URL `{url}`: {err}")]
    InvalidUrl { url: String, err: url::ParseError },
    #[error("Invalid URL `{url}`: only http and https are supported")]
    UnsupportedScheme { url: String },
    #[error("Invalid timeout `{timeout}`: it must be a positive number of seconds")]
    InvalidTimeout { timeout: i64 },
}

impl TryFrom<PlainConfiguration> for Configuration {
    type Error = ConfigurationError;

    fn try_from(plain_config: PlainConfiguration) -> Result<Self, Self::Error> {
        let base_url = parse_base_url(&plain_config.url)?;

        let timeout = match u64::try_from(plain_config.timeout) {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigurationError::InvalidTimeout {
                    timeout: plain_config.timeout,
                })
            }
        };

        Ok(Configuration {
            base_url,
            credentials: Credentials {
                username: plain_config.username,
                password: plain_config.password,
            },
            timeout,
            verbose: plain_config.verbose,
            verify_ssl: !plain_config.insecure,
        })
    }
}

/// It accepts a bare host (`agora.example.org`), which is reached over
/// `https`, or a full `http`/`https` URL, optionally with a path prefix.
fn parse_base_url(url: &str) -> Result<ServiceUrl, ConfigurationError> {
    let lowercase = url.to_ascii_lowercase();

    let with_scheme = if lowercase.starts_with("http://") || lowercase.starts_with("https://") {
        url.to_owned()
    } else if lowercase.contains("://") {
        return Err(ConfigurationError::UnsupportedScheme { url: url.to_owned() });
    } else {
        format!("https://{url}")
    };

    let mut base_url = with_scheme.parse::<ServiceUrl>().map_err(|err| ConfigurationError::InvalidUrl {
        url: url.to_owned(),
        err,
    })?;

    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    Ok(base_url)
}
