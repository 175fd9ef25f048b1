use std::sync::Arc;

use super::checks::login::{self, AuthToken};
use super::checks::{endpoint, resources};
use super::client::{self, Client, TransportKind};
use super::config::Configuration;
use super::nagios::{NagiosResponse, Status};
use super::printer::Printer;

/// Message reported when every check passes.
pub const OK_MESSAGE: &str = "Agora is up.";

/// Steps of one probe run. They are always visited in this order.
#[derive(Debug)]
enum Stage {
    Start,
    Login,
    ResourceCheck(AuthToken),
    Done,
}

pub struct Service {
    pub(crate) config: Arc<Configuration>,
}

impl Service {
    #[must_use]
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    /// Runs the probe, prints the status line and returns the status to exit
    /// with.
    pub async fn run_checks(&self, printer: &impl Printer) -> Status {
        let response = self.check().await;

        tracing::info!("Probe finished: {}", response.message());

        response.print(printer)
    }

    /// Runs the probe: login, then the resource check.
    ///
    /// Any critical finding ends the run.
    pub async fn check(&self) -> NagiosResponse {
        let mut response = NagiosResponse::new(OK_MESSAGE);

        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                response.write_unknown_message(&format!("Cannot build HTTP client.{err}."));
                return response;
            }
        };

        let mut stage = Stage::Start;

        loop {
            tracing::debug!("Probe stage: {stage:?}");

            stage = match stage {
                Stage::Start => Stage::Login,
                Stage::Login => match login::run(&client, &self.config.credentials).await {
                    Ok(token) => Stage::ResourceCheck(token),
                    Err(err) => {
                        self.report_login_error(&err, &mut response);
                        Stage::Done
                    }
                },
                Stage::ResourceCheck(token) => {
                    match resources::run(&client, &token).await {
                        Ok(count) => tracing::debug!("{count} resources available"),
                        Err(err) => self.report_resources_error(&err, &mut response),
                    }
                    Stage::Done
                }
                Stage::Done => break,
            };
        }

        response
    }

    /// Checks an arbitrary endpoint and writes any failure into `response`.
    pub async fn check_endpoint(&self, extension: &str, check_json: bool, response: &mut NagiosResponse) {
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                response.write_unknown_message(&format!("Cannot build HTTP client.{err}."));
                return;
            }
        };

        if let Err(err) = endpoint::run(&client, extension, check_json).await {
            response.write_critical_message(&err.to_string());
        }
    }

    fn client(&self) -> Result<Client, client::Error> {
        Client::new(self.config.base_url.clone(), self.config.timeout, self.config.verify_ssl)
    }

    fn report_login_error(&self, err: &login::Error, response: &mut NagiosResponse) {
        match err {
            login::Error::Client(err) => self.report_client_error(err, response),
            login::Error::CannotLogin { .. } | login::Error::MissingToken { .. } => {
                response.write_critical_message(&self.with_body(&err.to_string(), err.body()));
            }
        }
    }

    fn report_resources_error(&self, err: &resources::Error, response: &mut NagiosResponse) {
        match err {
            resources::Error::Client(err) => self.report_client_error(err, response),
            resources::Error::NoResources { .. } => {
                response.write_warning_message(&self.with_body(&err.to_string(), err.body()));
            }
            resources::Error::CannotRetrieve { .. } => {
                response.write_critical_message(&self.with_body(&err.to_string(), err.body()));
            }
            resources::Error::UnexpectedBody { url, body } => {
                response.write_critical_message(&self.with_body(&format!("Malformed JSON at {url}."), Some(body)));
            }
        }
    }

    fn report_client_error(&self, err: &client::Error, response: &mut NagiosResponse) {
        match err {
            client::Error::Transport {
                kind: TransportKind::Tls,
                details,
                ..
            } => response.write_critical_message(&format!("SSL Error.{details}.")),
            client::Error::Transport { details, .. } => response.write_critical_message(&format!("Connection Error.{details}.")),
            client::Error::MalformedJson { url, body, .. } => {
                response.write_critical_message(&self.with_body(&format!("Malformed JSON at {url}."), Some(body)));
            }
            client::Error::UnsuccessfulResponse { code, body, .. } => {
                let message = format!("Invalid response code: {}.", code.as_u16());
                response.write_critical_message(&self.with_body(&message, Some(body)));
            }
            client::Error::ClientBuildingError { .. } | client::Error::InvalidUrl { .. } => {
                response.write_unknown_message(&format!("{err}."));
            }
        }
    }

    /// In verbose mode the raw response body is appended to the message.
    fn with_body(&self, message: &str, body: Option<&str>) -> String {
        match body {
            Some(body) if self.config.verbose => format!("{message}{body}."),
            _ => message.to_owned(),
        }
    }
}
