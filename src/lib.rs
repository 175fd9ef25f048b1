//! Agora health probe.
//!
//! A Nagios-compatible plugin that checks an Agora
//! instance through its HTTP API. One run performs two sequential requests:
//!
//! 1. `POST /api/v2/auth/login/` with the probe credentials, to obtain an
//!    `auth_token`.
//! 2. `GET /api/v2/resources/` with `Authorization: Token <auth_token>`, to
//!    check that the resource listing is reachable and not empty.
//!
//! The outcome is printed as a single status line and mapped to the usual
//! monitoring-plugin exit codes:
//!
//! | Status     | Exit code | Reason                                         |
//! |------------|-----------|------------------------------------------------|
//! | `OK`       | 0         | Login succeeded and there are resources        |
//! | `WARNING`  | 1         | Login succeeded but the resource list is empty |
//! | `CRITICAL` | 2         | Login, resource query or transport failure     |
//! | `UNKNOWN`  | 3         | The probe itself could not run                 |
//!
//! ```text
//! agora-probe -U agora.example.org -u probe -p secret
//! OK - Agora is up.
//! ```
//!
//! Refer to the [`console::probe::app`] module for the full list of options.
pub mod console;
pub mod logging;
