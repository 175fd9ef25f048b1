//! The Agora health probe.
//!
//! The probe is a short, strictly sequential protocol:
//!
//! ```text
//! START -> LOGIN -> RESOURCE_CHECK -> DONE
//! ```
//!
//! Each step talks to the Agora API through the [`client::Client`] wrapper and
//! writes its findings into a [`nagios::NagiosResponse`], which is finally
//! rendered by a [`printer::Printer`].
pub mod app;
pub mod checks;
pub mod client;
pub mod config;
pub mod console;
pub mod logger;
pub mod nagios;
pub mod printer;
pub mod service;
