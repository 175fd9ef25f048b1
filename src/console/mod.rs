//! Console clients.
pub mod probe;
