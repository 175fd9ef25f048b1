pub mod endpoint;
pub mod login;
pub mod resources;
