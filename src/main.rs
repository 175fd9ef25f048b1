//! Program to check the health of an Agora instance.
//!
//! ```text
//! cargo run -- --url agora.example.org --username probe --password secret
//! ```
use std::process;

use agora_probe::console::probe::app;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let status = app::run().await;

    process::exit(status.exit_code());
}
