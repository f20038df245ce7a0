//! W-4 generation service
//!
//! Serves `POST /api/generate-w4` and `GET /api/health`.
//!
//! Usage:
//!   cargo run --release --bin w4_server
//!   W4_BIND_ADDR=127.0.0.1:8080 RUST_LOG=info cargo run --release --bin w4_server
//!
//! See `ServiceConfig::from_env` for the recognized variables.

use taxflow_w4::server;
use taxflow_w4::ServiceConfig;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        },
    };

    if let Err(e) = server::serve(config).await {
        log::error!("Server stopped: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
