//! Gateway binary.
//!
//! Run with:
//!   GATEWAY_STORE_URL=http://localhost:9200 cargo run
//!
//! Try:
//!   curl 'http://127.0.0.1:5000/covid_regije?days=3'
//!   curl http://127.0.0.1:5000/stats
//!   curl http://127.0.0.1:5000/readyz

use std::process::ExitCode;

use sledilnik_gateway::{Error, GatewayConfig, Server, routes, telemetry};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match GatewayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    telemetry::init(&config.log_level);

    info!(
        store_url = %config.store_url,
        upstream_url = %config.upstream_url,
        "starting sledilnik-gateway"
    );
    debug!("configuration: {config:?}");

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("gateway failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &GatewayConfig) -> Result<(), Error> {
    let app = routes::from_config(config)?;
    Server::bind(config.listen_addr.as_str()).await?.serve(app).await
}
