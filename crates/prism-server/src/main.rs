// Prism gateway binary
//
// Loads configuration, wires the demo echo agent into the gateway, and
// serves every enabled protocol surface until stopped.

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use prism_config::PrismConfig;
use prism_mock_agent::EchoAgent;
use prism_server::{start_server, ServerError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for different failure scenarios
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 1;
    pub const STARTUP_ERROR: i32 = 2;
    pub const RUNTIME_ERROR: i32 = 3;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("starting prism gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = match PrismConfig::load(config_path().as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load configuration: {err}");
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let agent = Arc::new(EchoAgent::new());
    match start_server(config, agent).await {
        Ok(()) => process::exit(exit_codes::SUCCESS),
        Err(err) => {
            error!("gateway failed: {err}");
            let code = match err {
                ServerError::DuplicateAdapter(_)
                | ServerError::Prefix { .. }
                | ServerError::PrefixTaken { .. }
                | ServerError::Manifest { .. }
                | ServerError::Addr(_)
                | ServerError::Origin(_) => exit_codes::CONFIG_ERROR,
                ServerError::Agent(_) | ServerError::HttpClient(_) => exit_codes::STARTUP_ERROR,
                ServerError::Io(_) => exit_codes::RUNTIME_ERROR,
            };
            process::exit(code);
        }
    }
}

/// `PRISM_CONFIG` names the settings file; otherwise `prism.toml` in the
/// working directory is picked up when present.
fn config_path() -> Option<PathBuf> {
    env::var_os("PRISM_CONFIG").map(PathBuf::from).or_else(|| {
        let default = PathBuf::from("prism.toml");
        default.exists().then_some(default)
    })
}
