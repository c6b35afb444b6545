//! Configuration for the Prism gateway
//!
//! Settings come from an optional TOML file with environment variables
//! layered on top, then get validated once before the server accepts
//! traffic. Tokens and broker credentials are consumed here, never stored
//! anywhere else.
//!
//! ```rust,no_run
//! use prism_config::PrismConfig;
//!
//! let config = PrismConfig::load(Some(std::path::Path::new("prism.toml")))?;
//! # Ok::<(), prism_config::ConfigError>(())
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    AdapterSection, AdaptersConfig, BrokerConfig, PrismConfig, ServerConfig, SessionConfig,
    WebhookTokens,
};
