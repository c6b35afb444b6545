use prism_core::{AgentError, PrismError};

/// Startup and serve errors for the gateway host
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("adapter '{0}' is already registered")]
    DuplicateAdapter(String),

    #[error("adapter '{name}' has invalid url prefix '{prefix}'")]
    Prefix { name: String, prefix: String },

    #[error("url prefix '{prefix}' is already mounted by adapter '{name}'")]
    PrefixTaken { name: String, prefix: String },

    #[error("manifest for adapter '{name}' cannot be derived: {source}")]
    Manifest { name: String, source: PrismError },

    #[error("invalid listen address '{0}'")]
    Addr(String),

    #[error("invalid cors origin '{0}'")]
    Origin(String),

    #[error("http client setup failed: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
