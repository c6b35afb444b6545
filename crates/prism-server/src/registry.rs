//! Adapter registry
//!
//! One registry instance owns every protocol adapter for the lifetime of
//! the process. Registration happens at startup, before the listener is
//! bound; enabled adapters must prove their manifest derives from the
//! current agent schema at that point, so a broken schema stops the server
//! instead of the first request. After startup the registry is read-only.

use std::sync::Arc;

use axum::Router;
use prism_core::{AdapterConfig, Agent, PrismError, SchemaDoc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ServerError;

/// One protocol surface the registry can mount and describe.
pub trait ProtocolAdapter: Send + Sync {
    fn config(&self) -> &AdapterConfig;

    /// Derives the adapter's manifest from the given schema snapshot.
    /// Called once at registration and again on every aggregation request;
    /// implementations must not cache across calls.
    fn manifest(&self, schema: &SchemaDoc) -> Result<Value, PrismError>;

    /// The adapter's HTTP routes, for surfaces that have any. Queue-driven
    /// adapters return `None`.
    fn routes(&self) -> Option<Router>;
}

/// Name, mount point, and enable flag, as served by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterDescriptor {
    pub name: String,
    pub url_prefix: String,
    pub enabled: bool,
}

pub struct AdapterRegistry {
    agent: Arc<dyn Agent>,
    adapters: Vec<Arc<dyn ProtocolAdapter>>,
}

impl AdapterRegistry {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            adapters: Vec::new(),
        }
    }

    /// Registers an adapter. Disabled adapters are kept for the listing
    /// endpoint but excluded from routing and manifest aggregation, and
    /// their manifests are not validated.
    pub fn register(&mut self, adapter: Arc<dyn ProtocolAdapter>) -> Result<(), ServerError> {
        let config = adapter.config().clone();

        if self
            .adapters
            .iter()
            .any(|existing| existing.config().name == config.name)
        {
            return Err(ServerError::DuplicateAdapter(config.name));
        }
        if !config.url_prefix.starts_with('/') || config.url_prefix.len() < 2 {
            return Err(ServerError::Prefix {
                name: config.name,
                prefix: config.url_prefix,
            });
        }
        if let Some(existing) = self
            .adapters
            .iter()
            .find(|existing| existing.config().url_prefix == config.url_prefix)
        {
            return Err(ServerError::PrefixTaken {
                name: existing.config().name.clone(),
                prefix: config.url_prefix,
            });
        }

        if config.enabled {
            let schema = self.agent.get_schema();
            adapter
                .manifest(&schema)
                .map_err(|source| ServerError::Manifest {
                    name: config.name.clone(),
                    source,
                })?;
            info!(
                adapter = %config.name,
                prefix = %config.url_prefix,
                "adapter registered"
            );
        } else {
            info!(adapter = %config.name, "adapter registered disabled");
        }

        self.adapters.push(adapter);
        Ok(())
    }

    /// Routes of every enabled adapter, nested under their prefixes.
    pub fn router(&self) -> Router {
        let mut router = Router::new();
        for adapter in &self.adapters {
            let config = adapter.config();
            if !config.enabled {
                continue;
            }
            if let Some(routes) = adapter.routes() {
                router = router.nest(&config.url_prefix, routes);
            }
        }
        router
    }

    /// Re-derives every enabled adapter's manifest from the live schema.
    pub fn manifests(&self) -> Result<Map<String, Value>, PrismError> {
        let schema = self.agent.get_schema();
        let mut manifests = Map::new();
        for adapter in &self.adapters {
            let config = adapter.config();
            if !config.enabled {
                continue;
            }
            manifests.insert(config.name.clone(), adapter.manifest(&schema)?);
        }
        Ok(manifests)
    }

    pub fn descriptors(&self) -> Vec<AdapterDescriptor> {
        self.adapters
            .iter()
            .map(|adapter| {
                let config = adapter.config();
                AdapterDescriptor {
                    name: config.name.clone(),
                    url_prefix: config.url_prefix.clone(),
                    enabled: config.enabled,
                }
            })
            .collect()
    }

    pub fn enabled_names(&self) -> Vec<String> {
        self.adapters
            .iter()
            .filter(|adapter| adapter.config().enabled)
            .map(|adapter| adapter.config().name.clone())
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.adapters
            .iter()
            .filter(|adapter| adapter.config().enabled)
            .count()
    }
}
