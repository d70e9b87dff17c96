use super::registry;
use crate::config::BackendConfig;
use crate::core::{CacheError, CacheHandler, Result};
use crate::handlers::NullHandler;
use tracing::{info, warn};

/// Handler used when neither the requested nor the backup one is usable
pub const DEFAULT_HANDLER: &str = "null";

/// Picks, probes and initializes a cache handler
///
/// Order is strict: requested handler, then backup, then the factory's
/// default, then [`NullHandler`]. The first supported one is initialized and
/// returned. Only an unknown requested name and a failing `initialize()` on
/// the chosen handler are reported as errors.
#[derive(Debug, Clone)]
pub struct CacheFactory {
    default_handler: String,
}

impl CacheFactory {
    pub fn new(default_handler: impl Into<String>) -> Self {
        Self {
            default_handler: default_handler.into(),
        }
    }

    pub fn default_handler(&self) -> &str {
        &self.default_handler
    }

    /// Select a handler
    ///
    /// `handler` and `backup` take precedence over `config.handler` and
    /// `config.backup_handler`; empty strings count as absent.
    pub async fn select(
        &self,
        config: &BackendConfig,
        handler: Option<&str>,
        backup: Option<&str>,
    ) -> Result<Box<dyn CacheHandler>> {
        let requested = non_empty(handler)
            .or_else(|| non_empty(config.handler.as_deref()))
            .unwrap_or_default();

        let build = registry::resolve(requested)
            .ok_or_else(|| CacheError::HandlerNotFound(requested.to_string()))?;

        let mut adapter = build(config);
        if !adapter.is_supported() {
            warn!("Cache handler '{}' is not supported here", adapter.name());
            adapter = self.fallback(config, backup);
        }

        adapter.initialize().await?;
        info!("Bound cache handler '{}'", adapter.name());

        Ok(adapter)
    }

    fn fallback(&self, config: &BackendConfig, backup: Option<&str>) -> Box<dyn CacheHandler> {
        let name = non_empty(backup)
            .or_else(|| non_empty(config.backup_handler.as_deref()))
            .unwrap_or(self.default_handler.as_str());

        let build = registry::resolve(name).or_else(|| {
            warn!(
                "Backup cache handler '{}' not found, trying '{}'",
                name, self.default_handler
            );
            registry::resolve(&self.default_handler)
        });

        match build.map(|build| build(config)) {
            Some(adapter) if adapter.is_supported() => {
                info!("Falling back to cache handler '{}'", adapter.name());
                adapter
            }
            _ => {
                warn!("No usable backup cache handler, falling back to '{}'", DEFAULT_HANDLER);
                Box::new(NullHandler::new())
            }
        }
    }
}

impl Default for CacheFactory {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLER)
    }
}

/// Select a handler with the default factory
pub async fn select(
    config: &BackendConfig,
    handler: Option<&str>,
    backup: Option<&str>,
) -> Result<Box<dyn CacheHandler>> {
    CacheFactory::default().select(config, handler, backup).await
}

fn non_empty(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}
