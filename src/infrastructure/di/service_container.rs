//! Service container for dependency injection
//!
//! Wires settings to the store connector and the value input source.

use std::sync::Arc;

use crate::application::services::KvService;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::stores::BackendConnector;
use crate::infrastructure::traits::{InputSource, StdinSource, StoreConnector};

/// Container holding settings and the I/O boundaries commands run against.
pub struct ServiceContainer {
    /// Merged settings (defaults, config file, env, flags)
    pub settings: Arc<Settings>,

    /// Opens the store handle
    pub connector: Arc<dyn StoreConnector>,

    /// Source for `-` values
    pub input: Arc<dyn InputSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(BackendConnector), Arc::new(StdinSource))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        connector: Arc<dyn StoreConnector>,
        input: Arc<dyn InputSource>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            connector,
            input,
        }
    }

    /// Open the configured store and wrap it in a [`KvService`].
    ///
    /// Each call opens a fresh connection; a command calls this once.
    pub fn kv_service(&self) -> ApplicationResult<KvService> {
        let params = self.settings.connection_params()?;
        let store = self.connector.connect(&params)?;
        Ok(KvService::new(store))
    }
}
