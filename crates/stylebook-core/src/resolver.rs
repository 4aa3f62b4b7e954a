use std::sync::Arc;

use crate::config::Config;
use crate::connector::Connector;

/// Shared handles every resolve task works with.
///
/// Cloning is cheap, so each spawned task owns its own copy.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<Config>,
    connector: Arc<Connector>,
}

impl Resolver {
    pub fn new(config: Config, connector: Connector) -> Self {
        Self {
            config: Arc::new(config),
            connector: Arc::new(connector),
        }
    }

    /// Build from already shared handles.
    pub fn from_shared(config: Arc<Config>, connector: Arc<Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn shared_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn shared_connector(&self) -> Arc<Connector> {
        Arc::clone(&self.connector)
    }
}
