//! Application module.
//!
//! Ties the login gate, the school data and the configuration together and
//! hands each new connection its own console handler.

mod command;
mod console;

pub use command::{PanelCommand, HELP_TEXT};
pub use console::{Clock, ConsoleHandler, SESSION_EXPIRED_MESSAGE};

use std::sync::Arc;

use crate::auth::{GateSettings, SessionGate};
use crate::config::Config;
use crate::directory::{MemoryDirectory, UserDirectory};
use crate::school::SchoolData;
use crate::Result;

/// Shared state for all connections.
pub struct Application<D> {
    gate: Arc<SessionGate<D>>,
    data: Arc<SchoolData>,
    config: Arc<Config>,
}

impl<D: UserDirectory> Application<D> {
    pub fn new(gate: Arc<SessionGate<D>>, data: Arc<SchoolData>, config: Arc<Config>) -> Self {
        Self { gate, data, config }
    }

    pub fn gate(&self) -> &Arc<SessionGate<D>> {
        &self.gate
    }

    pub fn data(&self) -> &Arc<SchoolData> {
        &self.data
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Create a console handler for a new connection.
    pub fn create_handler(&self) -> ConsoleHandler<D> {
        ConsoleHandler::new(Arc::clone(&self.gate), Arc::clone(&self.data), &self.config)
    }
}

impl Application<MemoryDirectory> {
    /// Build the application from configuration: the configured directory,
    /// a gate with the `[auth]` limits and the demo school data.
    pub fn from_config(config: Config) -> Result<Self> {
        let directory = MemoryDirectory::from_config(&config.directory)?;
        let settings = GateSettings::from_config(&config.auth)?;
        Ok(Self::new(
            Arc::new(SessionGate::with_settings(directory, settings)),
            Arc::new(SchoolData::demo()),
            Arc::new(config),
        ))
    }
}

impl<D> Clone for Application<D> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            data: Arc::clone(&self.data),
            config: Arc::clone(&self.config),
        }
    }
}
