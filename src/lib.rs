use std::{path::PathBuf, sync::Arc};

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod mcp;
pub mod registry;
pub mod stdio;

use mcp::dispatcher::Dispatcher;
use registry::{Registry, RegistryError};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry)),
        }
    }

    pub fn with_builtins(manifest_path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        Ok(Self::new(Registry::with_builtins(manifest_path)?))
    }
}
