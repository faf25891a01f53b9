//! Model Context Protocol file-backed resources
//!
//! Exposes the server manifest under a `file://` URI. The backing file is
//! read again on every request.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    errors::AppError,
    registry::{ResourceDescriptor, ResourceReader},
};

pub const SERVER_MANIFEST_URI: &str = "file://server.json";

#[derive(Debug, Clone)]
pub struct FileResource {
    descriptor: ResourceDescriptor,
    path: PathBuf,
}

impl FileResource {
    pub fn new(descriptor: ResourceDescriptor, path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            path: path.into(),
        }
    }

    pub fn server_manifest(uri: &str, path: impl Into<PathBuf>) -> Self {
        Self::new(
            ResourceDescriptor {
                uri: uri.to_string(),
                name: "Server Manifest".to_string(),
                description: "The server.json manifest describing this MCP server".to_string(),
                mime_type: "application/json".to_string(),
            },
            path,
        )
    }
}

#[async_trait]
impl ResourceReader for FileResource {
    fn descriptor(&self) -> ResourceDescriptor {
        self.descriptor.clone()
    }

    async fn read(&self) -> Result<String, AppError> {
        debug!(uri = %self.descriptor.uri, path = %self.path.display(), "reading resource");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| AppError::resource_unavailable(&self.descriptor.uri, err))
    }
}
