//! Capability registry
//!
//! Static table of the tools and resources this host exposes. The table is
//! assembled once at startup through [`RegistryBuilder`] and only read after.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    domain::{
        resources::{FileResource, SERVER_MANIFEST_URI},
        schema::InputSchema,
        tools::{CalculateTool, EchoTool, SystemInfoTool},
    },
    errors::AppError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Body of a tool. Arguments have already been checked against the tool's schema.
pub trait ToolExecutor: Send + Sync {
    fn descriptor(&self) -> CapabilityDescriptor;

    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AppError>;
}

#[async_trait]
pub trait ResourceReader: Send + Sync {
    fn descriptor(&self) -> ResourceDescriptor;

    async fn read(&self) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct ToolEntry {
    pub descriptor: CapabilityDescriptor,
    pub executor: Arc<dyn ToolExecutor>,
}

#[derive(Clone)]
pub struct ResourceEntry {
    pub descriptor: ResourceDescriptor,
    pub reader: Arc<dyn ResourceReader>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool `{0}` is registered more than once")]
    DuplicateTool(String),
    #[error("resource `{0}` is registered more than once")]
    DuplicateResource(String),
}

pub struct Registry {
    tools: Vec<ToolEntry>,
    resources: Vec<ResourceEntry>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    tools: Vec<ToolEntry>,
    resources: Vec<ResourceEntry>,
}

impl RegistryBuilder {
    pub fn tool(mut self, executor: Arc<dyn ToolExecutor>) -> Result<Self, RegistryError> {
        let descriptor = executor.descriptor();
        if self
            .tools
            .iter()
            .any(|entry| entry.descriptor.name == descriptor.name)
        {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }

        self.tools.push(ToolEntry {
            descriptor,
            executor,
        });
        Ok(self)
    }

    pub fn resource(mut self, reader: Arc<dyn ResourceReader>) -> Result<Self, RegistryError> {
        let descriptor = reader.descriptor();
        if self
            .resources
            .iter()
            .any(|entry| entry.descriptor.uri == descriptor.uri)
        {
            return Err(RegistryError::DuplicateResource(descriptor.uri));
        }

        self.resources.push(ResourceEntry { descriptor, reader });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            tools: self.tools,
            resources: self.resources,
        }
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The host's fixed capability set, with the server manifest read from `manifest_path`.
    pub fn with_builtins(manifest_path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        Ok(Self::builder()
            .tool(Arc::new(EchoTool))?
            .tool(Arc::new(CalculateTool))?
            .tool(Arc::new(SystemInfoTool))?
            .resource(Arc::new(FileResource::server_manifest(
                SERVER_MANIFEST_URI,
                manifest_path,
            )))?
            .build())
    }

    pub fn list_tools(&self) -> Vec<CapabilityDescriptor> {
        self.tools
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        self.resources
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn resolve_tool(&self, name: &str) -> Result<&ToolEntry, AppError> {
        self.tools
            .iter()
            .find(|entry| entry.descriptor.name == name)
            .ok_or_else(|| AppError::unknown_capability(name))
    }

    pub fn resolve_resource(&self, uri: &str) -> Result<&ResourceEntry, AppError> {
        self.resources
            .iter()
            .find(|entry| entry.descriptor.uri == uri)
            .ok_or_else(|| AppError::unknown_resource(uri))
    }
}
