//! Transport-independent request and response envelopes

use serde_json::{Map, Value};

use crate::{
    errors::AppError,
    registry::{CapabilityDescriptor, ResourceDescriptor},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestEnvelope {
    ListTools,
    CallTool {
        name: String,
        arguments: Map<String, Value>,
    },
    ListResources,
    ReadResource {
        uri: String,
    },
}

impl RequestEnvelope {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListTools => "list_tools",
            Self::CallTool { .. } => "call_tool",
            Self::ListResources => "list_resources",
            Self::ReadResource { .. } => "read_resource",
        }
    }
}

/// Only text content is produced by this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text { text: String },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuccessPayload {
    Tools(Vec<CapabilityDescriptor>),
    Resources(Vec<ResourceDescriptor>),
    Content(Vec<ContentItem>),
    ResourceContents(Vec<ResourceContent>),
}

#[derive(Debug)]
pub enum ResponseEnvelope {
    Success(SuccessPayload),
    Failure(AppError),
}

impl From<Result<SuccessPayload, AppError>> for ResponseEnvelope {
    fn from(outcome: Result<SuccessPayload, AppError>) -> Self {
        match outcome {
            Ok(payload) => Self::Success(payload),
            Err(error) => Self::Failure(error),
        }
    }
}
