//! Request dispatcher
//!
//! Resolves each [`RequestEnvelope`] against the [`Registry`], validates tool
//! arguments against the declared schema and shapes the outcome into a
//! [`ResponseEnvelope`]. Domain failures never escape as anything else.

use std::{sync::Arc, time::Instant};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    errors::AppError,
    mcp::envelope::{
        ContentItem, RequestEnvelope, ResourceContent, ResponseEnvelope, SuccessPayload,
    },
    registry::Registry,
};

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub async fn deliver(&self, request: RequestEnvelope) -> ResponseEnvelope {
        let kind = request.kind();
        let started_at = Instant::now();

        let outcome = match request {
            RequestEnvelope::ListTools => Ok(SuccessPayload::Tools(self.registry.list_tools())),
            RequestEnvelope::ListResources => {
                Ok(SuccessPayload::Resources(self.registry.list_resources()))
            }
            RequestEnvelope::CallTool { name, arguments } => self.call_tool(&name, &arguments),
            RequestEnvelope::ReadResource { uri } => self.read_resource(&uri).await,
        };

        let outcome_code = match &outcome {
            Ok(_) => "success",
            Err(err) => err.code(),
        };
        debug!(
            kind,
            outcome = outcome_code,
            duration_ms = started_at.elapsed().as_millis(),
            "request dispatched"
        );

        outcome.into()
    }

    fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<SuccessPayload, AppError> {
        let entry = self.registry.resolve_tool(name)?;
        entry.descriptor.input_schema.validate(arguments)?;
        let text = entry.executor.execute(arguments)?;

        Ok(SuccessPayload::Content(vec![ContentItem::text(text)]))
    }

    async fn read_resource(&self, uri: &str) -> Result<SuccessPayload, AppError> {
        let entry = self.registry.resolve_resource(uri)?;
        let text = entry.reader.read().await?;

        Ok(SuccessPayload::ResourceContents(vec![ResourceContent {
            uri: entry.descriptor.uri.clone(),
            mime_type: entry.descriptor.mime_type.clone(),
            text,
        }]))
    }
}
