//! Tool and resource implementations
//!
//! Provides the declared schemas and bodies of the capabilities exposed over the MCP protocol

pub mod resources;
pub mod schema;
pub mod tools;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Decodes validated call arguments into a tool's typed input.
pub fn parse_arguments<T: DeserializeOwned>(arguments: &Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(arguments.clone()))
        .map_err(|err| AppError::invalid_arguments(err.to_string()))
}
