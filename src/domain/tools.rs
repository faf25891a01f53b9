//! Interactive tools exposed via Model Context Protocol
//!
//! Provides `echo`, `calculate` and `get_system_info`. Each tool declares its
//! input schema and decodes its already-validated arguments into a typed input.

use std::{env, str::FromStr};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sysinfo::System;

use crate::domain::{
    parse_arguments,
    schema::{InputSchema, SchemaField},
};
use crate::{
    errors::AppError,
    registry::{CapabilityDescriptor, ToolExecutor},
};

pub const CALCULATE_OPERATIONS: [&str; 4] = ["add", "subtract", "multiply", "divide"];

#[derive(Debug, Deserialize)]
pub struct EchoInput {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CalculateInput {
    pub operation: String,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> Result<f64, AppError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide if b == 0.0 => Err(AppError::DivisionByZero),
            Self::Divide => Ok(a / b),
        }
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            other => Err(AppError::UnknownOperation {
                operation: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub platform: String,
    pub arch: String,
    pub server_version: String,
    pub kernel_version: Option<String>,
    pub uptime: u64,
    pub total_memory: u64,
    pub free_memory: u64,
    pub generated_at_utc: String,
}

pub struct EchoTool;

pub struct CalculateTool;

pub struct SystemInfoTool;

impl ToolExecutor for EchoTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: "echo".to_string(),
            description: "Echo back the input message".to_string(),
            input_schema: InputSchema::new(vec![
                SchemaField::string("message", "Message to echo back").required()
            ]),
        }
    }

    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AppError> {
        let input: EchoInput = parse_arguments(arguments)?;
        Ok(format!("Echo: {}", input.message))
    }
}

impl ToolExecutor for CalculateTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: "calculate".to_string(),
            description: "Perform basic arithmetic calculations".to_string(),
            input_schema: InputSchema::new(vec![
                SchemaField::one_of(
                    "operation",
                    "The arithmetic operation to perform",
                    &CALCULATE_OPERATIONS,
                )
                .required(),
                SchemaField::number("a", "First number").required(),
                SchemaField::number("b", "Second number").required(),
            ]),
        }
    }

    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AppError> {
        let input: CalculateInput = parse_arguments(arguments)?;
        let operation = input.operation.parse::<Operation>()?;
        let result = operation.apply(input.a, input.b)?;

        Ok(format!(
            "{} {} {} = {}",
            format_number(input.a),
            operation.as_str(),
            format_number(input.b),
            format_number(result)
        ))
    }
}

impl ToolExecutor for SystemInfoTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: "get_system_info".to_string(),
            description: "Get basic system information".to_string(),
            input_schema: InputSchema::empty(),
        }
    }

    fn execute(&self, _arguments: &Map<String, Value>) -> Result<String, AppError> {
        let snapshot = system_snapshot();
        let rendered = serde_json::to_string_pretty(&snapshot).map_err(|err| {
            AppError::internal(format!("failed to serialize system snapshot: {err}"))
        })?;

        Ok(format!("System Information:\n{rendered}"))
    }
}

/// Reads host state at call time.
pub fn system_snapshot() -> SystemSnapshot {
    let mut system = System::new();
    system.refresh_memory();

    SystemSnapshot {
        platform: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        kernel_version: System::kernel_version(),
        uptime: System::uptime(),
        total_memory: system.total_memory(),
        free_memory: system.free_memory(),
        generated_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Shortest round-trip rendering in the notation JSON peers print numbers with:
/// exponent form outside `[1e-6, 1e21)`, no negative zero, non-finite values spelled out.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity");
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exponent_form = format!("{value:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponent_form,
    }
}
