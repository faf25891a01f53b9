//! Declared tool input schemas and argument validation
//!
//! The `inputSchema` advertised to peers is rendered from the same fields that
//! arguments are validated against.

use std::collections::HashMap;

use rust_mcp_sdk::schema::ToolInputSchema;
use serde_json::{Map, Value};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub description: String,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<SchemaField>,
}

impl SchemaField {
    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, description, FieldKind::String)
    }

    pub fn number(name: &str, description: &str) -> Self {
        Self::new(name, description, FieldKind::Number)
    }

    pub fn one_of(name: &str, description: &str, values: &[&str]) -> Self {
        Self::new(
            name,
            description,
            FieldKind::Enum(values.iter().map(|value| value.to_string()).collect()),
        )
    }

    fn new(name: &str, description: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn to_property(&self) -> Map<String, Value> {
        let json_type = match self.kind {
            FieldKind::Number => "number",
            FieldKind::String | FieldKind::Enum(_) => "string",
        };

        let mut property = Map::new();
        property.insert("type".to_string(), Value::from(json_type));
        if let FieldKind::Enum(values) = &self.kind {
            property.insert("enum".to_string(), Value::from(values.clone()));
        }
        property.insert(
            "description".to_string(),
            Value::from(self.description.clone()),
        );
        property
    }

    fn check(&self, value: &Value) -> Result<(), AppError> {
        match (&self.kind, value) {
            (FieldKind::String, Value::String(_)) => Ok(()),
            (FieldKind::Number, Value::Number(_)) => Ok(()),
            (FieldKind::Enum(values), Value::String(candidate)) => {
                if values.iter().any(|value| value == candidate) {
                    Ok(())
                } else {
                    Err(AppError::invalid_arguments(format!(
                        "`{}` must be one of: {}",
                        self.name,
                        values.join(", ")
                    )))
                }
            }
            (FieldKind::String | FieldKind::Enum(_), _) => Err(AppError::invalid_arguments(
                format!("`{}` must be a string", self.name),
            )),
            (FieldKind::Number, _) => Err(AppError::invalid_arguments(format!(
                "`{}` must be a number",
                self.name
            ))),
        }
    }
}

impl InputSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks presence of required fields and the type of every declared field
    /// that is present. Undeclared arguments are ignored.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), AppError> {
        for field in &self.fields {
            match arguments.get(&field.name) {
                Some(value) => field.check(value)?,
                None if field.required => {
                    return Err(AppError::invalid_arguments(format!(
                        "missing required argument `{}`",
                        field.name
                    )))
                }
                None => {}
            }
        }

        Ok(())
    }

    pub fn to_tool_input_schema(&self) -> ToolInputSchema {
        let properties = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.to_property()))
            .collect::<HashMap<_, _>>();
        let required = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect();

        ToolInputSchema::new(required, Some(properties), None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{InputSchema, SchemaField};

    fn calculate_schema() -> InputSchema {
        InputSchema::new(vec![
            SchemaField::one_of("operation", "op", &["add", "subtract"]).required(),
            SchemaField::number("a", "first").required(),
            SchemaField::number("b", "second").required(),
            SchemaField::string("note", "optional note"),
        ])
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object arguments")
    }

    fn render(schema: &InputSchema) -> Value {
        serde_json::to_value(schema.to_tool_input_schema()).expect("schema serializes")
    }

    #[test]
    fn accepts_matching_arguments() {
        let schema = calculate_schema();
        schema
            .validate(&args(json!({ "operation": "add", "a": 1, "b": 2.5 })))
            .expect("arguments should validate");
    }

    #[test]
    fn rejects_missing_required_field() {
        let error = calculate_schema()
            .validate(&args(json!({ "operation": "add", "a": 1 })))
            .expect_err("missing b must fail");
        assert_eq!(error.code(), "invalid_arguments");
        assert!(error.to_string().contains("`b`"));
    }

    #[test]
    fn rejects_number_given_as_string() {
        let error = calculate_schema()
            .validate(&args(json!({ "operation": "add", "a": "1", "b": 2 })))
            .expect_err("string a must fail");
        assert!(error.to_string().contains("`a` must be a number"));
    }

    #[test]
    fn rejects_value_outside_enum() {
        let error = calculate_schema()
            .validate(&args(json!({ "operation": "modulo", "a": 1, "b": 2 })))
            .expect_err("unknown operation must fail validation");
        assert!(error.to_string().contains("must be one of: add, subtract"));
    }

    #[test]
    fn optional_field_is_type_checked_only_when_present() {
        let schema = calculate_schema();
        schema
            .validate(&args(json!({ "operation": "add", "a": 1, "b": 2, "extra": true })))
            .expect("absent optional and undeclared fields are fine");

        let error = schema
            .validate(&args(json!({ "operation": "add", "a": 1, "b": 2, "note": null })))
            .expect_err("null optional string must fail");
        assert!(error.to_string().contains("`note` must be a string"));
    }

    #[test]
    fn renders_json_schema_with_enum_and_required() {
        let rendered = render(&calculate_schema());
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["operation"]["type"], "string");
        assert_eq!(rendered["properties"]["operation"]["enum"], json!(["add", "subtract"]));
        assert_eq!(rendered["properties"]["a"]["type"], "number");
        assert_eq!(rendered["required"], json!(["operation", "a", "b"]));
    }

    #[test]
    fn empty_schema_renders_no_properties() {
        let rendered = render(&InputSchema::empty());
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"], json!({}));
        assert!(rendered.get("required").is_none());
    }
}
