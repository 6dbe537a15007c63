//! Core operation abstraction: the [`OperationDef`] trait, parameter
//! schemas, and the [`Envelope`] result shape.
//!
//! Every operation exposed by the dispatcher implements [`OperationDef`].
//! The trait is `Send + Sync` so operations can be stored in a shared
//! catalog and called from any async task.
//!
//! Parameters are declared with [`ParamSpec`] rather than raw JSON Schema
//! so the validator can fill defaults for omitted optional arguments; the
//! JSON Schema advertised to clients is rendered from the specs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An infrastructure operation that a client can invoke.
///
/// Implementations must be `Send + Sync` so the catalog can hand out
/// `Arc<dyn OperationDef>` across tasks.
#[async_trait::async_trait]
pub trait OperationDef: Send + Sync {
    /// Unique, human-readable name (alphanumeric + underscores, max 64 chars).
    fn name(&self) -> &str;

    /// Short description of what the operation does.
    fn description(&self) -> &str;

    /// Declared parameters. The validator fills defaults and checks
    /// required-ness against these before [`Self::execute`] runs.
    fn params(&self) -> Vec<ParamSpec>;

    /// Run the operation with validated arguments and return the report text.
    async fn execute(&self, args: Map<String, Value>) -> Result<String>;
}

/// JSON type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
}

impl ParamType {
    /// The type name used in the rendered JSON Schema.
    pub fn json_name(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
        }
    }

    /// Whether `value` structurally matches this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
        }
    }
}

/// A single declared parameter of an operation.
///
/// Invariant, checked at catalog registration: a required parameter must
/// not carry a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name as it appears in request arguments.
    pub name: String,
    /// Expected JSON type.
    pub param_type: ParamType,
    /// Human-readable description (surfaced in the rendered schema).
    pub description: String,
    /// Whether the argument must be supplied by the caller.
    pub required: bool,
    /// Value filled in when an optional argument is omitted.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A required parameter (no default permitted).
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
            default: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(name: &str, param_type: ParamType, description: &str, default: Value) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: false,
            default: Some(default),
        }
    }
}

/// Render the JSON Schema advertised to clients for a parameter list.
pub fn render_input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for spec in params {
        let mut prop = Map::new();
        prop.insert("type".to_string(), Value::String(spec.param_type.json_name().to_string()));
        prop.insert("description".to_string(), Value::String(spec.description.clone()));
        if let Some(default) = &spec.default {
            prop.insert("default".to_string(), default.clone());
        }
        properties.insert(spec.name.clone(), Value::Object(prop));
        if spec.required {
            required.push(Value::String(spec.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(schema)
}

/// Summary information about a cataloged operation (returned by listings).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationInfo {
    /// Operation name.
    pub name: String,
    /// Operation description.
    pub description: String,
    /// Rendered JSON Schema for valid input.
    pub input_schema: Value,
}

/// One block of a result envelope. Only text blocks exist today.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        /// The report or error text.
        text: String,
    },
}

/// The uniform result shape returned for every dispatched operation.
///
/// Success and failure share this shape; a failure is an envelope whose
/// text begins with an error indicator, never a distinct error type at
/// the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl Envelope {
    /// An envelope holding a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// Maximum allowed length for an operation name.
const MAX_OPERATION_NAME_LEN: usize = 64;

/// Validate that an operation name contains only alphanumeric characters
/// and underscores, is non-empty, and does not exceed
/// [`MAX_OPERATION_NAME_LEN`].
pub fn validate_operation_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("operation name must not be empty");
    }
    if name.len() > MAX_OPERATION_NAME_LEN {
        anyhow::bail!(
            "operation name exceeds maximum length of {MAX_OPERATION_NAME_LEN} characters: {name}"
        );
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!(
            "operation name must contain only alphanumeric characters and underscores: {name}"
        );
    }
    Ok(())
}

/// Validate a parameter list: unique names, and no defaults on required
/// parameters.
pub fn validate_params(params: &[ParamSpec]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for spec in params {
        if !seen.insert(spec.name.as_str()) {
            anyhow::bail!("duplicate parameter name: {}", spec.name);
        }
        if spec.required && spec.default.is_some() {
            anyhow::bail!(
                "required parameter {} must not carry a default",
                spec.name
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope::text("all good");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "all good"}]})
        );

        let back: Envelope = serde_json::from_value(value).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_render_input_schema() {
        let params = vec![
            ParamSpec::required("image_tag", ParamType::String, "Docker image tag to deploy"),
            ParamSpec::optional("replicas", ParamType::Number, "Number of replicas", json!(2)),
        ];

        let schema = render_input_schema(&params);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["image_tag"]["type"], "string");
        assert!(schema["properties"]["image_tag"].get("default").is_none());
        assert_eq!(schema["properties"]["replicas"]["default"], 2);
        assert_eq!(schema["required"], json!(["image_tag"]));
    }

    #[test]
    fn test_render_input_schema_no_params() {
        let schema = render_input_schema(&[]);
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].as_object().unwrap().is_empty());
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_param_type_matches() {
        assert!(ParamType::String.matches(&json!("v2")));
        assert!(ParamType::Number.matches(&json!(5)));
        assert!(ParamType::Number.matches(&json!(2.5)));
        assert!(ParamType::Boolean.matches(&json!(true)));
        assert!(ParamType::Object.matches(&json!({})));

        assert!(!ParamType::String.matches(&json!(5)));
        assert!(!ParamType::Number.matches(&json!("5")));
    }

    #[test]
    fn test_operation_name_validation() {
        assert!(validate_operation_name("deploy_app").is_ok());
        assert!(validate_operation_name("op1").is_ok());
        assert!(validate_operation_name(&"a".repeat(64)).is_ok());

        assert!(validate_operation_name("").is_err());
        assert!(validate_operation_name(&"a".repeat(65)).is_err());
        assert!(validate_operation_name("deploy-app").is_err());
        assert!(validate_operation_name("deploy app").is_err());
        assert!(validate_operation_name("op;rm -rf /").is_err());
        assert!(validate_operation_name("../etc/passwd").is_err());
    }

    #[test]
    fn test_param_validation_rejects_required_with_default() {
        let bad = vec![ParamSpec {
            name: "lines".to_string(),
            param_type: ParamType::Number,
            description: "log lines".to_string(),
            required: true,
            default: Some(json!(50)),
        }];
        assert!(validate_params(&bad).is_err());
    }

    #[test]
    fn test_param_validation_rejects_duplicates() {
        let bad = vec![
            ParamSpec::required("replicas", ParamType::Number, "count"),
            ParamSpec::optional("replicas", ParamType::Number, "count", json!(2)),
        ];
        assert!(validate_params(&bad).is_err());
    }
}
