//! Request argument validation and defaulting.
//!
//! Checks an invocation's arguments against the operation's declared
//! [`ParamSpec`] list: required arguments must be present, supplied values
//! must structurally match their declared type, and omitted optional
//! arguments are filled with their schema defaults.
//!
//! The schema is advisory, not closed: keys the schema does not declare
//! pass through unexamined.

use serde_json::{Map, Value};

use crate::definition::ParamSpec;

/// Arguments after presence checks and default filling.
pub type ValidatedArguments = Map<String, Value>;

/// A request argument failure, surfaced before the handler runs.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A parameter declared `required` was not supplied.
    #[error("missing required argument: {name}")]
    MissingRequired { name: String },

    /// A supplied value does not match the declared parameter type.
    #[error("argument {name} must be of type {expected}")]
    WrongType { name: String, expected: &'static str },

    /// The arguments payload was not a JSON object.
    #[error("arguments must be a JSON object")]
    NotAnObject,
}

/// Validate `arguments` against `params`, returning the argument map with
/// defaults applied.
///
/// `Value::Null` is treated as an empty argument object so callers may
/// omit arguments entirely for operations that take none.
pub fn validate(
    params: &[ParamSpec],
    arguments: Value,
) -> Result<ValidatedArguments, ValidationError> {
    let mut args = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => return Err(ValidationError::NotAnObject),
    };

    for spec in params {
        match args.get(&spec.name) {
            Some(value) => {
                if !spec.param_type.matches(value) {
                    return Err(ValidationError::WrongType {
                        name: spec.name.clone(),
                        expected: spec.param_type.json_name(),
                    });
                }
            }
            None => {
                if spec.required {
                    return Err(ValidationError::MissingRequired {
                        name: spec.name.clone(),
                    });
                }
                if let Some(default) = &spec.default {
                    args.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ParamType;
    use serde_json::json;

    fn deploy_params() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("image_tag", ParamType::String, "Docker image tag to deploy"),
            ParamSpec::optional("replicas", ParamType::Number, "Number of replicas", json!(2)),
            ParamSpec::optional(
                "service_type",
                ParamType::String,
                "Service type",
                json!("NodePort"),
            ),
        ]
    }

    #[test]
    fn test_defaults_filled_for_omitted_optionals() {
        let args = validate(&deploy_params(), json!({"image_tag": "v2"})).unwrap();
        assert_eq!(args["image_tag"], "v2");
        assert_eq!(args["replicas"], 2);
        assert_eq!(args["service_type"], "NodePort");
    }

    #[test]
    fn test_supplied_values_not_overwritten() {
        let args = validate(
            &deploy_params(),
            json!({"image_tag": "v3", "replicas": 5, "service_type": "LoadBalancer"}),
        )
        .unwrap();
        assert_eq!(args["replicas"], 5);
        assert_eq!(args["service_type"], "LoadBalancer");
    }

    #[test]
    fn test_missing_required_rejected() {
        let err = validate(&deploy_params(), json!({"replicas": 3})).unwrap_err();
        match err {
            ValidationError::MissingRequired { ref name } => assert_eq!(name, "image_tag"),
            other => panic!("expected MissingRequired, got: {other:?}"),
        }
        assert_eq!(err.to_string(), "missing required argument: image_tag");
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = validate(&deploy_params(), json!({"image_tag": 7})).unwrap_err();
        match err {
            ValidationError::WrongType { name, expected } => {
                assert_eq!(name, "image_tag");
                assert_eq!(expected, "string");
            }
            other => panic!("expected WrongType, got: {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_keys_pass_through() {
        let args = validate(
            &deploy_params(),
            json!({"image_tag": "v2", "dry_run": true}),
        )
        .unwrap();
        assert_eq!(args["dry_run"], true);
    }

    #[test]
    fn test_null_arguments_treated_as_empty() {
        let params = vec![ParamSpec::optional(
            "lines",
            ParamType::Number,
            "Number of log lines",
            json!(50),
        )];
        let args = validate(&params, Value::Null).unwrap();
        assert_eq!(args["lines"], 50);
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        assert!(matches!(
            validate(&[], json!([1, 2])),
            Err(ValidationError::NotAnObject)
        ));
        assert!(matches!(
            validate(&[], json!("args")),
            Err(ValidationError::NotAnObject)
        ));
    }
}
