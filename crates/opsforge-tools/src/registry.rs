//! Thread-safe operation catalog.
//!
//! [`OperationCatalog`] stores operation implementations behind
//! `Arc<RwLock<...>>` so they can be registered at startup and looked up
//! from any async task. The catalog is built once at process start and is
//! read-only for the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};

use crate::definition::{
    render_input_schema, validate_operation_name, validate_params, OperationDef, OperationInfo,
};

/// A thread-safe catalog of operation definitions.
///
/// Operations are stored as `Arc<dyn OperationDef>` so callers can share
/// references without holding the lock during execution.
#[derive(Clone)]
pub struct OperationCatalog {
    operations: Arc<RwLock<HashMap<String, Arc<dyn OperationDef>>>>,
}

impl OperationCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            operations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register an operation. Rejects duplicate names, invalid names, and
    /// parameter lists that violate the required-implies-no-default rule.
    pub fn register(&self, operation: Box<dyn OperationDef>) -> Result<()> {
        let name = operation.name().to_string();
        validate_operation_name(&name)?;
        validate_params(&operation.params())?;

        let mut map = self
            .operations
            .write()
            .map_err(|e| anyhow::anyhow!("catalog lock poisoned: {e}"))?;

        if map.contains_key(&name) {
            bail!("operation already registered: {name}");
        }

        map.insert(name, Arc::from(operation));
        Ok(())
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OperationDef>> {
        let map = self.operations.read().ok()?;
        map.get(name).cloned()
    }

    /// List all registered operations (sorted by name for deterministic
    /// output; content is stable across calls).
    pub fn list(&self) -> Vec<OperationInfo> {
        let map = self.operations.read().expect("catalog lock poisoned");
        let mut infos: Vec<OperationInfo> = map
            .values()
            .map(|op| OperationInfo {
                name: op.name().to_string(),
                description: op.description().to_string(),
                input_schema: render_input_schema(&op.params()),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.read().expect("catalog lock poisoned").len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OperationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ParamSpec, ParamType};
    use serde_json::{json, Map, Value};

    struct MockOperation {
        op_name: String,
        params: Vec<ParamSpec>,
    }

    impl MockOperation {
        fn new(name: &str) -> Self {
            Self {
                op_name: name.to_string(),
                params: Vec::new(),
            }
        }

        fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
            self.params = params;
            self
        }
    }

    #[async_trait::async_trait]
    impl OperationDef for MockOperation {
        fn name(&self) -> &str {
            &self.op_name
        }

        fn description(&self) -> &str {
            "mock operation"
        }

        fn params(&self) -> Vec<ParamSpec> {
            self.params.clone()
        }

        async fn execute(&self, _args: Map<String, Value>) -> anyhow::Result<String> {
            Ok(format!("ran {}", self.op_name))
        }
    }

    #[test]
    fn test_register_and_list_sorted() {
        let catalog = OperationCatalog::new();
        catalog.register(Box::new(MockOperation::new("scale_app"))).unwrap();
        catalog.register(Box::new(MockOperation::new("deploy_app"))).unwrap();
        catalog.register(Box::new(MockOperation::new("analyze_logs"))).unwrap();

        let infos = catalog.list();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].name, "analyze_logs");
        assert_eq!(infos[1].name, "deploy_app");
        assert_eq!(infos[2].name, "scale_app");
    }

    #[test]
    fn test_listing_is_idempotent() {
        let catalog = OperationCatalog::new();
        catalog
            .register(Box::new(MockOperation::new("get_app_status")))
            .unwrap();
        catalog
            .register(Box::new(MockOperation::new("rollback_deployment").with_params(vec![
                ParamSpec::optional("branch", ParamType::String, "target branch", json!("main")),
            ])))
            .unwrap();

        let first = catalog.list();
        let second = catalog.list();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_duplicate() {
        let catalog = OperationCatalog::new();
        catalog.register(Box::new(MockOperation::new("deploy_app"))).unwrap();

        let err = catalog
            .register(Box::new(MockOperation::new("deploy_app")))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_rejects_invalid_name() {
        let catalog = OperationCatalog::new();
        let result = catalog.register(Box::new(MockOperation::new("deploy app")));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_required_param_with_default() {
        let catalog = OperationCatalog::new();
        let op = MockOperation::new("bad_op").with_params(vec![ParamSpec {
            name: "image_tag".to_string(),
            param_type: ParamType::String,
            description: "tag".to_string(),
            required: true,
            default: Some(json!("latest")),
        }]);
        assert!(catalog.register(Box::new(op)).is_err());
    }

    #[test]
    fn test_get_and_len() {
        let catalog = OperationCatalog::new();
        assert!(catalog.is_empty());

        catalog.register(Box::new(MockOperation::new("trigger_cicd"))).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("trigger_cicd").is_some());
        assert!(catalog.get("nonexistent").is_none());
    }
}
