//! Configuration for the operation handlers.
//!
//! [`OpsConfig`] is loaded from `opsforge.toml` and controls the target
//! application name, image repository, namespace, terraform working
//! directory, and the per-command time budget. The defaults reproduce the
//! external contract of the deployed system (tfvars path and key format,
//! kubectl resource names).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Handler configuration, loaded from `opsforge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    /// Kubernetes deployment/label name for the managed application.
    pub app_name: String,
    /// Image repository the deploy tag is appended to
    /// (`<image_repository>:<image_tag>`).
    pub image_repository: String,
    /// Kubernetes namespace written into the tfvars file.
    pub namespace: String,
    /// Directory containing the terraform configuration. The tfvars file
    /// is written here and `terraform` runs with this as its working
    /// directory.
    pub terraform_dir: PathBuf,
    /// File name of the generated variables file inside `terraform_dir`.
    pub tfvars_file: String,
    /// Per-command time budget for the shell runner, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            app_name: "ai-cicd-app".to_string(),
            image_repository: "pk233/ai-cicd-app".to_string(),
            namespace: "default".to_string(),
            terraform_dir: PathBuf::from("../terraform"),
            tfvars_file: "auto.tfvars".to_string(),
            command_timeout_secs: 300,
        }
    }
}

impl OpsConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The full image reference for a tag: `<image_repository>:<tag>`.
    pub fn image_reference(&self, tag: &str) -> String {
        format!("{}:{}", self.image_repository, tag)
    }

    /// The kubectl service name for the managed application.
    pub fn service_name(&self) -> String {
        format!("{}-svc", self.app_name)
    }

    /// Path of the generated variables file.
    pub fn tfvars_path(&self) -> PathBuf {
        self.terraform_dir.join(&self.tfvars_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_external_contract() {
        let config = OpsConfig::default();
        assert_eq!(config.app_name, "ai-cicd-app");
        assert_eq!(config.image_reference("v2"), "pk233/ai-cicd-app:v2");
        assert_eq!(config.service_name(), "ai-cicd-app-svc");
        assert_eq!(config.namespace, "default");
        assert_eq!(
            config.tfvars_path(),
            PathBuf::from("../terraform/auto.tfvars")
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OpsConfig = toml::from_str(r#"app_name = "shop-api""#).unwrap();
        assert_eq!(config.app_name, "shop-api");
        assert_eq!(config.namespace, "default");
        assert_eq!(config.command_timeout_secs, 300);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = OpsConfig::load_or_default(Path::new("/nonexistent/opsforge.toml")).unwrap();
        assert_eq!(config.app_name, "ai-cicd-app");
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opsforge.toml");
        std::fs::write(&path, "app_name = [not toml").unwrap();
        assert!(OpsConfig::load(&path).is_err());
    }
}
