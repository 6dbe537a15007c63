//! The six infrastructure operations.
//!
//! Each handler is a pure mapping from validated arguments to one or more
//! [`CommandRunner`] invocations and then to report text; the dispatcher
//! wraps that text (or any error) into the result envelope. Handlers keep
//! no state across calls.
//!
//! Command strings and user-visible report texts are part of the external
//! contract of the managed system and are kept byte-stable.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use opsforge_tools::{OperationCatalog, OperationDef, ParamSpec, ParamType};

use crate::config::OpsConfig;
use crate::runner::CommandRunner;
use crate::tfvars;

// ---------------------------------------------------------------------------
// deploy_app
// ---------------------------------------------------------------------------

/// Deploy the application: render the tfvars file, then run terraform
/// init + apply.
///
/// The tfvars file is shared mutable state on disk; concurrent deploys
/// race on it. The stdio transport serves requests one at a time, so this
/// is accepted rather than locked (callers adding an overlapping
/// transport must add their own mutual exclusion).
struct DeployApp {
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
}

#[async_trait::async_trait]
impl OperationDef for DeployApp {
    fn name(&self) -> &str {
        "deploy_app"
    }

    fn description(&self) -> &str {
        "Deploy application to Kubernetes using Terraform"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("image_tag", ParamType::String, "Docker image tag to deploy"),
            ParamSpec::optional("replicas", ParamType::Number, "Number of replicas", json!(2)),
            ParamSpec::optional(
                "service_type",
                ParamType::String,
                "Service type (ClusterIP, NodePort, LoadBalancer)",
                json!("NodePort"),
            ),
        ]
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String> {
        let image_tag = args
            .get("image_tag")
            .and_then(|v| v.as_str())
            .context("missing required field: image_tag")?;
        let replicas = args.get("replicas").and_then(|v| v.as_i64()).unwrap_or(2);
        let service_type = args
            .get("service_type")
            .and_then(|v| v.as_str())
            .unwrap_or("NodePort");

        let vars = tfvars::render(&self.config, image_tag, replicas, service_type);
        let path = self.config.tfvars_path();
        tokio::fs::write(&path, vars)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        let command = format!(
            "cd {} && terraform init -upgrade && terraform apply -auto-approve -var-file={}",
            self.config.terraform_dir.display(),
            self.config.tfvars_file,
        );
        let output = self.runner.run(&command).await?;

        Ok(format!(
            "✅ Deployment successful!\n\nImage: {image}\nReplicas: {replicas}\nService Type: {service_type}\n\nTerraform Output:\n{stdout}",
            image = self.config.image_reference(image_tag),
            stdout = output.stdout,
        ))
    }
}

// ---------------------------------------------------------------------------
// scale_app
// ---------------------------------------------------------------------------

/// Scale the deployment to a target replica count.
struct ScaleApp {
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
}

#[async_trait::async_trait]
impl OperationDef for ScaleApp {
    fn name(&self) -> &str {
        "scale_app"
    }

    fn description(&self) -> &str {
        "Scale application replicas"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "replicas",
            ParamType::Number,
            "Number of replicas to scale to",
        )]
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String> {
        let replicas = args
            .get("replicas")
            .and_then(|v| v.as_i64())
            .context("missing required field: replicas")?;

        let output = self
            .runner
            .run(&format!(
                "kubectl scale deployment {} --replicas={replicas}",
                self.config.app_name
            ))
            .await?;

        Ok(format!(
            "✅ Scaled application to {replicas} replicas\n\n{}",
            output.stdout
        ))
    }
}

// ---------------------------------------------------------------------------
// get_app_status
// ---------------------------------------------------------------------------

/// Best-effort status report: four fixed inspection commands run strictly
/// in sequence, and a failing command is rendered inline without aborting
/// the rest. Section order matches command order regardless of timing.
struct GetAppStatus {
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
}

impl GetAppStatus {
    fn commands(&self) -> [String; 4] {
        let app = &self.config.app_name;
        [
            format!("kubectl get deployments {app} -o wide"),
            format!("kubectl get pods -l app={app}"),
            format!("kubectl get svc {}", self.config.service_name()),
            format!("kubectl top pods -l app={app} || echo \"Metrics not available\""),
        ]
    }
}

#[async_trait::async_trait]
impl OperationDef for GetAppStatus {
    fn name(&self) -> &str {
        "get_app_status"
    }

    fn description(&self) -> &str {
        "Get current application deployment status"
    }

    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn execute(&self, _args: Map<String, Value>) -> Result<String> {
        let mut report = String::from("📊 Application Status:\n\n");

        for command in &self.commands() {
            match self.runner.run(command).await {
                Ok(output) => {
                    report.push_str(&format!("{command}:\n{}\n\n", output.stdout));
                }
                Err(err) => {
                    // Partial failure is absorbed here; the remaining
                    // commands still run.
                    report.push_str(&format!("{command}: Error - {err}\n\n"));
                }
            }
        }

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// rollback_deployment
// ---------------------------------------------------------------------------

/// Roll the deployment back to its previous revision.
struct RollbackDeployment {
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
}

#[async_trait::async_trait]
impl OperationDef for RollbackDeployment {
    fn name(&self) -> &str {
        "rollback_deployment"
    }

    fn description(&self) -> &str {
        "Rollback to previous deployment"
    }

    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn execute(&self, _args: Map<String, Value>) -> Result<String> {
        let output = self
            .runner
            .run(&format!(
                "kubectl rollout undo deployment/{}",
                self.config.app_name
            ))
            .await?;

        Ok(format!("🔄 Rollback initiated\n\n{}", output.stdout))
    }
}

// ---------------------------------------------------------------------------
// analyze_logs
// ---------------------------------------------------------------------------

/// Substrings that mark a log line as a potential issue (matched
/// case-insensitively).
const ISSUE_MARKERS: [&str; 3] = ["error", "exception", "failed"];

/// Retrieve recent logs and scan them for issue markers.
struct AnalyzeLogs {
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
}

#[async_trait::async_trait]
impl OperationDef for AnalyzeLogs {
    fn name(&self) -> &str {
        "analyze_logs"
    }

    fn description(&self) -> &str {
        "Analyze application logs for issues"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::optional(
            "lines",
            ParamType::Number,
            "Number of log lines to analyze",
            json!(50),
        )]
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String> {
        let lines = args.get("lines").and_then(|v| v.as_i64()).unwrap_or(50);

        let output = self
            .runner
            .run(&format!(
                "kubectl logs -l app={} --tail={lines}",
                self.config.app_name
            ))
            .await?;

        let issues: Vec<&str> = output
            .stdout
            .lines()
            .filter(|line| {
                let lower = line.to_lowercase();
                ISSUE_MARKERS.iter().any(|marker| lower.contains(marker))
            })
            .collect();

        let mut analysis = format!("📋 Log Analysis (last {lines} lines):\n\n");

        if issues.is_empty() {
            analysis.push_str("✅ No obvious errors found in recent logs\n");
        } else {
            analysis.push_str(&format!("⚠️ Found {} potential issues:\n", issues.len()));
            for (i, line) in issues.iter().enumerate() {
                analysis.push_str(&format!("{}. {line}\n", i + 1));
            }
        }

        analysis.push_str(&format!("\n📝 Full logs:\n{}", output.stdout));
        Ok(analysis)
    }
}

// ---------------------------------------------------------------------------
// trigger_cicd
// ---------------------------------------------------------------------------

/// Intentionally inert: performs no external execution and returns static
/// guidance text for triggering the pipeline. Completing this with a real
/// pipeline API call is a deliberate non-change; the managed system's
/// pipeline is triggered by pushes, not by this server.
struct TriggerCicd;

#[async_trait::async_trait]
impl OperationDef for TriggerCicd {
    fn name(&self) -> &str {
        "trigger_cicd"
    }

    fn description(&self) -> &str {
        "Trigger CI/CD pipeline via GitHub Actions"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::optional(
            "branch",
            ParamType::String,
            "Branch to deploy",
            json!("main"),
        )]
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String> {
        let branch = args.get("branch").and_then(|v| v.as_str()).unwrap_or("main");

        Ok(format!(
            "🚀 CI/CD Pipeline Trigger\n\nTo trigger the pipeline:\n1. Push to {branch} branch\n2. Or manually trigger via GitHub Actions\n3. Monitor progress in the repository's Actions tab\n\nPipeline will:\n✅ Build Docker image\n✅ Run tests\n✅ Deploy to Kubernetes\n✅ Verify deployment"
        ))
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register all six operations with the given catalog.
pub fn register_operations(
    catalog: &OperationCatalog,
    runner: Arc<dyn CommandRunner>,
    config: Arc<OpsConfig>,
) -> Result<()> {
    catalog.register(Box::new(DeployApp {
        runner: Arc::clone(&runner),
        config: Arc::clone(&config),
    }))?;
    catalog.register(Box::new(ScaleApp {
        runner: Arc::clone(&runner),
        config: Arc::clone(&config),
    }))?;
    catalog.register(Box::new(GetAppStatus {
        runner: Arc::clone(&runner),
        config: Arc::clone(&config),
    }))?;
    catalog.register(Box::new(RollbackDeployment {
        runner: Arc::clone(&runner),
        config: Arc::clone(&config),
    }))?;
    catalog.register(Box::new(AnalyzeLogs {
        runner: Arc::clone(&runner),
        config: Arc::clone(&config),
    }))?;
    catalog.register(Box::new(TriggerCicd))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
