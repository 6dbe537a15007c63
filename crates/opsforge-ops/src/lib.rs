//! Infrastructure operation handlers for opsforge.
//!
//! Six operations over kubectl and terraform, each implementing
//! [`opsforge_tools::OperationDef`] and executing external tools through
//! the injected [`CommandRunner`] capability:
//!
//! - `deploy_app` -- render tfvars, terraform init + apply
//! - `scale_app` -- kubectl scale
//! - `get_app_status` -- four inspection commands, best-effort
//! - `rollback_deployment` -- kubectl rollout undo
//! - `analyze_logs` -- kubectl logs + keyword scan
//! - `trigger_cicd` -- inert pipeline guidance stub

pub mod config;
pub mod handlers;
pub mod runner;
pub mod tfvars;

pub use config::OpsConfig;
pub use handlers::register_operations;
pub use runner::{CommandError, CommandOutput, CommandRunner, ShellRunner};
