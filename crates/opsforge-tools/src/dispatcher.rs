//! The dispatch facade: lookup, validation, execution, and error
//! normalization.
//!
//! [`Dispatcher::dispatch`] never fails outward. Every failure -- unknown
//! operation, invalid arguments, handler error, timeout -- is caught at
//! this boundary and converted into an [`Envelope`] whose text is
//! `Error executing <name>: <message>`, so the transport always receives a
//! well-formed result and one failing invocation can never take down the
//! dispatch loop.
//!
//! No state persists across calls; a failure is terminal for that call
//! (there are no retries).

use std::time::{Duration, Instant};

use crate::definition::Envelope;
use crate::registry::OperationCatalog;
use crate::validator::{validate, ValidationError};

/// Configuration for the [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum wall-clock time for a single operation, including all of
    /// its external command invocations. Generous by default so long
    /// provisioning runs are unaffected.
    pub handler_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(300),
        }
    }
}

/// Structured error produced inside a dispatch, before envelope conversion.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The requested operation is not in the catalog.
    #[error("Unknown tool: {name}")]
    UnknownOperation { name: String },

    /// The request arguments failed validation.
    #[error(transparent)]
    InvalidArguments(#[from] ValidationError),

    /// The operation exceeded the configured timeout.
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The handler (or its command executor) returned an error.
    #[error("{0}")]
    HandlerFailed(#[from] anyhow::Error),
}

/// Stateless dispatch facade over an immutable catalog.
///
/// Each dispatch is a pure function of (catalog, request, handler); the
/// dispatcher holds no per-call state.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: OperationCatalog,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher over `catalog`.
    pub fn new(catalog: OperationCatalog, config: DispatcherConfig) -> Self {
        Self { catalog, config }
    }

    /// The catalog this dispatcher resolves operations through.
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Dispatch an invocation. Infallible outward: every error becomes a
    /// normal envelope.
    pub async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> Envelope {
        let start = Instant::now();
        match self.dispatch_inner(name, arguments).await {
            Ok(text) => {
                tracing::info!(
                    operation = name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "operation completed"
                );
                Envelope::text(text)
            }
            Err(err) => {
                tracing::warn!(
                    operation = name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "operation failed"
                );
                Envelope::text(format!("Error executing {name}: {err}"))
            }
        }
    }

    async fn dispatch_inner(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, DispatchError> {
        let operation = self
            .catalog
            .get(name)
            .ok_or_else(|| DispatchError::UnknownOperation {
                name: name.to_string(),
            })?;

        let args = validate(&operation.params(), arguments)?;

        match tokio::time::timeout(self.config.handler_timeout, operation.execute(args)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(DispatchError::HandlerFailed(err)),
            Err(_elapsed) => Err(DispatchError::Timeout {
                timeout_ms: self.config.handler_timeout.as_millis() as u64,
            }),
        }
    }
}
