//! Operation catalog, request validation, and dispatch core for opsforge.
//!
//! This crate provides the abstraction for infrastructure operations that
//! clients can invoke over the MCP transport:
//!
//! - [`OperationDef`] -- the trait every operation implements
//! - [`ParamSpec`] / [`ParamType`] -- declarative parameter schemas
//! - [`Envelope`] / [`ContentBlock`] -- the uniform result shape
//! - [`OperationCatalog`] -- thread-safe operation storage and listing
//! - [`Dispatcher`] -- lookup, validation, execution, error normalization
//! - [`McpServer`] -- JSON-RPC 2.0 stdio transport adapter

pub mod definition;
pub mod dispatcher;
pub mod mcp_server;
pub mod registry;
pub mod validator;

pub use definition::{ContentBlock, Envelope, OperationDef, OperationInfo, ParamSpec, ParamType};
pub use dispatcher::{DispatchError, Dispatcher, DispatcherConfig};
pub use mcp_server::McpServer;
pub use registry::OperationCatalog;
pub use validator::{validate, ValidatedArguments, ValidationError};
