// ABOUTME: Parser module for YAML pipeline definitions
// ABOUTME: Exports node definitions, parse errors, and tree diagnostics

pub mod error;
pub mod node;
pub mod validation;

pub use error::{ParserError, Result};
pub use node::{LogConfig, NodeConfig, NodeKind};
pub use validation::{validate, Diagnostic, DiagnosticKind, ValidationReport};
