// This module defines error types for the dlcgen lowering engine using the
// thiserror crate for idiomatic Rust error handling. CompileError is the main
// error enum covering the failure scenarios of the engine: operation arity
// mismatches against the catalog, unsupported local allocations (dynamic or
// non-positive sizes), unknown operation names and syntax errors from the
// textual tile-IR parser, and failures reported by an external compile
// callback. Each variant carries relevant context (operation names, expected
// and actual counts, line numbers) for debugging. The module also provides
// CompileResult<T> as a convenience alias for Result<T, CompileError>.

//! Error types for the dlcgen lowering engine.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for tile IR lowering.
///
/// Arity and allocation errors are contract violations: the upstream IR is
/// assumed already validated, so hitting one of these means the producer
/// broke the lowering engine's input contract, not that the user made a
/// recoverable mistake.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Operation {op} expects {expected} arguments, got {got}")]
    ArityMismatch {
        op: &'static str,
        expected: u32,
        got: usize,
    },

    #[error("Can only handle constant size stack allocation: {var}")]
    DynamicAllocSize { var: String },

    #[error("Allocation size for {var} must be greater than zero, got {size}")]
    NonPositiveAllocSize { var: String, size: i64 },

    #[error("Unknown operation: {name}")]
    UnknownOp { name: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Compile callback failed: {reason}")]
    Callback { reason: String },
}

/// Result type alias for lowering operations.
pub type CompileResult<T> = Result<T, CompileError>;
