// This module serves as the hub for dlcgen's shared infrastructure. The
// lowering engine is deliberately small, so the only cross-cutting concern
// living here today is the error taxonomy: contract violations raised when
// the upstream IR producer hands us malformed input (arity mismatches,
// unsupported allocations), parse errors from the textual tile-IR format,
// and failures reported by an embedder-supplied compile callback. Unknown
// address-space codes and unmatched storage scopes are intentionally NOT
// errors; the resolver degrades gracefully to stay forward compatible with
// newer upstream producers.

//! Core dlcgen infrastructure.
//!
//! Shared building blocks used by both the IR data model and the DLC
//! lowering backend.

pub mod error;

pub use error::{CompileError, CompileResult};
