//! dlcgen - Tile IR lowering for the DLC SIMD tile accelerator.
//!
//! dlcgen translates a small, fixed catalog of opaque tile operations —
//! vector arithmetic, transcendental unary ops, memory fill/copy,
//! scatter/gather DMA and cross-unit synchronization — appearing as call
//! nodes in an already-scheduled tile IR into C source consumable by the
//! DLC native toolchain.
//!
//! # Primary Usage
//!
//! ```ignore
//! use dlcgen::tir::TirModule;
//! use dlcgen::dlc::build_module;
//!
//! let module = TirModule::parse(&ir_text)?;
//! let source = build_module(&module)?;
//! println!("{}", source.code);
//! ```
//!
//! # Architecture
//!
//! - [`tir`] - Consumed tile IR: data model, operation catalog, text parser
//! - [`dlc`] - DLC specific lowering (address spaces, loop synthesis, codegen)
//! - [`core`] - Shared infrastructure (errors)

pub mod core;
pub mod dlc;
pub mod tir;

// Re-export common types from organized modules
pub use crate::core::{CompileError, CompileResult};
pub use dlc::{
    build_module, build_module_with, AddrSpace, DlcCodegen, NameSupply, SourceModule, Target,
};
pub use tir::{DType, Expr, OpInfo, Param, PrimFunc, Stmt, TileOp, TirModule};
