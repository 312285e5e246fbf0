// This module is the DLC-specific backend: it owns everything that knows the
// target's memory hierarchy and instruction vocabulary. The address-space
// resolver maps integer codes and storage scopes to the DLC memory spaces
// (including the sync/flag naming heuristic), the name supply hands out
// collision-free helper identifiers for one lowering session, the intrinsics
// module synthesizes the tiled vector loops with partial-tile masking, and
// the codegen driver walks a function body in structural order and assembles
// the final C text. All session state (buffers, counters) lives on the
// DlcCodegen value; lowering independent modules concurrently means using
// independent codegens, never shared mutable state.

//! DLC target backend.
//!
//! Lowers the tile IR to C source for the DLC toolchain:
//! - [`address_space`] - memory space codes, storage scope resolution
//! - [`name_supply`] - unique helper identifiers
//! - [`codegen`] - the emission driver and signature/declaration lowering
//! - [`intrinsics`] - vectorized loop synthesis for the opaque op catalog
//! - [`module`] - module assembly and the optional compile callback

pub mod address_space;
pub mod codegen;
pub mod intrinsics;
pub mod module;
pub mod name_supply;

pub use address_space::{space_name, storage_qualifier, AddrSpace};
pub use codegen::DlcCodegen;
pub use module::{build_module, build_module_with, CompileCallback, SourceModule, Target};
pub use name_supply::NameSupply;
