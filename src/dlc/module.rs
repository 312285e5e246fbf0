// This module assembles the final emitted artifact. build_module drives one
// DlcCodegen over every function unit of a tile IR module in order and
// packages the concatenated text together with the ordered list of emitted
// entry-point names for downstream module packaging. build_module_with
// additionally accepts an optional external compile callback; when present
// it is invoked with the emitted text, a target descriptor and a
// configuration mapping, and its output is attached to the returned module.
// When absent the raw text is packaged as a source module. The engine itself
// never invokes an external compiler.

//! Module assembly and the optional compile callback.

use std::collections::BTreeMap;

use crate::core::{CompileError, CompileResult};
use crate::dlc::codegen::DlcCodegen;
use crate::tir::TirModule;

/// Target descriptor handed to the compile callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Target kind, e.g. "dlc".
    pub kind: String,
}

impl Target {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new("dlc")
    }
}

/// External compile hook: (emitted text, target, configuration) -> artifact.
pub type CompileCallback =
    dyn Fn(&str, &Target, &BTreeMap<String, String>) -> Result<Vec<u8>, String>;

/// The emitted module: preamble plus one textual function definition per
/// input function unit, immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    /// The generated C source.
    pub code: String,
    /// Emitted entry-point names, in lowering order.
    pub function_names: Vec<String>,
    /// Output of the compile callback, when one was supplied.
    pub artifact: Option<Vec<u8>>,
}

/// Lower a tile IR module to a DLC C source module.
pub fn build_module(module: &TirModule) -> CompileResult<SourceModule> {
    build_module_with(module, &Target::default(), &BTreeMap::new(), None)
}

/// Lower a tile IR module, then hand the text to `compile` when present.
pub fn build_module_with(
    module: &TirModule,
    target: &Target,
    options: &BTreeMap<String, String>,
    compile: Option<&CompileCallback>,
) -> CompileResult<SourceModule> {
    let mut cg = DlcCodegen::new();
    for func in &module.functions {
        cg.add_function(func)?;
    }
    let function_names = cg.function_names().to_vec();
    let code = cg.finish();
    log::debug!(
        "emitted {} function(s), {} bytes of source",
        function_names.len(),
        code.len()
    );

    let artifact = match compile {
        Some(callback) => Some(
            callback(&code, target, options)
                .map_err(|reason| CompileError::Callback { reason })?,
        ),
        None => None,
    };

    Ok(SourceModule {
        code,
        function_names,
        artifact,
    })
}
