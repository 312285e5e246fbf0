//! Tile IR (TIR) data structures and parser for the DLC lowering engine.
//!
//! This module provides the IR consumed by the backend, plus a simple text
//! format for writing lowering tests and feeding the command line tool
//! without depending on the full upstream scheduling pipeline. The format is
//! designed to be:
//! - Human-readable and writable
//! - Easy to parse
//! - Sufficient for expressing scheduled kernels over the opaque op catalog
//!
//! # TIR Format
//!
//! ```text
//! ; Comments start with semicolon
//! func vecadd(%a: *f32, %b: *f32, %c: *f32) noalias {
//!     local %buf: f32[1024] @vmem
//!     call dlc.add("DLCAdd<float>", %c, %a, %b, 4096)
//!     call dlc.barrier()
//! }
//! ```

pub mod ops;
pub mod parser;

pub use ops::{OpInfo, TileOp};

/// Scalar and vector data types understood by the backend.
///
/// Multi-lane types lower to the target's single-lane type name followed by
/// the lane count (a 128-lane f32 becomes `float128`); the scalar mapping
/// follows the DLC toolchain convention of plain `int` over `int32_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Void,
    Handle,
    Int32,
    Float32,
    Int32x { lanes: u16 },
    Float32x { lanes: u16 },
}

impl DType {
    /// Target C type name for this IR type.
    pub fn c_name(self) -> String {
        match self {
            DType::Void => "void".to_string(),
            DType::Handle => "void*".to_string(),
            DType::Int32 => "int".to_string(),
            DType::Float32 => "float".to_string(),
            DType::Int32x { lanes } => format!("int{lanes}"),
            DType::Float32x { lanes } => format!("float{lanes}"),
        }
    }
}

/// Operand expressions of a call node.
///
/// Operands are printed in declared left-to-right order exactly once each;
/// earlier passes may have embedded side-effecting sub-expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a parameter, local buffer or thread variable.
    Var(String),
    IntImm(i64),
    FloatImm(f64),
    /// Template tag carried as metadata on arithmetic ops.
    Str(String),
    /// Opaque operation call from the catalog.
    Call { op: TileOp, args: Vec<Expr> },
}

impl Expr {
    /// Literal integer value, if this operand is statically known.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expr::IntImm(v) => Some(*v),
            _ => None,
        }
    }
}

/// Structured statements of a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Statements executed in order.
    Block(Vec<Stmt>),
    /// Local buffer allocation scoped over `body`. The size must lower to a
    /// compile time constant greater than zero; anything else is rejected
    /// during emission.
    Alloc {
        var: String,
        dtype: DType,
        scope: String,
        size: Expr,
        body: Box<Stmt>,
    },
    /// Thread/attribute scope. DLC uses a compute ID model, not CUDA-style
    /// grid/block threading, so the variable lowers to a plain int.
    ThreadScope {
        var: String,
        extent: i64,
        body: Box<Stmt>,
    },
    /// Expression evaluated for its effect (the opaque op calls).
    Eval(Expr),
}

/// A typed function parameter, optionally tagged with a storage scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub dtype: DType,
    pub is_pointer: bool,
    /// Storage scope tag ("vmem", "grid_constant", ...). Empty means untagged.
    pub scope: String,
}

/// One function unit of the scheduled IR.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimFunc {
    /// Entry symbol name emitted for this kernel.
    pub name: String,
    pub params: Vec<Param>,
    pub body: Stmt,
    /// Pointer parameters may be annotated restrict.
    pub no_alias: bool,
    /// Parameters that participate in aliasing despite `no_alias`.
    pub non_restrict: Vec<String>,
}

/// A module of one or more function units, lowered in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TirModule {
    pub functions: Vec<PrimFunc>,
}

impl TirModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> crate::CompileResult<Self> {
        parser::parse_module(text)
    }

    /// Debug listing of the module structure, one item per line.
    pub fn print(&self) -> String {
        let mut output = String::new();
        output.push_str("Printing TIR\n");
        for func in &self.functions {
            output.push_str(&format!("Function {}", func.name));
            for param in &func.params {
                output.push_str(&format!("\nParam {}", param.name));
            }
            print_stmt(&func.body, &mut output);
            output.push('\n');
        }
        output
    }
}

fn print_stmt(stmt: &Stmt, output: &mut String) {
    match stmt {
        Stmt::Block(stmts) => {
            for s in stmts {
                print_stmt(s, output);
            }
        }
        Stmt::Alloc { var, size, body, .. } => {
            output.push_str(&format!("\nAlloc {var}[{size:?}]"));
            print_stmt(body, output);
        }
        Stmt::ThreadScope { var, extent, body } => {
            output.push_str(&format!("\nThread {var} extent {extent}"));
            print_stmt(body, output);
        }
        Stmt::Eval(Expr::Call { op, args }) => {
            output.push_str(&format!("\nCall {} ({} args)", op.info().name, args.len()));
        }
        Stmt::Eval(_) => output.push_str("\nEval"),
    }
}

impl std::fmt::Display for TirModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.print())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_names() {
        assert_eq!(DType::Int32.c_name(), "int");
        assert_eq!(DType::Float32.c_name(), "float");
        assert_eq!(DType::Handle.c_name(), "void*");
        assert_eq!(DType::Float32x { lanes: 128 }.c_name(), "float128");
        assert_eq!(DType::Int32x { lanes: 8 }.c_name(), "int8");
    }

    #[test]
    fn test_module_print() {
        let module = TirModule {
            functions: vec![PrimFunc {
                name: "k".into(),
                params: vec![Param {
                    name: "a".into(),
                    dtype: DType::Float32,
                    is_pointer: true,
                    scope: String::new(),
                }],
                body: Stmt::Eval(Expr::Call {
                    op: TileOp::Barrier,
                    args: vec![],
                }),
                no_alias: false,
                non_restrict: vec![],
            }],
        };
        let out = module.print();
        assert!(out.contains("Function k"));
        assert!(out.contains("Param a"));
        assert!(out.contains("Call dlc.barrier (0 args)"));
    }
}
