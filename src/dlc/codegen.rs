// This module implements the emission driver: it lowers one function unit at
// a time, emitting the signature (const pointers for grid_constant regions,
// restrict-annotated qualified pointers otherwise), then walking the body in
// structural order. Scoped allocations go through the address-space resolver
// and must have a constant positive size; thread scopes lower to a plain int
// under the DLC compute-ID model; opaque op calls dispatch to the loop
// synthesizer in the intrinsics module. Output accumulates in a declarations
// buffer (fixed preamble with the three target headers) and a body buffer,
// concatenated by finish(). All state is scoped to one codegen value, so
// independent modules can be lowered concurrently with independent codegens.

//! Emission driver and signature/declaration lowering.

use crate::core::{CompileError, CompileResult};
use crate::dlc::address_space::storage_qualifier;
use crate::dlc::name_supply::NameSupply;
use crate::tir::{Expr, Param, PrimFunc, Stmt};

/// Code generator for the DLC accelerator.
///
/// Emits C source that uses DLC builtins and the DLC memory hierarchy. One
/// codegen holds the state of one lowering session.
pub struct DlcCodegen {
    decl: String,
    body: String,
    indent: usize,
    pub(crate) names: NameSupply,
    function_names: Vec<String>,
}

impl DlcCodegen {
    pub fn new() -> Self {
        let mut decl = String::new();
        decl.push_str("// dlcgen - Generated C source for DLC toolchain\n");
        decl.push_str("// Compile with: clang -target dlc -c <file>.c\n");
        decl.push('\n');
        decl.push_str("#include \"typehint.h\"\n");
        decl.push_str("#include \"ldst.h\"\n");
        decl.push_str("#include \"kernel_arg_types.h\"\n");
        decl.push('\n');
        Self {
            decl,
            body: String::new(),
            indent: 0,
            names: NameSupply::new(),
            function_names: Vec::new(),
        }
    }

    /// Entry-point names emitted so far, in lowering order.
    pub fn function_names(&self) -> &[String] {
        &self.function_names
    }

    /// Concatenate the declarations and body sections into the final text.
    pub fn finish(self) -> String {
        let mut code = self.decl;
        code.push_str(&self.body);
        code
    }

    /// Lower one function unit: signature, then body in structural order.
    pub fn add_function(&mut self, func: &PrimFunc) -> CompileResult<()> {
        log::debug!("lowering function {}", func.name);
        self.function_names.push(func.name.clone());
        self.reserve_idents(func);

        self.body.push_str("void ");
        self.body.push_str(&func.name);
        self.body.push('(');
        for (i, param) in func.params.iter().enumerate() {
            if i != 0 {
                self.body.push_str(", ");
            }
            let text = self.lower_param(func, param);
            self.body.push_str(&text);
        }
        self.body.push_str(") {\n");

        self.indent += 1;
        self.lower_stmt(&func.body)?;
        self.indent -= 1;
        self.body.push_str("}\n\n");
        Ok(())
    }

    /// Prime the name supply with every identifier bound in the function, so
    /// synthesized temporaries can never collide with user names.
    fn reserve_idents(&mut self, func: &PrimFunc) {
        for param in &func.params {
            self.names.reserve(&param.name);
        }
        fn walk(names: &mut NameSupply, stmt: &Stmt) {
            match stmt {
                Stmt::Block(stmts) => stmts.iter().for_each(|s| walk(names, s)),
                Stmt::Alloc { var, body, .. } => {
                    names.reserve(var);
                    walk(names, body);
                }
                Stmt::ThreadScope { var, body, .. } => {
                    names.reserve(var);
                    walk(names, body);
                }
                Stmt::Eval(_) => {}
            }
        }
        walk(&mut self.names, &func.body);
    }

    fn lower_param(&self, func: &PrimFunc, param: &Param) -> String {
        if !param.is_pointer {
            return format!("{} {}", param.dtype.c_name(), param.name);
        }
        // Compile-time-constant regions get a const pointer with no address
        // space annotation and no restrict.
        if param.scope == "grid_constant" {
            return format!("const {}* {}", param.dtype.c_name(), param.name);
        }
        let mut text = param.dtype.c_name();
        if let Some(qualifier) = storage_qualifier(&param.name, &param.scope) {
            text.push(' ');
            text.push_str(qualifier);
        }
        text.push('*');
        if func.no_alias && !func.non_restrict.iter().any(|n| n == &param.name) {
            text.push_str(" __restrict__");
        }
        text.push(' ');
        text.push_str(&param.name);
        text
    }

    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.lower_stmt(s)?;
                }
                Ok(())
            }
            Stmt::Alloc {
                var,
                dtype,
                scope,
                size,
                body,
            } => {
                let size = size.as_int().ok_or_else(|| CompileError::DynamicAllocSize {
                    var: var.clone(),
                })?;
                if size <= 0 {
                    return Err(CompileError::NonPositiveAllocSize {
                        var: var.clone(),
                        size,
                    });
                }
                let decl = match storage_qualifier(var, scope) {
                    Some(qualifier) => {
                        format!("{} {} {}[{}];", dtype.c_name(), qualifier, var, size)
                    }
                    None => format!("{} {}[{}];", dtype.c_name(), var, size),
                };
                self.line(&decl);
                self.lower_stmt(body)
            }
            Stmt::ThreadScope { var, extent, body } => {
                // DLC uses a compute ID model, not CUDA-style threading; the
                // thread variable becomes a plain int.
                self.line(&format!("int {var} = 0;  // Thread variable (extent: {extent})"));
                self.lower_stmt(body)
            }
            Stmt::Eval(Expr::Call { op, args }) => self.lower_call(*op, args),
            Stmt::Eval(expr) => {
                let text = self.expr_to_string(expr);
                self.line(&format!("{text};"));
                Ok(())
            }
        }
    }

    /// Print an operand expression. Operands print in declared left-to-right
    /// order exactly once each.
    pub(crate) fn expr_to_string(&self, expr: &Expr) -> String {
        match expr {
            Expr::Var(name) => name.clone(),
            Expr::IntImm(v) => v.to_string(),
            Expr::FloatImm(v) => format!("{v:?}f"),
            Expr::Str(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            Expr::Call { op, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr_to_string(a)).collect();
                format!("{}({})", op.info().name, args.join(", "))
            }
        }
    }

    /// Write one line into the body at the current indent.
    pub(crate) fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.body.push_str("  ");
        }
        self.body.push_str(text);
        self.body.push('\n');
    }

    /// Open an emitted block and indent.
    pub(crate) fn open_block(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    /// Dedent and close an emitted block.
    pub(crate) fn close_block(&mut self) {
        self.indent -= 1;
        self.line("}");
    }
}

impl Default for DlcCodegen {
    fn default() -> Self {
        Self::new()
    }
}
