// This module is the vectorized-loop synthesizer, the core of the backend.
// Each opaque op call dispatches through an exhaustive match over the closed
// catalog into one of three emission shapes. Binary/scalar arithmetic emits
// a tiled loop striding 1024 elements per iteration, computing the residual
// tile length and a pre_exp2 partial-tile mask over 128-element sub-vectors
// so the final short iteration stays in bounds; a zero element count runs
// zero iterations. Unary transcendentals divide the element count by the
// 32-element granule and stride 32 granules per unrolled group with no mask;
// exact divisibility by 32 is a contract on the caller, not checked here.
// DMA expands the 9-argument descriptor into the 11-argument target call,
// resolving literal space codes to symbolic names and rewriting literal-zero
// flags to the NULL_SEMAPHORE sentinel, since zero is not a valid semaphore
// handle on the target and must be distinguished from "no synchronization
// requested". Sync ops and barrier lower one-to-one with pass-through
// arguments. Arity mismatches against the catalog are fatal contract
// violations; the upstream IR is assumed already validated.

//! Vectorized loop synthesis for the opaque op catalog.

use crate::core::{CompileError, CompileResult};
use crate::dlc::address_space::space_name;
use crate::dlc::codegen::DlcCodegen;
use crate::tir::{Expr, TileOp};

/// Elements processed by one synthesized loop iteration.
pub const VECTOR_WIDTH: i64 = 1024;
/// Sub-vector granularity of the masked load/store instructions.
pub const SUB_VECTOR: i64 = 128;
/// Elements per 128-byte hardware unit (32 x f32).
pub const GRANULE: i64 = 32;
/// DMA transfer unit length injected into the expanded call.
const DMA_UNIT_LEN: i64 = 128;
/// DMA address-unit shift for 4-byte elements. Supporting other element
/// widths means parameterizing this and DMA_UNIT_LEN.
const DMA_ADDR_UNIT_SHIFT: i64 = 2;

/// Every identifier the emission shapes derive from one temp group name.
/// Kept in one place so the name supply can reserve the whole family.
const TEMP_SUFFIXES: &[&str] = &[
    "_x",
    "_y",
    "_o",
    "_scalar",
    "_i",
    "_len",
    "_mask",
    "_vs",
    "_size128b",
];

impl DlcCodegen {
    /// Lower one opaque op call from the catalog.
    pub(crate) fn lower_call(&mut self, op: TileOp, args: &[Expr]) -> CompileResult<()> {
        let info = op.info();
        if args.len() != info.arity as usize {
            return Err(CompileError::ArityMismatch {
                op: info.name,
                expected: info.arity,
                got: args.len(),
            });
        }
        log::trace!("lowering call {}", info.name);
        use TileOp::*;
        match op {
            Add => self.emit_vector_binary("v_f32_add_b", args),
            Sub => self.emit_vector_binary("v_f32_sub_b", args),
            Mul => self.emit_vector_binary("v_f32_mul_b", args),
            Div => self.emit_vector_binary("v_f32_div_b", args),
            AddScalar => self.emit_vector_scalar("v_f32_add_b", args),
            SubScalar => self.emit_vector_scalar("v_f32_sub_b", args),
            MulScalar => self.emit_vector_scalar("v_f32_mul_b", args),
            DivScalar => self.emit_vector_scalar("v_f32_div_b", args),
            // Abs carries a template tag in slot 0; skip it.
            Abs => self.emit_vector_unary("v_f32_abs", &args[1..]),
            Exp => self.emit_vector_unary("v_f32_exp", args),
            Log => self.emit_vector_unary("v_f32_log", args),
            Sqrt => self.emit_vector_unary("v_f32_sqrt", args),
            Rsqrt => self.emit_vector_unary("v_f32_rsqrt", args),
            Relu => self.emit_vector_unary("v_f32_relu", args),
            Fill => self.emit_passthrough("vmem_fill", args),
            Copy => self.emit_passthrough("vmem_copy", args),
            Dma => self.emit_dma(args),
            Sync => self.emit_passthrough("dlc_sync_new", args),
            SyncDone => self.emit_passthrough("dlc_sync_done_new", args),
            SyncGte => self.emit_passthrough("dlc_sync_gte_new", args),
            SyncClear => self.emit_passthrough("dlc_sync_clear_new", args),
            Barrier => {
                self.line("barrier();");
                Ok(())
            }
        }
    }

    /// Tiled loop for vector-vector arithmetic.
    ///
    /// Args: (template_tag, dst, src0, src1, count). The count loop strides
    /// [`VECTOR_WIDTH`] elements; the residual tile length and its pre_exp2
    /// mask keep the final iteration in bounds when the count is not a
    /// multiple of the stride.
    fn emit_vector_binary(&mut self, inst: &str, args: &[Expr]) -> CompileResult<()> {
        let t = self.names.fresh_group("_dlc_vec", TEMP_SUFFIXES);
        let dst = self.expr_to_string(&args[1]);
        let src0 = self.expr_to_string(&args[2]);
        let src1 = self.expr_to_string(&args[3]);
        let count = self.expr_to_string(&args[4]);

        self.open_block();
        self.line(&format!("float8_128 {t}_x, {t}_y, {t}_o;"));
        self.line(&format!(
            "for (int {t}_i = 0; {t}_i < {count}; {t}_i += {VECTOR_WIDTH}) {{"
        ));
        self.line(&format!("  int {t}_len = min({count} - {t}_i, {VECTOR_WIDTH});"));
        self.line(&format!("  int {t}_mask = pre_exp2({t}_len/{SUB_VECTOR});"));
        self.line(&format!(
            "  {t}_x = v_f32_ld_tnsr_st_msk({t}_i/{GRANULE}, {src0}, 1, {t}_mask);"
        ));
        self.line(&format!(
            "  {t}_y = v_f32_ld_tnsr_st_msk({t}_i/{GRANULE}, {src1}, 1, {t}_mask);"
        ));
        self.line(&format!("  {t}_o = {inst}({t}_x, {t}_y);"));
        self.line(&format!(
            "  v_f32_st_tnsr_st_msk({t}_i/{GRANULE}, {dst}, 1, {t}_mask, {t}_o);"
        ));
        self.line("}");
        self.close_block();
        Ok(())
    }

    /// Tiled loop for vector-scalar arithmetic.
    ///
    /// Args: (template_tag, dst, src, scalar, count). Same tiling and
    /// masking as the vector-vector shape, with the scalar broadcast once
    /// outside the loop.
    fn emit_vector_scalar(&mut self, inst: &str, args: &[Expr]) -> CompileResult<()> {
        let t = self.names.fresh_group("_dlc_vec", TEMP_SUFFIXES);
        let dst = self.expr_to_string(&args[1]);
        let src = self.expr_to_string(&args[2]);
        let scalar = self.expr_to_string(&args[3]);
        let count = self.expr_to_string(&args[4]);

        self.open_block();
        self.line(&format!("float8_128 {t}_x, {t}_o;"));
        self.line(&format!("float8_128 {t}_scalar = {scalar};"));
        self.line(&format!(
            "for (int {t}_i = 0; {t}_i < {count}; {t}_i += {VECTOR_WIDTH}) {{"
        ));
        self.line(&format!("  int {t}_len = min({count} - {t}_i, {VECTOR_WIDTH});"));
        self.line(&format!("  int {t}_mask = pre_exp2({t}_len/{SUB_VECTOR});"));
        self.line(&format!(
            "  {t}_x = v_f32_ld_tnsr_st_msk({t}_i/{GRANULE}, {src}, 1, {t}_mask);"
        ));
        self.line(&format!("  {t}_o = {inst}({t}_x, {t}_scalar);"));
        self.line(&format!(
            "  v_f32_st_tnsr_st_msk({t}_i/{GRANULE}, {dst}, 1, {t}_mask, {t}_o);"
        ));
        self.line("}");
        self.close_block();
        Ok(())
    }

    /// Fixed-stride unrolled loop for unary transcendentals.
    ///
    /// Args: (dst, src, count). The count is converted to 128-byte units and
    /// the loop strides [`GRANULE`] units per group, with an unroll
    /// hint for the downstream compiler. No masking is emitted: the caller
    /// must guarantee the element count divides evenly by the granule, or
    /// the generated instruction reads and writes past the buffer extent.
    fn emit_vector_unary(&mut self, inst: &str, args: &[Expr]) -> CompileResult<()> {
        let t = self.names.fresh_group("_dlc_vec", TEMP_SUFFIXES);
        let dst = self.expr_to_string(&args[0]);
        let src = self.expr_to_string(&args[1]);
        let count = self.expr_to_string(&args[2]);

        self.open_block();
        self.line(&format!("int {t}_size128b = {count} / {GRANULE};"));
        self.line("#pragma clang loop unroll_count(2)");
        self.line(&format!(
            "for (int {t}_vs = 0; {t}_vs < {t}_size128b; {t}_vs += {GRANULE}) {{"
        ));
        self.line(&format!("  float8_128 {t}_x = v_f32_ld_tnsr_b({t}_vs, {src});"));
        self.line(&format!("  {t}_x = {inst}({t}_x);"));
        self.line(&format!("  v_f32_st_tnsr_b({t}_vs, {dst}, {t}_x);"));
        self.line("}");
        self.close_block();
        Ok(())
    }

    /// Expand the 9-argument DMA descriptor into the 11-argument target call.
    ///
    /// Literal space codes resolve to symbolic names; non-literal codes pass
    /// through unresolved. A literal zero in either flag slot becomes the
    /// NULL_SEMAPHORE sentinel; everything else passes through.
    fn emit_dma(&mut self, args: &[Expr]) -> CompileResult<()> {
        let mut parts = Vec::with_capacity(11);
        parts.push(self.expr_to_string(&args[0])); // src_ptr
        parts.push(self.space_arg(&args[1])); // src_space
        parts.push(self.expr_to_string(&args[2])); // dst_ptr
        parts.push(self.space_arg(&args[3])); // dst_space
        parts.push(self.expr_to_string(&args[4])); // length
        parts.push(self.expr_to_string(&args[5])); // src_stride
        parts.push(self.expr_to_string(&args[6])); // dst_stride
        parts.push(self.flag_arg(&args[7])); // src_flag
        parts.push(self.flag_arg(&args[8])); // dst_flag
        parts.push(DMA_UNIT_LEN.to_string());
        parts.push(DMA_ADDR_UNIT_SHIFT.to_string());
        self.line(&format!("dlc_dma_new({});", parts.join(", ")));
        Ok(())
    }

    fn space_arg(&self, arg: &Expr) -> String {
        match arg.as_int() {
            Some(code) => space_name(code),
            None => self.expr_to_string(arg),
        }
    }

    fn flag_arg(&self, arg: &Expr) -> String {
        match arg.as_int() {
            Some(0) => "NULL_SEMAPHORE".to_string(),
            _ => self.expr_to_string(arg),
        }
    }

    /// One-to-one lowering with argument pass-through.
    fn emit_passthrough(&mut self, target: &str, args: &[Expr]) -> CompileResult<()> {
        let args: Vec<String> = args.iter().map(|a| self.expr_to_string(a)).collect();
        self.line(&format!("{}({});", target, args.join(", ")));
        Ok(())
    }
}
