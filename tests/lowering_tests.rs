//! End-to-end lowering tests.
//!
//! These tests drive the full pipeline: textual tile IR in, generated DLC C
//! source out, using the #[test] framework with pattern assertions over the
//! emitted text.

use dlcgen::dlc::build_module;
use dlcgen::tir::{DType, Expr, Param, PrimFunc, Stmt, TileOp, TirModule};

/// Helper to check if output contains expected patterns
fn check_output_contains(output: &str, patterns: &[&str]) {
    for pattern in patterns {
        assert!(
            output.contains(pattern),
            "Output missing expected pattern: '{pattern}'\nFull output:\n{output}"
        );
    }
}

fn lower_text(text: &str) -> String {
    let module = TirModule::parse(text).expect("parse failed");
    build_module(&module).expect("lowering failed").code
}

#[test]
fn test_vecadd_full_tiles() {
    // One non-aliased float pointer per operand, 4096 elements: the loop
    // covers exactly 4 full 1024-element tiles, mask derived from a full
    // len each iteration, zero partial tiles.
    let code = lower_text(
        r#"
func vecadd(%a: *f32, %b: *f32, %c: *f32) noalias {
    call dlc.add("DLCAdd<float>", %c, %a, %b, 4096)
}
"#,
    );
    check_output_contains(
        &code,
        &[
            "void vecadd(float* __restrict__ a, float* __restrict__ b, float* __restrict__ c) {",
            "for (int _dlc_vec_i = 0; _dlc_vec_i < 4096; _dlc_vec_i += 1024)",
            "int _dlc_vec_len = min(4096 - _dlc_vec_i, 1024);",
            "int _dlc_vec_mask = pre_exp2(_dlc_vec_len/128);",
            "_dlc_vec_o = v_f32_add_b(_dlc_vec_x, _dlc_vec_y);",
            "v_f32_st_tnsr_st_msk(_dlc_vec_i/32, c, 1, _dlc_vec_mask, _dlc_vec_o);",
        ],
    );
}

#[test]
fn test_vecadd_partial_tile() {
    // 1050 elements: second iteration's len is 26, handled by the min()
    // residual computation rather than an alignment requirement.
    let code = lower_text(
        r#"
func vecadd(%a: *f32, %b: *f32, %c: *f32) noalias {
    call dlc.add("DLCAdd<float>", %c, %a, %b, 1050)
}
"#,
    );
    check_output_contains(
        &code,
        &[
            "_dlc_vec_i < 1050",
            "min(1050 - _dlc_vec_i, 1024)",
        ],
    );
}

#[test]
fn test_dma_spaces_and_sentinels() {
    // Space codes 1 and 2 emit HBM and VMEM; both zero flags become the
    // no-synchronization sentinel.
    let code = lower_text(
        r#"
func stage(%src: *f32, %dst: *f32) {
    call dlc.dma(%src, 1, %dst, 2, 4096, 128, 128, 0, 0)
}
"#,
    );
    check_output_contains(
        &code,
        &["dlc_dma_new(src, HBM, dst, VMEM, 4096, 128, 128, NULL_SEMAPHORE, NULL_SEMAPHORE, 128, 2);"],
    );
}

#[test]
fn test_sync_pipeline_kernel() {
    let code = lower_text(
        r#"
func pipeline(%src: *f32, %dst: *f32) {
    local %dma_flag: i32[1] @local
    call dlc.dma(%src, 1, %dst, 2, 1024, 128, 128, 0, %dma_flag)
    call dlc.sync(%dma_flag)
    call dlc.sync_gte(%dma_flag, 2)
    call dlc.sync_clear(%dma_flag)
    call dlc.barrier()
}
"#,
    );
    check_output_contains(
        &code,
        &[
            // Name heuristic: "flag" forces semaphore storage over @local.
            "int SEMAPHORE_SPACE dma_flag[1];",
            "NULL_SEMAPHORE, dma_flag, 128, 2);",
            "dlc_sync_new(dma_flag);",
            "dlc_sync_gte_new(dma_flag, 2);",
            "dlc_sync_clear_new(dma_flag);",
            "barrier();",
        ],
    );
}

#[test]
fn test_unary_and_memory_kernel() {
    let code = lower_text(
        r#"
func activate(%x: *f32, %y: *f32) noalias {
    local %tmp: f32[2048] @vmem
    call dlc.fill(%tmp, 0.0, 2048)
    call dlc.exp(%tmp, %x, 2048)
    call dlc.relu(%y, %tmp, 2048)
}
"#,
    );
    check_output_contains(
        &code,
        &[
            "float VMEM_SPACE tmp[2048];",
            "vmem_fill(tmp, 0.0f, 2048);",
            "int _dlc_vec_size128b = 2048 / 32;",
            "#pragma clang loop unroll_count(2)",
            "_dlc_vec_x = v_f32_exp(_dlc_vec_x);",
            "_dlc_vec_1_x = v_f32_relu(_dlc_vec_1_x);",
        ],
    );
}

#[test]
fn test_hundred_ops_distinct_temp_groups() {
    // Lowering 100 independent binary ops produces 100 distinct temporary
    // name groups with no duplicate generated loop variable.
    let call = Stmt::Eval(Expr::Call {
        op: TileOp::Add,
        args: vec![
            Expr::Str("DLCAdd<float>".into()),
            Expr::Var("c".into()),
            Expr::Var("a".into()),
            Expr::Var("b".into()),
            Expr::IntImm(4096),
        ],
    });
    let func = PrimFunc {
        name: "many".into(),
        params: ["a", "b", "c"]
            .into_iter()
            .map(|name| Param {
                name: name.into(),
                dtype: DType::Float32,
                is_pointer: true,
                scope: String::new(),
            })
            .collect(),
        body: Stmt::Block(vec![call; 100]),
        no_alias: true,
        non_restrict: vec![],
    };
    let module = TirModule {
        functions: vec![func],
    };
    let code = build_module(&module).unwrap().code;

    let mut loop_vars: Vec<&str> = code
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let rest = line.strip_prefix("for (int ")?;
            Some(rest.split(" = ").next().unwrap())
        })
        .collect();
    assert_eq!(loop_vars.len(), 100);
    loop_vars.sort_unstable();
    loop_vars.dedup();
    assert_eq!(loop_vars.len(), 100, "duplicate generated loop variables");
}

#[test]
fn test_temp_names_avoid_user_identifiers() {
    // A user buffer already named like the generated prefix must not be
    // shadowed by a synthesized temporary.
    let code = lower_text(
        r#"
func clash(%a: *f32, %b: *f32) {
    local %_dlc_vec: f32[128] @vmem
    call dlc.add("DLCAdd<float>", %_dlc_vec, %a, %b, 128)
}
"#,
    );
    check_output_contains(
        &code,
        &[
            "float VMEM_SPACE _dlc_vec[128];",
            "for (int _dlc_vec_1_i = 0;",
        ],
    );
}

#[test]
fn test_temp_names_avoid_derived_user_identifiers() {
    // A user buffer colliding with a name the loop shape derives from the
    // group (here the _x load temporary) pushes the whole group to the next
    // counter value; _dlc_vec itself being free is not enough.
    let code = lower_text(
        r#"
func clash(%a: *f32, %b: *f32) {
    local %_dlc_vec_x: f32[128] @vmem
    call dlc.add("DLCAdd<float>", %_dlc_vec_x, %a, %b, 128)
}
"#,
    );
    check_output_contains(
        &code,
        &[
            "float VMEM_SPACE _dlc_vec_x[128];",
            "float8_128 _dlc_vec_1_x, _dlc_vec_1_y, _dlc_vec_1_o;",
            "for (int _dlc_vec_1_i = 0;",
            "v_f32_st_tnsr_st_msk(_dlc_vec_1_i/32, _dlc_vec_x, 1, _dlc_vec_1_mask, _dlc_vec_1_o);",
        ],
    );
}

#[test]
fn test_module_function_names_ordered() {
    let module = TirModule::parse(
        r#"
func first() { call dlc.barrier() }
func second() { call dlc.barrier() }
"#,
    )
    .unwrap();
    let source = build_module(&module).unwrap();
    assert_eq!(
        source.function_names,
        vec!["first".to_string(), "second".to_string()]
    );
    let first_pos = source.code.find("void first").unwrap();
    let second_pos = source.code.find("void second").unwrap();
    assert!(first_pos < second_pos);
    assert!(source.code.starts_with("// dlcgen"));
}
