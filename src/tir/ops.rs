// This module defines the closed catalog of opaque DLC tile operations. The
// upstream framework dispatched these through a string-keyed registration
// table with attribute maps; here the catalog is a tagged enum with a const
// info table, so the synthesizer's dispatch is an exhaustive match checked at
// compile time instead of a runtime string comparison. Every entry carries a
// fixed argument arity and the Opaque effect marker: side effects (hardware
// state, memory, synchronization counters) are real even when not represented
// as explicit data dependencies, so no optimizer upstream of lowering may
// reorder, duplicate or eliminate these calls.

//! The opaque DLC operation catalog.
//!
//! Entries are fixed at build time. The catalog partitions into families:
//! binary arithmetic (vector-vector and vector-scalar), unary
//! transcendentals, memory fill/copy, DMA, and synchronization.

/// Effect classification of a catalog operation.
///
/// All current entries are [`EffectKind::Opaque`]; the variant exists so the
/// marker is an explicit part of each descriptor rather than an implicit
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Unmodeled side effects; must never be reordered, duplicated or
    /// removed by optimization.
    Opaque,
}

/// One opaque DLC tile operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileOp {
    // Binary arithmetic (template_tag, dst, src0, src1, count)
    Add,
    Sub,
    Mul,
    Div,
    // Vector-scalar arithmetic (template_tag, dst, src0, scalar, count)
    AddScalar,
    SubScalar,
    MulScalar,
    DivScalar,
    // Unary transcendentals. Abs carries a template tag; the rest are
    // (dst, src, count).
    Abs,
    Exp,
    Log,
    Sqrt,
    Rsqrt,
    Relu,
    // Memory (dst, value_or_src, count)
    Fill,
    Copy,
    // DMA (src_ptr, src_space, dst_ptr, dst_space, length,
    //      src_stride, dst_stride, src_flag, dst_flag)
    Dma,
    // Synchronization
    Sync,
    SyncDone,
    SyncGte,
    SyncClear,
    Barrier,
}

/// Immutable descriptor of a catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub name: &'static str,
    pub arity: u32,
    pub effect: EffectKind,
}

impl TileOp {
    pub const fn info(self) -> OpInfo {
        use TileOp::*;
        const fn op(name: &'static str, arity: u32) -> OpInfo {
            OpInfo {
                name,
                arity,
                effect: EffectKind::Opaque,
            }
        }
        match self {
            Add => op("dlc.add", 5),
            Sub => op("dlc.sub", 5),
            Mul => op("dlc.mul", 5),
            Div => op("dlc.div", 5),
            AddScalar => op("dlc.add_scalar", 5),
            SubScalar => op("dlc.sub_scalar", 5),
            MulScalar => op("dlc.mul_scalar", 5),
            DivScalar => op("dlc.div_scalar", 5),
            Abs => op("dlc.abs", 4),
            Exp => op("dlc.exp", 3),
            Log => op("dlc.log", 3),
            Sqrt => op("dlc.sqrt", 3),
            Rsqrt => op("dlc.rsqrt", 3),
            Relu => op("dlc.relu", 3),
            Fill => op("dlc.fill", 3),
            Copy => op("dlc.copy", 3),
            Dma => op("dlc.dma", 9),
            Sync => op("dlc.sync", 1),
            SyncDone => op("dlc.sync_done", 1),
            SyncGte => op("dlc.sync_gte", 2),
            SyncClear => op("dlc.sync_clear", 1),
            Barrier => op("dlc.barrier", 0),
        }
    }

    /// Catalog lookup by operation name.
    pub fn from_name(s: &str) -> Option<Self> {
        use TileOp::*;
        match s {
            "dlc.add" => Some(Add),
            "dlc.sub" => Some(Sub),
            "dlc.mul" => Some(Mul),
            "dlc.div" => Some(Div),
            "dlc.add_scalar" => Some(AddScalar),
            "dlc.sub_scalar" => Some(SubScalar),
            "dlc.mul_scalar" => Some(MulScalar),
            "dlc.div_scalar" => Some(DivScalar),
            "dlc.abs" => Some(Abs),
            "dlc.exp" => Some(Exp),
            "dlc.log" => Some(Log),
            "dlc.sqrt" => Some(Sqrt),
            "dlc.rsqrt" => Some(Rsqrt),
            "dlc.relu" => Some(Relu),
            "dlc.fill" => Some(Fill),
            "dlc.copy" => Some(Copy),
            "dlc.dma" => Some(Dma),
            "dlc.sync" => Some(Sync),
            "dlc.sync_done" => Some(SyncDone),
            "dlc.sync_gte" => Some(SyncGte),
            "dlc.sync_clear" => Some(SyncClear),
            "dlc.barrier" => Some(Barrier),
            _ => None,
        }
    }

    /// All catalog entries, in registration order.
    pub const ALL: [TileOp; 22] = [
        TileOp::Add,
        TileOp::Sub,
        TileOp::Mul,
        TileOp::Div,
        TileOp::AddScalar,
        TileOp::SubScalar,
        TileOp::MulScalar,
        TileOp::DivScalar,
        TileOp::Abs,
        TileOp::Exp,
        TileOp::Log,
        TileOp::Sqrt,
        TileOp::Rsqrt,
        TileOp::Relu,
        TileOp::Fill,
        TileOp::Copy,
        TileOp::Dma,
        TileOp::Sync,
        TileOp::SyncDone,
        TileOp::SyncGte,
        TileOp::SyncClear,
        TileOp::Barrier,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_roundtrip() {
        for op in TileOp::ALL {
            let info = op.info();
            assert_eq!(TileOp::from_name(info.name), Some(op));
            assert_eq!(info.effect, EffectKind::Opaque);
        }
        assert_eq!(TileOp::from_name("dlc.unknown"), None);
    }

    #[test]
    fn test_catalog_arities() {
        assert_eq!(TileOp::Add.info().arity, 5);
        assert_eq!(TileOp::Abs.info().arity, 4);
        assert_eq!(TileOp::Exp.info().arity, 3);
        assert_eq!(TileOp::Fill.info().arity, 3);
        assert_eq!(TileOp::Dma.info().arity, 9);
        assert_eq!(TileOp::SyncGte.info().arity, 2);
        assert_eq!(TileOp::Barrier.info().arity, 0);
    }
}
