//! Polyline topology edits: join, split, explode and parallel offset.

mod merge;
mod offset;
mod split;

pub use merge::{chain_endpoints, merge_collinear, merge_pair, merge_polylines, simplify};
pub use offset::{offset_layer_name, offset_polyline, offset_side_is_left, project_onto, vertex_pegs, OFFSET_PEG_PREFIX};
pub use split::{explode, split_polyline};

/// Points closer than this are duplicates after a merge.
pub const DUPLICATE_TOLERANCE: f64 = 1e-3;

/// Maximum angular deviation, in degrees, treated as collinear.
pub const COLLINEAR_DEGREES: f64 = 1.0;

/// Reasons a topology edit could not be carried out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("Select a polyline first")]
    NoSelection,
    #[error("Select at least two polylines to join")]
    TooFewToMerge,
    #[error("No polylines could be joined")]
    NothingMerged,
    #[error("Polyline needs at least {0} distinct points")]
    Degenerate(usize),
    #[error("Split point is at an end of the polyline")]
    SplitAtEnd,
    #[error("Offset distance must be a positive number")]
    InvalidDistance,
    #[error("Offset failed: {0}")]
    OffsetFailed(String),
}
