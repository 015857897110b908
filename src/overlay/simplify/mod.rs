//! Shape simplification for low-magnification painting
//!
//! # Submodules
//! - `precision` - Grid snapping, ring collapse and topology clean-up
//! - `degenerate` - Removal of rings smaller than the grid
//! - `schedule` - Downsample thresholds at which levels are computed

mod precision;
mod degenerate;
mod schedule;

pub use precision::{
    PrecisionReducer,
    snap_coord,
};

pub use degenerate::DegenerateFilter;

pub use schedule::{
    auto_step,
    ThresholdLadder,
    LARGE_SHAPE_STEP,
    MEDIUM_SHAPE_STEP,
    SMALL_SHAPE_STEP,
};
