pub mod combinatorics;
pub mod gaps;
pub mod position;

pub use gaps::{analyze_gaps, GapStats};
pub use position::{combination_at, position_of, PositionError, TOTAL_POSITIONS};
