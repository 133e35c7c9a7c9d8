//! Core gap-filling modules

pub mod resolver;
pub mod extract;
pub mod spline;
pub mod reassemble;
pub mod pipeline;
pub mod monthly;

// Re-export main types
pub use resolver::{resolve_missing, missing_runs};
pub use extract::extract_series;
pub use spline::{SplineInterpolator, PixelCurve, ExtrapolationPolicy};
pub use reassemble::reassemble;
pub use pipeline::{
    GapFillProcessor, GapFillConfig, GapFillOutcome, GapFillReport, UnresolvedPixel
};
pub use monthly::{partition_by_month, month_mean};
