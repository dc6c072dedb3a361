//! Post-processing of fitted coefficients.

pub mod summary;
pub mod surface;

pub use summary::{CouplingSummarizer, CouplingSummary};
pub use surface::{CouplingSurface, CouplingSurfaceReconstructor};
