//! Grading stages — adjustment and duotone mapping.

pub mod adjust;
pub mod duotone;

pub use adjust::{adjust_pixel, apply_adjustments};
pub use duotone::{apply_duotone, duotone_pixel};
