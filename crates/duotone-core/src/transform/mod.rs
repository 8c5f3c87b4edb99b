//! Transform pipeline — parameter definitions and evaluation.

pub mod evaluate;
pub mod params;
