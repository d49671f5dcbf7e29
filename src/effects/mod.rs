//! # Geometric Effects
//!
//! Optical and mechanical imperfections applied after color grading:
//!
//! - **Chromatic aberration**: red/blue channels pushed apart, green fixed
//! - **Jitter**: whole-frame random displacement, drawn fresh per frame
//!
//! Both are circular shifts, so no stage ever has to invent border pixels.

pub mod aberration;
pub mod jitter;
pub mod random;
pub mod shift;

pub use aberration::{apply_aberration, ChromaticAberration};
pub use jitter::{Jitter, JitterOffset};
pub use random::SeededRandom;
pub use shift::{roll, roll_channel, Axis};
