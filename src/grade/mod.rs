//! # Color Grading
//!
//! Film simulations expressed as parameter sets and the engine that applies
//! them to frames.
//!
//! ## Built-in Simulations
//!
//! - **modern_fuji_sim**: mild warmth, slight bleach bypass
//! - **terracotta_sun_sim**: saturated orange, blue-dominant areas kept cool
//! - **portra_800_sim**: bright and warm with heavy grain
//! - **reala_ace_sim**: cool greens, low contrast
//! - **dreamy_negative_sim**: lifted shadows, rolled-off highlights
//!
//! ## Usage
//!
//! ```rust
//! use rand::{rngs::SmallRng, SeedableRng};
//! use retro_camcorder::grade::{ColorGrader, ProfileRegistry};
//! use retro_camcorder::video::Frame;
//!
//! let registry = ProfileRegistry::new();
//! let grader = ColorGrader::from_name(&registry, "portra_800_sim").unwrap();
//!
//! let mut frame = Frame::new_filled(64, 48, [90, 120, 150]);
//! grader.apply(&mut frame, &mut SmallRng::seed_from_u64(7));
//! ```

pub mod engine;
pub mod profile;
pub mod registry;

pub use engine::{apply_profile, ColorGrader};
pub use profile::{BlueCast, ColorProfile, FilmSimulation, ToneShape};
pub use registry::ProfileRegistry;
