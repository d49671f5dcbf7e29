//! # Retro-Camcorder
//!
//! Give clean digital footage the look of analog camcorder tape and consumer film stock.
//!
//! This library provides a per-frame pipeline that color grades each frame with a film
//! simulation, optionally fringes and shakes it, lays light leaks over it and burns in a
//! glowing camcorder date stamp.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retro_camcorder::{
//!     assets::DirectoryAssetProvider,
//!     config::Config,
//!     pipeline::FramePipeline,
//!     video::{ImageSequenceSink, ImageSequenceSource},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.grade.profile = "portra_800_sim".to_string();
//! config.aberration.enabled = true;
//!
//! let leaks = DirectoryAssetProvider::new("light_leaks");
//! let pipeline = FramePipeline::from_config(&config, Some(&leaks))?;
//!
//! let mut source = ImageSequenceSource::open("frames_in/")?;
//! let mut sink = ImageSequenceSink::create("frames_out/")?;
//! pipeline.run_parallel(&mut source, &mut sink)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`grade`] - Film simulation profiles and the color grade engine
//! - [`effects`] - Chromatic aberration, jitter and seeded randomness
//! - [`assets`] - Light leaks, the timestamp overlay and the asset cache
//! - [`composite`] - Blending overlays onto frames
//! - [`pipeline`] - The ordered per-frame transform and its run loops
//! - [`video`] - Frame buffers, frame sources and frame sinks
//! - [`config`] - Configuration management
//!
//! ## Custom Stages
//!
//! Stages implement the [`FrameStage`](pipeline::FrameStage) trait:
//!
//! ```rust,no_run
//! use retro_camcorder::pipeline::{FrameContext, FrameStage};
//! use retro_camcorder::video::types::Frame;
//! use retro_camcorder::Result;
//!
//! struct Invert;
//!
//! impl FrameStage for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn apply(&self, frame: &mut Frame, _ctx: &mut FrameContext<'_>) -> Result<()> {
//!         for sample in frame.samples_mut() {
//!             *sample = 255 - *sample;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

pub mod assets;
pub mod composite;
pub mod config;
pub mod effects;
pub mod error;
pub mod grade;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    assets::{AssetCache, AssetProvider},
    config::Config,
    error::{CamcorderError, Result},
    grade::{ColorProfile, FilmSimulation, ProfileRegistry},
    pipeline::{FramePipeline, FrameStage, RunStats},
    video::types::Frame,
};
