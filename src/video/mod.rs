//! # Video Frames
//!
//! The frame buffer type and the seams through which frames enter and leave
//! the pipeline. Container demuxing and encoding live behind [`FrameSource`]
//! and [`FrameSink`]; the crate ships in-memory and image-sequence adapters.

pub mod io;
pub mod types;

pub use io::{FrameSink, FrameSource, ImageSequenceSink, ImageSequenceSource, MemorySink, MemorySource};
pub use types::Frame;
