use std::collections::VecDeque;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AssetError, FrameError, Result};
use crate::video::types::Frame;

/// Supplies decoded frames one at a time, in presentation order
pub trait FrameSource {
    /// Returns `Ok(None)` once the stream is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Accepts processed frames, in presentation order
pub trait FrameSink {
    fn write_frame(&mut self, frame: Frame) -> Result<()>;

    /// Called once after the last frame
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frame source backed by an in-memory queue
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<Frame>,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

/// Frame sink collecting frames into memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<Frame>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        self.frames.push(frame);
        Ok(())
    }
}

/// Reads a directory of still images as a frame sequence, ordered by file name
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(AssetError::NotFound {
                path: directory.display().to_string(),
            }
            .into());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && !is_hidden_file(&path) && is_image_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        info!("Found {} frames in {:?}", paths.len(), directory);
        Ok(Self {
            paths: paths.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Dimensions of the first frame, read from its header without decoding it
    pub fn probe_dimensions(&self) -> Result<Option<(u32, u32)>> {
        let Some(path) = self.paths.front() else {
            return Ok(None);
        };
        let dimensions = image::image_dimensions(path).map_err(|e| AssetError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(dimensions))
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };

        debug!("Decoding frame {:?}", path);
        let image = image::open(&path).map_err(|e| AssetError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(Frame::new(image.to_rgb8())))
    }
}

/// Writes frames as numbered PNG files (`frame_000000.png`, ...)
pub struct ImageSequenceSink {
    directory: PathBuf,
    written: u64,
}

impl ImageSequenceSink {
    pub fn create<P: Into<PathBuf>>(directory: P) -> Result<Self> {
        let directory = directory.into();
        create_dir_all(&directory)?;
        Ok(Self {
            directory,
            written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let path = self
            .directory
            .join(format!("frame_{:06}.png", self.written));
        frame
            .save_png(&path)
            .map_err(|e| FrameError::WriteFailed {
                index: self.written,
                reason: e.to_string(),
            })?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!("Wrote {} frames to {:?}", self.written, self.directory);
        Ok(())
    }
}

pub(crate) fn is_image_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png") | Some("jpg") | Some("jpeg")
    )
}

pub(crate) fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
