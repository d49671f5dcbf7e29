use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::pipeline::FramePipeline;
use crate::video::io::{FrameSink, FrameSource};
use crate::video::types::Frame;

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    /// Frames written to the sink
    pub frames: u64,
    pub elapsed: Duration,
}

impl RunStats {
    /// Processed frames per second of wall time
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

impl FramePipeline {
    /// Pull every frame from `source`, transform it and push it to `sink`, one at a time
    pub fn run(&self, source: &mut dyn FrameSource, sink: &mut dyn FrameSink) -> Result<RunStats> {
        let started = Instant::now();
        let mut index = 0u64;

        while !self.limit_reached(index) {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            sink.write_frame(self.process_indexed(index, frame)?)?;
            index += 1;

            if index % 100 == 0 {
                debug!("Processed {} frames", index);
            }
        }

        sink.finish()?;
        Ok(self.finish_stats(index, started))
    }

    /// Like [`run`](Self::run), transforming batches of frames on a worker pool.
    ///
    /// Frames reach the sink in source order and are identical to what `run`
    /// would produce for the same seed.
    pub fn run_parallel(&self, source: &mut dyn FrameSource, sink: &mut dyn FrameSink) -> Result<RunStats> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.processing_threads)
            .build()
            .map_err(|e| ConfigError::invalid("video.processing_threads", e))?;
        info!(
            "Processing with {} threads, {} frames per batch",
            self.processing_threads, self.batch_size
        );

        let started = Instant::now();
        let mut index = 0u64;
        let mut batch_num = 0usize;

        loop {
            let batch = self.read_batch(source, index)?;
            if batch.is_empty() {
                break;
            }

            let first = index;
            let count = batch.len() as u64;
            let processed: Vec<Frame> = pool.install(|| {
                batch
                    .into_par_iter()
                    .enumerate()
                    .map(|(offset, frame)| self.process_indexed(first + offset as u64, frame))
                    .collect::<Result<Vec<_>>>()
            })?;

            for frame in processed {
                sink.write_frame(frame)?;
            }

            index += count;
            batch_num += 1;
            debug!("Batch {} done ({} frames total)", batch_num, index);
        }

        sink.finish()?;
        Ok(self.finish_stats(index, started))
    }

    fn read_batch(&self, source: &mut dyn FrameSource, next_index: u64) -> Result<Vec<Frame>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut index = next_index;
        while batch.len() < self.batch_size && !self.limit_reached(index) {
            match source.next_frame()? {
                Some(frame) => batch.push(frame),
                None => break,
            }
            index += 1;
        }
        Ok(batch)
    }

    fn limit_reached(&self, index: u64) -> bool {
        self.max_frames.map_or(false, |max| index >= max)
    }

    fn finish_stats(&self, frames: u64, started: Instant) -> RunStats {
        let stats = RunStats {
            frames,
            elapsed: started.elapsed(),
        };
        info!(
            "Processed {} frames in {:.2}s ({:.1} fps)",
            stats.frames,
            stats.elapsed.as_secs_f64(),
            stats.fps()
        );
        stats
    }
}
