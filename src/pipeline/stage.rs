use rand::RngCore;

use crate::assets::{leak_for_frame, OverlayAsset, PlacedOverlay};
use crate::composite::{composite, composite_with, BlendMode};
use crate::config::LeakSchedule;
use crate::effects::{ChromaticAberration, Jitter, SeededRandom};
use crate::error::Result;
use crate::grade::ColorGrader;
use crate::video::types::Frame;

/// Per-frame inputs shared by every stage
pub struct FrameContext<'a> {
    /// Position of the frame in the stream
    pub index: u64,

    /// Random draws for this frame only
    pub rng: &'a mut dyn RngCore,

    /// Run-wide seed, for draws that must agree across frames
    pub random: &'a SeededRandom,
}

/// One step of the per-frame transform
pub trait FrameStage: Send + Sync {
    /// Returns the unique name of this stage
    fn name(&self) -> &str;

    /// Transform the frame in place
    ///
    /// Must not keep anything from one call to the next: the frame and the
    /// context are the only inputs.
    fn apply(&self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> Result<()>;
}

pub struct GradeStage {
    grader: ColorGrader,
}

impl GradeStage {
    pub fn new(grader: ColorGrader) -> Self {
        Self { grader }
    }
}

impl FrameStage for GradeStage {
    fn name(&self) -> &str {
        "color_grade"
    }

    fn apply(&self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.grader.apply(frame, ctx.rng);
        Ok(())
    }
}

pub struct AberrationStage {
    aberration: ChromaticAberration,
}

impl AberrationStage {
    pub fn new(aberration: ChromaticAberration) -> Self {
        Self { aberration }
    }
}

impl FrameStage for AberrationStage {
    fn name(&self) -> &str {
        "chromatic_aberration"
    }

    fn apply(&self, frame: &mut Frame, _ctx: &mut FrameContext<'_>) -> Result<()> {
        self.aberration.apply(frame);
        Ok(())
    }
}

pub struct JitterStage {
    jitter: Jitter,
}

impl JitterStage {
    pub fn new(jitter: Jitter) -> Self {
        Self { jitter }
    }
}

impl FrameStage for JitterStage {
    fn name(&self) -> &str {
        "jitter"
    }

    fn apply(&self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.jitter.apply(frame, ctx.rng);
        Ok(())
    }
}

pub struct LightLeakStage {
    leaks: Vec<OverlayAsset>,
    position: (u32, u32),
    opacity: f32,
    blend: BlendMode,
    schedule: LeakSchedule,
}

impl LightLeakStage {
    pub fn new(
        leaks: Vec<OverlayAsset>,
        position: (u32, u32),
        opacity: f32,
        blend: BlendMode,
        schedule: LeakSchedule,
    ) -> Self {
        Self {
            leaks,
            position,
            opacity,
            blend,
            schedule,
        }
    }
}

impl FrameStage for LightLeakStage {
    fn name(&self) -> &str {
        "light_leaks"
    }

    fn apply(&self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> Result<()> {
        let pick = leak_for_frame(&self.schedule, ctx.random, ctx.index, self.leaks.len(), self.opacity);
        if let Some((leak, opacity)) = pick {
            composite_with(frame, &self.leaks[leak], opacity, self.position, self.blend)?;
        }
        Ok(())
    }
}

pub struct TimestampStage {
    overlay: PlacedOverlay,
}

impl TimestampStage {
    pub fn new(overlay: PlacedOverlay) -> Self {
        Self { overlay }
    }
}

impl FrameStage for TimestampStage {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn apply(&self, frame: &mut Frame, _ctx: &mut FrameContext<'_>) -> Result<()> {
        composite(frame, &self.overlay.asset, 1.0, self.overlay.position)
    }
}
