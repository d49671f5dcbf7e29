use rand::Rng;

use crate::effects::shift::roll;
use crate::video::types::Frame;

/// Displacement drawn for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JitterOffset {
    pub dx: i32,
    pub dy: i32,
}

/// Tape/gate instability: every frame is rolled by a fresh random vector in
/// `[-max_shift_px, max_shift_px]` on both axes. No drift carries between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    pub max_shift_px: u32,
}

impl Jitter {
    pub fn new(max_shift_px: u32) -> Self {
        Self { max_shift_px }
    }

    /// Draw the vertical then horizontal displacement
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> JitterOffset {
        if self.max_shift_px == 0 {
            return JitterOffset::default();
        }
        let k = self.max_shift_px.min(i32::MAX as u32) as i32;
        let dy = rng.gen_range(-k..=k);
        let dx = rng.gen_range(-k..=k);
        JitterOffset { dx, dy }
    }

    /// Shift the frame and report the displacement used
    pub fn apply<R: Rng + ?Sized>(&self, frame: &mut Frame, rng: &mut R) -> JitterOffset {
        let offset = self.draw(rng);
        if offset != JitterOffset::default() {
            *frame = roll(frame, offset.dx, offset.dy);
        }
        offset
    }
}
