use tracing::debug;

use crate::effects::shift::{roll_channel, Axis};
use crate::video::types::Frame;

/// Lens color fringing: red moves `+offset_px`, blue moves `-offset_px`,
/// green stays put. Shifts wrap around so no empty border appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaticAberration {
    pub offset_px: i32,
    pub axis: Axis,
}

impl ChromaticAberration {
    pub fn new(offset_px: i32, axis: Axis) -> Self {
        Self { offset_px, axis }
    }

    pub fn apply(&self, frame: &mut Frame) {
        apply_aberration(frame, self.offset_px, self.axis);
    }
}

/// Offsets beyond the frame extent along `axis` are clamped to it
pub fn apply_aberration(frame: &mut Frame, offset_px: i32, axis: Axis) {
    let extent = match axis {
        Axis::Horizontal => frame.width(),
        Axis::Vertical => frame.height(),
    } as i32;
    let offset = offset_px.clamp(-extent, extent);
    if offset == 0 {
        return;
    }
    if offset != offset_px {
        debug!("Aberration offset {} clamped to {}", offset_px, offset);
    }

    roll_channel(frame, 0, offset, axis);
    roll_channel(frame, 2, -offset, axis);
}
