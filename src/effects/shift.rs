//! Circular (wraparound) shifts over whole frames and single channels.
//!
//! A shift of `+n` moves content towards higher coordinates: output pixel `x`
//! takes the value of input pixel `(x - n) mod width`.

use serde::{Deserialize, Serialize};

use crate::video::types::Frame;

const CHANNELS: usize = 3;

/// Axis along which a shift is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Roll the whole frame by `(dx, dy)` with wraparound
pub fn roll(frame: &Frame, dx: i32, dy: i32) -> Frame {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    if width == 0 || height == 0 {
        return frame.clone();
    }

    let sx = (dx as i64).rem_euclid(width as i64) as usize;
    let sy = (dy as i64).rem_euclid(height as i64) as usize;
    if sx == 0 && sy == 0 {
        return frame.clone();
    }

    let stride = width * CHANNELS;
    let split = (width - sx) * CHANNELS;
    let src = frame.samples();
    let mut out = frame.clone();
    let dst = out.samples_mut();

    for y in 0..height {
        let src_y = (y + height - sy) % height;
        let src_row = &src[src_y * stride..(src_y + 1) * stride];
        let dst_row = &mut dst[y * stride..(y + 1) * stride];
        dst_row[sx * CHANNELS..].copy_from_slice(&src_row[..split]);
        dst_row[..sx * CHANNELS].copy_from_slice(&src_row[split..]);
    }

    out
}

/// Roll a single channel in place by `offset` pixels along `axis`
pub fn roll_channel(frame: &mut Frame, channel: usize, offset: i32, axis: Axis) {
    debug_assert!(channel < CHANNELS);
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let len = match axis {
        Axis::Horizontal => width,
        Axis::Vertical => height,
    };
    if width == 0 || height == 0 {
        return;
    }
    let shift = (offset as i64).rem_euclid(len as i64) as usize;
    if shift == 0 {
        return;
    }

    let original: Vec<u8> = frame
        .samples()
        .iter()
        .skip(channel)
        .step_by(CHANNELS)
        .copied()
        .collect();
    let dst = frame.samples_mut();

    for y in 0..height {
        for x in 0..width {
            let (src_x, src_y) = match axis {
                Axis::Horizontal => ((x + width - shift) % width, y),
                Axis::Vertical => (x, (y + height - shift) % height),
            };
            dst[(y * width + x) * CHANNELS + channel] = original[src_y * width + src_x];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [x as u8, y as u8, (x + y * width) as u8]);
            }
        }
        frame
    }

    #[test]
    fn test_roll_wraps_both_axes() {
        let frame = gradient(4, 3);
        let rolled = roll(&frame, 1, -1);

        for y in 0..3u32 {
            for x in 0..4u32 {
                let src_x = (x + 4 - 1) % 4;
                let src_y = (y + 1) % 3;
                assert_eq!(rolled.get_pixel(x, y), frame.get_pixel(src_x, src_y));
            }
        }
    }

    #[test]
    fn test_full_period_roll_is_identity() {
        let frame = gradient(5, 2);
        assert_eq!(roll(&frame, 5, 2), frame);
        assert_eq!(roll(&frame, -10, 4), frame);
    }

    #[test]
    fn test_roll_channel_leaves_other_channels() {
        let frame = gradient(4, 4);
        let mut shifted = frame.clone();
        roll_channel(&mut shifted, 0, 1, Axis::Horizontal);

        for y in 0..4u32 {
            for x in 0..4u32 {
                let px = shifted.get_pixel(x, y);
                assert_eq!(px[0], frame.get_pixel((x + 3) % 4, y)[0]);
                assert_eq!(px[1], frame.get_pixel(x, y)[1]);
                assert_eq!(px[2], frame.get_pixel(x, y)[2]);
            }
        }
    }

    #[test]
    fn test_roll_channel_vertical() {
        let frame = gradient(2, 3);
        let mut shifted = frame.clone();
        roll_channel(&mut shifted, 2, -1, Axis::Vertical);

        for y in 0..3u32 {
            for x in 0..2u32 {
                assert_eq!(shifted.get_pixel(x, y)[2], frame.get_pixel(x, (y + 1) % 3)[2]);
            }
        }
    }
}
