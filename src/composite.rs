//! # Overlay Compositing
//!
//! Blends pre-decoded RGBA overlays (light leaks, scratches, the timestamp
//! layer) onto RGB frames. Only the overlay's footprint is touched.

use serde::{Deserialize, Serialize};

use crate::assets::OverlayAsset;
use crate::error::{ConfigError, Result};
use crate::video::types::Frame;

/// How overlay color is combined with the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// `out = frame * (1 - k) + overlay * k`, with `k = opacity * alpha`
    #[default]
    Alpha,
    /// `out = frame + overlay * k`, saturating; brightens like real light spill
    Additive,
}

/// Alpha-blend `overlay` onto `frame` with its top-left corner at `position`
pub fn composite(frame: &mut Frame, overlay: &OverlayAsset, opacity: f32, position: (u32, u32)) -> Result<()> {
    composite_with(frame, overlay, opacity, position, BlendMode::Alpha)
}

/// Blend `overlay` onto `frame` using `mode`
///
/// Fails with `InvalidConfiguration` for an opacity outside `[0, 1]` and with
/// `AssetDimensionMismatch` when the overlay does not fit at `position`.
pub fn composite_with(
    frame: &mut Frame,
    overlay: &OverlayAsset,
    opacity: f32,
    position: (u32, u32),
    mode: BlendMode,
) -> Result<()> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(ConfigError::invalid("overlay.opacity", opacity).into());
    }
    overlay.ensure_fits(frame.width(), frame.height(), position)?;
    if opacity == 0.0 {
        return Ok(());
    }

    let frame_stride = frame.width() as usize * 3;
    let overlay_width = overlay.width() as usize;
    let overlay_stride = overlay_width * 4;
    let (x0, y0) = (position.0 as usize, position.1 as usize);
    let src = overlay.image().as_raw();
    let dst = frame.samples_mut();

    for row in 0..overlay.height() as usize {
        let src_row = &src[row * overlay_stride..(row + 1) * overlay_stride];
        let start = (y0 + row) * frame_stride + x0 * 3;
        let dst_row = &mut dst[start..start + overlay_width * 3];

        for (out, px) in dst_row.chunks_exact_mut(3).zip(src_row.chunks_exact(4)) {
            let k = opacity * (px[3] as f32 / 255.0);
            for c in 0..3 {
                let f = out[c] as f32;
                let o = px[c] as f32;
                let v = match mode {
                    BlendMode::Alpha => f * (1.0 - k) + o * k,
                    BlendMode::Additive => f + o * k,
                };
                out[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(())
}
