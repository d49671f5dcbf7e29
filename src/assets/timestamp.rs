use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::assets::font::OsdFont;
use crate::assets::overlay::{OverlayAsset, PlacedOverlay};
use crate::config::TimestampConfig;
use crate::error::{AssetError, Result};

/// Glyph height as a fraction of frame height
const FONT_SIZE_RATIO: f32 = 0.025;

/// Margin from the frame edges as a fraction of width/height
const PADDING_RATIO: f32 = 0.03;

/// Halo stamps at 1..=GLOW_RADIUS pixels around the text
const GLOW_RADIUS: i32 = 3;

/// Glyph size used for a frame `frame_height` pixels tall
pub fn font_pixel_height(frame_height: u32) -> f32 {
    (frame_height as f32 * FONT_SIZE_RATIO).floor().max(1.0)
}

/// Render the date (bottom-left) and message (top-right) with an orange glow,
/// in the font `config` asks for.
pub fn render_timestamp(
    frame_width: u32,
    frame_height: u32,
    config: &TimestampConfig,
) -> Result<Option<PlacedOverlay>> {
    let font = OsdFont::for_timestamp(&config.font, font_pixel_height(frame_height));
    render_timestamp_with(frame_width, frame_height, config, &font)
}

/// Render the timestamp layer with an already resolved font.
///
/// The result is trimmed to the area that actually holds text; its position
/// is where that area sits in the frame. Returns `None` when there is nothing
/// to draw.
pub fn render_timestamp_with(
    frame_width: u32,
    frame_height: u32,
    config: &TimestampConfig,
    font: &OsdFont,
) -> Result<Option<PlacedOverlay>> {
    if frame_width == 0 || frame_height == 0 {
        return Err(AssetError::RenderFailed {
            asset: "timestamp".to_string(),
            reason: format!("frame size {}x{}", frame_width, frame_height),
        }
        .into());
    }

    let date = config.date_text();
    let date = date.trim();
    let message = config.message.trim();
    let padding_x = (frame_width as f32 * PADDING_RATIO) as i32;
    let padding_y = (frame_height as f32 * PADDING_RATIO) as i32;

    let mut texts: Vec<(&str, i32, i32)> = Vec::new();
    if !date.is_empty() {
        let (_, h) = font.text_size(date);
        texts.push((date, padding_x, frame_height as i32 - h as i32 - padding_y));
    }
    if !message.is_empty() {
        let (w, _) = font.text_size(message);
        texts.push((message, frame_width as i32 - padding_x - w as i32, padding_y));
    }
    if texts.is_empty() {
        return Ok(None);
    }

    debug!(
        "Rendering timestamp '{}' / '{}' with {} font",
        date,
        message,
        if font.is_outline() { "outline" } else { "bitmap" }
    );

    let [hr, hg, hb, ha] = config.halo_color;

    // Transparent pixels carry the halo color so the blur only spreads alpha
    let mut glow = RgbaImage::from_pixel(frame_width, frame_height, Rgba([hr, hg, hb, 0]));
    let mut stamp_halo = |px: &mut Rgba<u8>, coverage: f32| {
        let alpha = (ha as f32 * coverage).round() as u8;
        px[3] = px[3].max(alpha);
    };
    for &(text, x, y) in &texts {
        for i in (1..=GLOW_RADIUS).rev() {
            font.draw(&mut glow, x + i, y + i, text, &mut stamp_halo);
            font.draw(&mut glow, x - i, y - i, text, &mut stamp_halo);
            font.draw(&mut glow, x, y + i, text, &mut stamp_halo);
            font.draw(&mut glow, x, y - i, text, &mut stamp_halo);
        }
    }

    let mut layer = if config.glow_sigma > 0.0 {
        image::imageops::blur(&glow, config.glow_sigma)
    } else {
        glow
    };

    for &(text, x, y) in &texts {
        font.draw(&mut layer, x, y, text, |px, coverage| {
            blend_over(px, config.core_color, coverage)
        });
    }

    Ok(OverlayAsset::new("timestamp", layer)
        .trimmed()
        .map(|(asset, position)| PlacedOverlay::new(asset, position)))
}

/// Source-over of `color` at `alpha` onto a straight-alpha pixel
fn blend_over(px: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let below = px[3] as f32 / 255.0 * (1.0 - a);
    let out = a + below;
    for c in 0..3 {
        let v = (color[c] as f32 * a + px[c] as f32 * below) / out;
        px[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    px[3] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::font::BitmapFont;
    use crate::config::TimestampFont;

    fn config(date: &str, message: &str) -> TimestampConfig {
        TimestampConfig {
            date: Some(date.to_string()),
            message: message.to_string(),
            font: TimestampFont::Bitmap,
            ..TimestampConfig::default()
        }
    }

    fn bitmap_for(frame_height: u32) -> OsdFont {
        OsdFont::Bitmap(BitmapFont::for_height(font_pixel_height(frame_height)))
    }

    #[test]
    fn test_layer_fits_frame() {
        let placed = render_timestamp(320, 240, &config("07-04-'98", "REC"))
            .unwrap()
            .unwrap();
        assert!(placed.asset.ensure_fits(320, 240, placed.position).is_ok());
    }

    #[test]
    fn test_system_font_layer_fits_frame() {
        let mut cfg = config("07-04-'98", "REC");
        cfg.font = TimestampFont::default();
        let placed = render_timestamp(640, 480, &cfg).unwrap().unwrap();
        assert!(placed.asset.ensure_fits(640, 480, placed.position).is_ok());
        assert!(placed.asset.image().pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_date_sits_bottom_left_and_message_top_right() {
        let placed = render_timestamp_with(400, 300, &config("07-04-'98", "REC"), &bitmap_for(300))
            .unwrap()
            .unwrap();
        let (x, y) = placed.position;
        let (w, h) = placed.asset.image().dimensions();

        // Spans from the left padding to the right padding, top to bottom
        assert!(x < 20);
        assert!(x + w > 380);
        assert!(y < 20);
        assert!(y + h > 280);
    }

    #[test]
    fn test_core_color_present() {
        let cfg = config("12-25-'89", "");
        let placed = render_timestamp_with(320, 240, &cfg, &bitmap_for(240))
            .unwrap()
            .unwrap();
        let core = cfg.core_color;
        assert!(placed
            .asset
            .image()
            .pixels()
            .any(|p| p.0 == [core[0], core[1], core[2], 255]));
    }

    #[test]
    fn test_halo_surrounds_core() {
        let mut cfg = config("1", "");
        cfg.glow_sigma = 0.0;
        let placed = render_timestamp_with(200, 200, &cfg, &OsdFont::Bitmap(BitmapFont::new(1)))
            .unwrap()
            .unwrap();
        let image = placed.asset.image();

        // Without blur every lit pixel is either full halo or solid core
        let halo = cfg.halo_color;
        let core = cfg.core_color;
        let solid = [core[0], core[1], core[2], 255];
        assert!(image.pixels().any(|p| p.0 == halo));
        assert!(image.pixels().any(|p| p.0 == solid));
        assert!(image
            .pixels()
            .filter(|p| p[3] > 0)
            .all(|p| p.0 == halo || p.0 == solid));
    }

    #[test]
    fn test_partial_coverage_blends_over_glow() {
        let mut px = Rgba([255, 120, 0, 180]);
        blend_over(&mut px, [250, 189, 90], 0.5);
        assert!(px[3] > 180 && px[3] < 255);
        assert!(px[1] > 120 && px[1] < 189);

        let mut px = Rgba([0, 0, 0, 0]);
        blend_over(&mut px, [250, 189, 90], 1.0);
        assert_eq!(px.0, [250, 189, 90, 255]);
    }

    #[test]
    fn test_nothing_to_draw() {
        let cfg = config("   ", "  ");
        assert!(render_timestamp(320, 240, &cfg).unwrap().is_none());
    }

    #[test]
    fn test_zero_sized_frame_fails() {
        assert!(render_timestamp(0, 240, &config("01-01-'00", "REC")).is_err());
    }
}
