//! On-screen display text.
//!
//! A bold sans-serif system font is preferred, rasterized with coverage so
//! edges stay smooth. When no usable system font exists the built-in 5x7
//! bitmap font is used instead.

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::TimestampFont;
use crate::error::{AssetError, Result};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Row bitmaps, most significant of the low five bits is the leftmost column
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        // Recording dot
        '*' => [0x00, 0x0E, 0x1F, 0x1F, 0x1F, 0x0E, 0x00],
        _ => [0; 7],
    }
}

/// Text renderer for the timestamp layer
pub enum OsdFont {
    Outline(OutlineFont),
    Bitmap(BitmapFont),
}

impl OsdFont {
    /// Resolve the configured font for glyphs about `pixel_height` tall.
    ///
    /// Falls back to the bitmap font when no system font can be loaded.
    pub fn for_timestamp(choice: &TimestampFont, pixel_height: f32) -> Self {
        match choice {
            TimestampFont::Bitmap => Self::Bitmap(BitmapFont::for_height(pixel_height)),
            TimestampFont::System { family } => match OutlineFont::from_system(family, pixel_height) {
                Some(font) => Self::Outline(font),
                None => {
                    warn!("No usable system font found, using the built-in OSD font");
                    Self::Bitmap(BitmapFont::for_height(pixel_height))
                }
            },
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self, Self::Outline(_))
    }

    /// Width and line height of `text`
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match self {
            Self::Outline(font) => font.text_size(text),
            Self::Bitmap(font) => font.text_size(text),
        }
    }

    /// Rasterize `text` with its top-left corner at `(x, y)`.
    ///
    /// `plot` receives every covered pixel inside the image along with the
    /// glyph coverage there (0.0-1.0). Anything outside the image is clipped.
    pub fn draw<F>(&self, image: &mut RgbaImage, x: i32, y: i32, text: &str, mut plot: F)
    where
        F: FnMut(&mut Rgba<u8>, f32),
    {
        let (width, height) = (image.width() as i32, image.height() as i32);
        let mut put = |px: i32, py: i32, coverage: f32| {
            if px < 0 || py < 0 || px >= width || py >= height || coverage <= 0.0 {
                return;
            }
            plot(image.get_pixel_mut(px as u32, py as u32), coverage.min(1.0));
        };

        match self {
            Self::Outline(font) => font.rasterize(x, y, text, &mut put),
            Self::Bitmap(font) => font.rasterize(x, y, text, &mut put),
        }
    }
}

/// A scalable TrueType/OpenType face at a fixed pixel size
pub struct OutlineFont {
    name: String,
    font: FontVec,
    scale: PxScale,
}

impl OutlineFont {
    /// Parse face `index` of a font file
    pub fn from_bytes<S: Into<String>>(name: S, data: Vec<u8>, index: u32, pixel_height: f32) -> Result<Self> {
        let name = name.into();
        let font = FontVec::try_from_vec_and_index(data, index).map_err(|e| AssetError::DecodeFailed {
            path: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name,
            font,
            scale: PxScale::from(pixel_height.max(1.0)),
        })
    }

    /// Look up `family` among the installed fonts, then any sans-serif face,
    /// then any face at all. Bold is preferred; the closest weight is taken
    /// when a family has no bold face.
    pub fn from_system(family: &str, pixel_height: f32) -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!("Loaded {} system fonts", db.len());

        let families = [Family::Name(family), Family::SansSerif];
        let query = Query {
            families: &families,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|face| face.id))?;

        let name = db
            .face(id)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| family.to_string());
        let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

        match Self::from_bytes(name, data, index, pixel_height) {
            Ok(font) => {
                info!("Timestamp font: {} at {:.1}px", font.name, pixel_height);
                Some(font)
            }
            Err(e) => {
                warn!("Skipping system font: {}", e);
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let font = self.font.as_scaled(self.scale);
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = prev {
                width += font.kern(prev, id);
            }
            width += font.h_advance(id);
            prev = Some(id);
        }
        let height = font.ascent() - font.descent();
        (width.max(0.0).ceil() as u32, height.max(0.0).ceil() as u32)
    }

    fn rasterize(&self, x: i32, y: i32, text: &str, plot: &mut dyn FnMut(i32, i32, f32)) {
        let font = self.font.as_scaled(self.scale);
        let baseline = y as f32 + font.ascent();
        let mut cursor = x as f32;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = prev {
                cursor += font.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(cursor, baseline));
            cursor += font.h_advance(id);
            prev = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (ox, oy) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|gx, gy, coverage| plot(ox + gx as i32, oy + gy as i32, coverage));
            }
        }
    }
}

/// Integer-scaled 5x7 bitmap font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    scale: u32,
}

impl BitmapFont {
    pub fn new(scale: u32) -> Self {
        Self { scale: scale.max(1) }
    }

    /// Pick the scale whose glyph height is closest to `pixel_height`
    pub fn for_height(pixel_height: f32) -> Self {
        Self::new((pixel_height / GLYPH_HEIGHT as f32).round().max(1.0) as u32)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Rendered size of `text` without trailing spacing
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, 0);
        }
        let advance = (GLYPH_WIDTH + 1) * self.scale;
        (count * advance - self.scale, GLYPH_HEIGHT * self.scale)
    }

    fn rasterize(&self, x: i32, y: i32, text: &str, plot: &mut dyn FnMut(i32, i32, f32)) {
        let advance = ((GLYPH_WIDTH + 1) * self.scale) as i32;
        let scale = self.scale as i32;

        for (i, c) in text.chars().enumerate() {
            let origin_x = x + i as i32 * advance;
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH as i32 {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let bx = origin_x + col * scale;
                    let by = y + row as i32 * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            plot(bx + dx, by + dy, 1.0);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([9, 9, 9, 255]);

    fn stamp(font: &OsdFont, image: &mut RgbaImage, x: i32, y: i32, text: &str) {
        font.draw(image, x, y, text, |px, _| *px = INK);
    }

    fn inked(image: &RgbaImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] == 255)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_text_size() {
        let font = BitmapFont::new(2);
        assert_eq!(font.text_size(""), (0, 0));
        assert_eq!(font.text_size("A"), (10, 14));
        assert_eq!(font.text_size("REC"), (34, 14));
    }

    #[test]
    fn test_for_height() {
        assert_eq!(BitmapFont::for_height(1.0).scale(), 1);
        assert_eq!(BitmapFont::for_height(27.0).scale(), 4);
    }

    #[test]
    fn test_draw_dash() {
        let mut image = RgbaImage::new(5, 7);
        stamp(&OsdFont::Bitmap(BitmapFont::new(1)), &mut image, 0, 0, "-");

        for y in 0..7 {
            for x in 0..5 {
                let expected = if y == 3 { INK } else { Rgba([0, 0, 0, 0]) };
                assert_eq!(*image.get_pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn test_draw_clips_top_left() {
        // Rows 1..=4 and columns 1..=4 of '8' land inside the image
        let mut image = RgbaImage::new(4, 4);
        stamp(&OsdFont::Bitmap(BitmapFont::new(1)), &mut image, -1, -1, "8");
        assert_eq!(inked(&image), vec![(3, 0), (3, 1), (0, 2), (1, 2), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_draw_clips_bottom_right() {
        // Only rows 0..=1 and columns 0..=1 of '8' land inside the image
        let mut image = RgbaImage::new(4, 4);
        stamp(&OsdFont::Bitmap(BitmapFont::new(1)), &mut image, 2, 2, "8");
        assert_eq!(inked(&image), vec![(3, 2), (2, 3)]);
    }

    #[test]
    fn test_scaled_blocks() {
        let mut image = RgbaImage::new(10, 14);
        stamp(&OsdFont::Bitmap(BitmapFont::new(2)), &mut image, 0, 0, "-");
        assert_eq!(inked(&image).len(), 5 * 2 * 2);
        assert_eq!(image.get_pixel(0, 6)[3], 255);
        assert_eq!(image.get_pixel(9, 7)[3], 255);
        assert_eq!(image.get_pixel(0, 5)[3], 0);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(glyph('r'), glyph('R'));
        assert_eq!(glyph('~'), [0; 7]);
    }

    #[test]
    fn test_bitmap_choice_skips_system_lookup() {
        let font = OsdFont::for_timestamp(&TimestampFont::Bitmap, 21.0);
        assert!(!font.is_outline());
        assert_eq!(font.text_size("0"), (15, 21));
    }

    #[test]
    fn test_unknown_family_still_renders() {
        let choice = TimestampFont::System {
            family: "No Such Typeface 4711".to_string(),
        };
        let font = OsdFont::for_timestamp(&choice, 24.0);
        let (w, h) = font.text_size("12-25-'91");
        assert!(w > 0 && h > 0);

        let mut image = RgbaImage::new(w + 8, h + 8);
        font.draw(&mut image, 4, 4, "12-25-'91", |px, coverage| {
            px[3] = px[3].max((coverage * 255.0).round() as u8)
        });
        assert!(image.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_garbage_font_bytes_rejected() {
        let result = OutlineFont::from_bytes("junk.ttf", vec![0u8; 64], 0, 16.0);
        assert!(result.is_err());
    }
}
