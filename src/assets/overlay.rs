use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{CamcorderError, Result};

/// Immutable decoded overlay with straight (non-premultiplied) alpha
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAsset {
    name: String,
    image: RgbaImage,
}

impl OverlayAsset {
    pub fn new<S: Into<String>>(name: S, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Resample to exactly `width` x `height` (bilinear)
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.image.dimensions() == (width, height) {
            return self;
        }
        let image = image::imageops::resize(&self.image, width, height, FilterType::Triangle);
        Self {
            name: self.name,
            image,
        }
    }

    /// Crop to the smallest rectangle holding every non-transparent pixel.
    /// Returns the cropped asset and the rectangle's top-left corner, or
    /// `None` when the overlay is fully transparent.
    pub fn trimmed(&self) -> Option<(Self, (u32, u32))> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;

        for (x, y, px) in self.image.enumerate_pixels() {
            if px[3] > 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        if min_x == u32::MAX {
            return None;
        }

        let cropped = image::imageops::crop_imm(
            &self.image,
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        )
        .to_image();
        Some((Self::new(self.name.clone(), cropped), (min_x, min_y)))
    }

    /// Fail with `AssetDimensionMismatch` unless the asset lies entirely
    /// inside a `frame_width` x `frame_height` frame when anchored at `position`
    pub fn ensure_fits(&self, frame_width: u32, frame_height: u32, position: (u32, u32)) -> Result<()> {
        let (x, y) = position;
        let fits_x = x as u64 + self.width() as u64 <= frame_width as u64;
        let fits_y = y as u64 + self.height() as u64 <= frame_height as u64;
        if fits_x && fits_y {
            return Ok(());
        }
        Err(CamcorderError::AssetDimensionMismatch {
            asset: self.name.clone(),
            asset_width: self.width(),
            asset_height: self.height(),
            x,
            y,
            frame_width,
            frame_height,
        })
    }
}

/// An overlay together with the fixed position it is composited at
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOverlay {
    pub asset: OverlayAsset,
    pub position: (u32, u32),
}

impl PlacedOverlay {
    pub fn new(asset: OverlayAsset, position: (u32, u32)) -> Self {
        Self { asset, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_trim_finds_opaque_box() {
        let mut image = RgbaImage::new(10, 8);
        image.put_pixel(3, 2, Rgba([1, 2, 3, 255]));
        image.put_pixel(6, 5, Rgba([1, 2, 3, 10]));
        let asset = OverlayAsset::new("dots", image);

        let (trimmed, origin) = asset.trimmed().unwrap();
        assert_eq!(origin, (3, 2));
        assert_eq!(trimmed.image().dimensions(), (4, 4));
        assert_eq!(trimmed.image().get_pixel(0, 0)[3], 255);
        assert_eq!(trimmed.image().get_pixel(3, 3)[3], 10);
    }

    #[test]
    fn test_trim_of_transparent_asset() {
        let asset = OverlayAsset::new("empty", RgbaImage::new(4, 4));
        assert!(asset.trimmed().is_none());
    }

    #[test]
    fn test_ensure_fits() {
        let asset = OverlayAsset::new("leak", RgbaImage::new(4, 4));
        assert!(asset.ensure_fits(4, 4, (0, 0)).is_ok());
        assert!(asset.ensure_fits(8, 8, (4, 4)).is_ok());
        assert!(matches!(
            asset.ensure_fits(8, 8, (5, 0)),
            Err(CamcorderError::AssetDimensionMismatch { .. })
        ));
        assert!(asset.ensure_fits(3, 10, (0, 0)).is_err());
    }

    #[test]
    fn test_resize_to_frame() {
        let asset = OverlayAsset::new("leak", RgbaImage::from_pixel(20, 10, Rgba([200, 100, 50, 255])));
        let resized = asset.resized(8, 6);
        assert_eq!(resized.image().dimensions(), (8, 6));
        let px = resized.image().get_pixel(4, 3);
        for (c, expected) in [200u8, 100, 50, 255].into_iter().enumerate() {
            assert!(px[c].abs_diff(expected) <= 1);
        }
    }
}
