//! # Frame Pipeline
//!
//! Chains the per-frame stages in a fixed order:
//!
//! 1. color grade
//! 2. chromatic aberration (if enabled)
//! 3. jitter (if enabled)
//! 4. light leaks (if enabled and any were loaded)
//! 5. timestamp (if one was rendered)
//!
//! The timestamp goes last so the on-screen display is never shaken or
//! fringed along with the picture. Every check that can fail on bad
//! configuration or assets runs in [`FramePipeline::new`], before any frame.

mod runner;
pub mod stage;

use rand::RngCore;
use tracing::info;

use crate::{
    assets::{AssetCache, AssetProvider},
    config::{Config, LeakSchedule},
    effects::{ChromaticAberration, Jitter, SeededRandom},
    error::{ConfigError, Result},
    grade::ColorGrader,
    video::types::Frame,
};

pub use runner::RunStats;
pub use stage::{FrameContext, FrameStage};

use stage::{AberrationStage, GradeStage, JitterStage, LightLeakStage, TimestampStage};

/// The per-frame transform for one run
pub struct FramePipeline {
    width: u32,
    height: u32,
    random: SeededRandom,
    stages: Vec<Box<dyn FrameStage>>,
    processing_threads: usize,
    batch_size: usize,
    max_frames: Option<u64>,
}

impl FramePipeline {
    /// Validate `config`, check every cached asset against the frame size and
    /// assemble the stages.
    pub fn new(config: &Config, assets: AssetCache) -> Result<Self> {
        config.validate()?;

        let (width, height) = (config.video.width, config.video.height);
        if assets.frame_size() != (width, height) {
            return Err(ConfigError::invalid(
                "assets.frame_size",
                format!(
                    "{}x{} (video is {}x{})",
                    assets.frame_size().0,
                    assets.frame_size().1,
                    width,
                    height
                ),
            )
            .into());
        }

        let mut stages: Vec<Box<dyn FrameStage>> = Vec::new();

        let profile = config.active_profile()?;
        info!("Color profile: {}", profile.name);
        stages.push(Box::new(GradeStage::new(ColorGrader::new(profile))));

        if config.aberration.enabled {
            stages.push(Box::new(AberrationStage::new(ChromaticAberration::new(
                config.aberration.offset_px,
                config.aberration.axis,
            ))));
        }

        if config.jitter.enabled {
            stages.push(Box::new(JitterStage::new(Jitter::new(config.jitter.max_shift_px))));
        }

        let (leaks, timestamp) = assets.into_parts();
        if config.light_leaks.enabled && !leaks.is_empty() {
            let position = config.light_leaks.position;
            for leak in &leaks {
                leak.ensure_fits(width, height, position)?;
            }
            if let LeakSchedule::Constant { index } = config.light_leaks.schedule {
                if index >= leaks.len() {
                    return Err(ConfigError::invalid(
                        "light_leaks.schedule.index",
                        format!("{} (only {} loaded)", index, leaks.len()),
                    )
                    .into());
                }
            }
            stages.push(Box::new(LightLeakStage::new(
                leaks,
                position,
                config.light_leaks.opacity,
                config.light_leaks.blend,
                config.light_leaks.schedule,
            )));
        }

        if let Some(timestamp) = timestamp {
            timestamp.asset.ensure_fits(width, height, timestamp.position)?;
            stages.push(Box::new(TimestampStage::new(timestamp)));
        }

        let random = match config.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };

        let pipeline = Self {
            width,
            height,
            random,
            stages,
            processing_threads: config.video.processing_threads,
            batch_size: config.video.batch_size,
            max_frames: config.video.max_frames,
        };
        info!(
            "Pipeline ready: {}x{}, seed {}, stages [{}]",
            width,
            height,
            pipeline.seed(),
            pipeline.stage_names().join(" -> ")
        );
        Ok(pipeline)
    }

    /// Load assets through `provider` and build the pipeline
    pub fn from_config(config: &Config, provider: Option<&dyn AssetProvider>) -> Result<Self> {
        config.validate()?;
        let assets = AssetCache::load(config, provider)?;
        Self::new(config, assets)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The seed in effect, configured or drawn
    pub fn seed(&self) -> u64 {
        self.random.seed()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Transform one frame, drawing randomness from `rng`.
    ///
    /// The frame is treated as index 0 of the stream.
    pub fn process<R: RngCore>(&self, frame: Frame, rng: &mut R) -> Result<Frame> {
        self.apply_stages(0, frame, rng)
    }

    /// Transform frame `index` of the stream using the run's seeded source.
    ///
    /// Output depends only on the seed, the index and the frame itself.
    pub fn process_indexed(&self, index: u64, frame: Frame) -> Result<Frame> {
        let mut rng = self.random.for_frame(index);
        self.apply_stages(index, frame, &mut rng)
    }

    fn apply_stages(&self, index: u64, mut frame: Frame, rng: &mut dyn RngCore) -> Result<Frame> {
        frame.ensure_dimensions(self.width, self.height)?;

        let mut ctx = FrameContext {
            index,
            rng,
            random: &self.random,
        };
        for stage in &self.stages {
            stage.apply(&mut frame, &mut ctx)?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::timestamp::{font_pixel_height, render_timestamp_with};
    use crate::assets::{BitmapFont, MemoryAssetProvider, OsdFont, OverlayAsset, PlacedOverlay};
    use crate::config::LeakFit;
    use crate::error::CamcorderError;
    use crate::grade::ColorProfile;
    use image::{Rgba, RgbaImage};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Identity grade, everything optional switched off
    fn bare_config(width: u32, height: u32) -> Config {
        let mut config = Config::default();
        config.seed = Some(42);
        config.video.width = width;
        config.video.height = height;
        config.grade.custom_profiles.push(ColorProfile::named("neutral"));
        config.grade.profile = "neutral".to_string();
        config.timestamp.enabled = false;
        config
    }

    fn pattern(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x * 17 % 256) as u8, (y * 29 % 256) as u8, ((x * y) % 256) as u8]);
            }
        }
        frame
    }

    #[test]
    fn test_red_offset_on_black_frame() {
        let mut config = bare_config(2, 2);
        config.grade.custom_profiles = vec![ColorProfile::named("red_push").with_offset([20.0, 0.0, 0.0])];
        config.grade.profile = "red_push".to_string();

        let pipeline = FramePipeline::new(&config, AssetCache::empty(2, 2)).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["color_grade"]);

        let out = pipeline.process_indexed(0, Frame::new_black(2, 2)).unwrap();
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(out.get_pixel(x, y), [20, 0, 0]);
            }
        }
    }

    #[test]
    fn test_aberration_wraps_columns() {
        let mut config = bare_config(4, 4);
        config.aberration.enabled = true;
        config.aberration.offset_px = 1;

        let pipeline = FramePipeline::new(&config, AssetCache::empty(4, 4)).unwrap();
        let white = Frame::new_filled(4, 4, [255, 255, 255]);
        let out = pipeline.process_indexed(0, white.clone()).unwrap();
        for y in 0..4 {
            assert_eq!(out.get_pixel(0, y)[0], white.get_pixel(3, y)[0]);
        }

        let input = pattern(4, 4);
        let out = pipeline.process_indexed(0, input.clone()).unwrap();
        for y in 0..4 {
            assert_eq!(out.get_pixel(0, y)[0], input.get_pixel(3, y)[0]);
        }
    }

    #[test]
    fn test_unknown_profile_fails_construction() {
        let mut config = bare_config(8, 8);
        config.grade.profile = "vhs_ultra".to_string();
        let result = FramePipeline::new(&config, AssetCache::empty(8, 8));
        assert!(matches!(result, Err(CamcorderError::InvalidProfile { .. })));
    }

    #[test]
    fn test_oversized_overlay_fails_construction() {
        let mut config = bare_config(16, 16);
        config.light_leaks.enabled = true;
        config.light_leaks.fit = LeakFit::Native;
        config.light_leaks.position = (4, 4);

        let provider = MemoryAssetProvider::new()
            .with_asset("wide_leak.png", RgbaImage::from_pixel(16, 8, Rgba([255, 200, 0, 255])));
        let result = FramePipeline::from_config(&config, Some(&provider));
        assert!(matches!(result, Err(CamcorderError::AssetDimensionMismatch { .. })));
    }

    #[test]
    fn test_asset_cache_for_other_resolution_rejected() {
        let config = bare_config(8, 8);
        assert!(FramePipeline::new(&config, AssetCache::empty(16, 16)).is_err());
    }

    #[test]
    fn test_wrong_frame_size_is_an_error() {
        let config = bare_config(8, 8);
        let pipeline = FramePipeline::new(&config, AssetCache::empty(8, 8)).unwrap();
        assert!(matches!(
            pipeline.process_indexed(0, Frame::new_black(4, 4)),
            Err(CamcorderError::Frame(_))
        ));
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut config = Config::default();
        config.seed = Some(1234);
        config.video.width = 48;
        config.video.height = 32;
        config.grade.profile = "portra_800_sim".to_string();
        config.aberration.enabled = true;
        config.jitter.enabled = true;
        config.jitter.max_shift_px = 3;
        config.timestamp.date = Some("07-04-'98".to_string());

        let input = pattern(48, 32);
        let a = FramePipeline::from_config(&config, None).unwrap();
        let b = FramePipeline::from_config(&config, None).unwrap();
        for index in 0..5 {
            let out_a = a.process_indexed(index, input.clone()).unwrap();
            let out_b = b.process_indexed(index, input.clone()).unwrap();
            assert_eq!(out_a.samples(), out_b.samples());
            assert_eq!(out_a.dimensions(), (48, 32));
        }

        let out_a = a.process(input.clone(), &mut SmallRng::seed_from_u64(5)).unwrap();
        let out_b = b.process(input, &mut SmallRng::seed_from_u64(5)).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_timestamp_is_not_jittered() {
        let mut config = bare_config(160, 120);
        config.jitter.enabled = true;
        config.jitter.max_shift_px = 4;
        config.timestamp.enabled = true;
        config.timestamp.date = Some("01-01-'99".to_string());

        let font = OsdFont::Bitmap(BitmapFont::for_height(font_pixel_height(120)));
        let placed: PlacedOverlay = render_timestamp_with(160, 120, &config.timestamp, &font)
            .unwrap()
            .unwrap();
        let mut assets = AssetCache::empty(160, 120);
        assets.set_timestamp(Some(placed.clone()));
        let pipeline = FramePipeline::new(&config, assets).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["color_grade", "jitter", "timestamp"]);

        let core = config.timestamp.core_color;
        let (ox, oy) = placed.position;
        for index in 0..6 {
            let out = pipeline.process_indexed(index, pattern(160, 120)).unwrap();
            for (x, y, px) in placed.asset.image().enumerate_pixels() {
                if px.0 == [core[0], core[1], core[2], 255] {
                    assert_eq!(out.get_pixel(ox + x, oy + y), core);
                }
            }
        }
    }

    #[test]
    fn test_light_leak_stage_composites() {
        let mut config = bare_config(8, 8);
        config.light_leaks.enabled = true;
        config.light_leaks.opacity = 1.0;

        let mut assets = AssetCache::empty(8, 8);
        assets
            .insert_light_leak(
                OverlayAsset::new("full", RgbaImage::from_pixel(8, 8, Rgba([255, 128, 0, 255]))),
                LeakFit::Stretch,
                (0, 0),
            )
            .unwrap();
        let pipeline = FramePipeline::new(&config, assets).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["color_grade", "light_leaks"]);

        let out = pipeline.process_indexed(3, Frame::new_black(8, 8)).unwrap();
        for px in out.as_image().pixels() {
            assert_eq!(px.0, [255, 128, 0]);
        }
    }

    #[test]
    fn test_constant_leak_index_out_of_range() {
        let mut config = bare_config(8, 8);
        config.light_leaks.enabled = true;
        config.light_leaks.schedule = LeakSchedule::Constant { index: 2 };

        let mut assets = AssetCache::empty(8, 8);
        assets
            .insert_light_leak(OverlayAsset::new("only", RgbaImage::new(8, 8)), LeakFit::Stretch, (0, 0))
            .unwrap();
        assert!(matches!(
            FramePipeline::new(&config, assets),
            Err(CamcorderError::InvalidConfiguration(_))
        ));
    }
}
