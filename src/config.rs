use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
    composite::BlendMode,
    effects::Axis,
    error::{ConfigError, Result},
    grade::{ColorProfile, FilmSimulation, ProfileRegistry},
};

/// Largest accepted jitter amplitude, in pixels
pub const MAX_JITTER_PX: u32 = 64;

/// Main configuration for one processing run
///
/// Built once before the first frame and never mutated while frames flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Random seed; drawn from entropy and logged when absent
    #[serde(with = "seed_repr", skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Frame geometry and run loop settings
    pub video: VideoConfig,

    /// Color grading settings
    pub grade: GradeConfig,

    /// Chromatic aberration settings
    pub aberration: AberrationConfig,

    /// Frame jitter settings
    pub jitter: JitterConfig,

    /// Light leak overlay settings
    pub light_leaks: LightLeakConfig,

    /// On-screen timestamp settings
    pub timestamp: TimestampConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            video: VideoConfig::default(),
            grade: GradeConfig::default(),
            aberration: AberrationConfig::default(),
            jitter: JitterConfig::default(),
            light_leaks: LightLeakConfig::default(),
            timestamp: TimestampConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid("config", e))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Also resolves the active profile, so an unknown name fails here with
    /// `InvalidProfile` rather than after frames have been processed.
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.jitter.validate(&self.video)?;
        self.light_leaks.validate()?;
        self.timestamp.validate()?;
        self.active_profile()?;
        Ok(())
    }

    /// Built-in simulations plus the custom profiles from this config
    pub fn profile_registry(&self) -> Result<ProfileRegistry> {
        let mut registry = ProfileRegistry::new();
        for profile in &self.grade.custom_profiles {
            registry.register(profile.clone())?;
        }
        Ok(registry)
    }

    pub fn active_profile(&self) -> Result<ColorProfile> {
        self.profile_registry()?.get(&self.grade.profile)
    }
}

/// Frame geometry and run loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Frame width agreed with the frame source
    pub width: u32,

    /// Frame height agreed with the frame source
    pub height: u32,

    /// Number of parallel processing threads
    pub processing_threads: usize,

    /// Frames handed to the worker pool at once
    pub batch_size: usize,

    /// Stop after this many frames (preview mode)
    pub max_frames: Option<u64>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            processing_threads: num_cpus::get(),
            batch_size: 32,
            max_frames: None,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid(
                "video.resolution",
                format!("{}x{}", self.width, self.height),
            )
            .into());
        }

        if self.processing_threads == 0 {
            return Err(ConfigError::invalid("video.processing_threads", self.processing_threads).into());
        }

        if self.batch_size == 0 {
            return Err(ConfigError::invalid("video.batch_size", self.batch_size).into());
        }

        Ok(())
    }
}

/// Color grading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    /// Name of the active profile
    pub profile: String,

    /// Extra named profiles, usable like the built-ins
    pub custom_profiles: Vec<ColorProfile>,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            profile: FilmSimulation::DreamyNegative.name().to_string(),
            custom_profiles: Vec::new(),
        }
    }
}

/// Chromatic aberration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AberrationConfig {
    pub enabled: bool,

    /// Red moves by `+offset_px`, blue by `-offset_px`; clamped to the
    /// frame extent when applied
    pub offset_px: i32,

    pub axis: Axis,
}

impl Default for AberrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_px: 2,
            axis: Axis::Horizontal,
        }
    }
}

/// Frame jitter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    pub enabled: bool,

    /// Per-axis bound of the random displacement
    pub max_shift_px: u32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_shift_px: 1,
        }
    }
}

impl JitterConfig {
    fn validate(&self, video: &VideoConfig) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let limit = MAX_JITTER_PX.min(video.width.min(video.height) / 2);
        if self.max_shift_px > limit {
            return Err(ConfigError::invalid("jitter.max_shift_px", self.max_shift_px).into());
        }
        Ok(())
    }
}

/// How a light leak image is brought to frame size at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakFit {
    /// Resample to exactly the frame size
    #[default]
    Stretch,
    /// Keep the decoded size; it must fit at the configured position
    Native,
}

/// Which leak is shown on a given frame, and how strongly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LeakSchedule {
    /// One leak at full configured opacity on every frame
    Constant { index: usize },
    /// Repeating fade-in / hold / fade-out cycles of `period` frames, with the
    /// leak for each cycle picked from the seed
    Pulsed {
        period: u32,
        fade_in: u32,
        hold: u32,
        fade_out: u32,
    },
}

impl Default for LeakSchedule {
    fn default() -> Self {
        Self::Constant { index: 0 }
    }
}

/// Light leak overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightLeakConfig {
    pub enabled: bool,

    /// Directory the overlays are read from
    pub directory: Option<PathBuf>,

    /// Upper bound on overlays decoded into memory
    pub max_assets: usize,

    /// Peak opacity (0.0-1.0)
    pub opacity: f32,

    pub blend: BlendMode,

    pub fit: LeakFit,

    /// Top-left anchor of the overlay
    pub position: (u32, u32),

    pub schedule: LeakSchedule,
}

impl Default for LightLeakConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: Some(PathBuf::from("light_leaks")),
            max_assets: 5,
            opacity: 0.8,
            blend: BlendMode::Alpha,
            fit: LeakFit::Stretch,
            position: (0, 0),
            schedule: LeakSchedule::default(),
        }
    }
}

impl LightLeakConfig {
    fn validate(&self) -> Result<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::invalid("light_leaks.opacity", self.opacity).into());
        }

        if self.enabled && self.max_assets == 0 {
            return Err(ConfigError::invalid("light_leaks.max_assets", self.max_assets).into());
        }

        if let LeakSchedule::Pulsed { period, fade_in, hold, fade_out } = self.schedule {
            let active = fade_in as u64 + hold as u64 + fade_out as u64;
            if period == 0 || active > period as u64 {
                return Err(ConfigError::invalid(
                    "light_leaks.schedule",
                    format!("period={} fade_in={} hold={} fade_out={}", period, fade_in, hold, fade_out),
                )
                .into());
            }
        }

        Ok(())
    }
}

/// On-screen timestamp settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    pub enabled: bool,

    /// Full date text; overrides the month/day/year parts
    pub date: Option<String>,

    /// Two-digit parts; missing parts fall back to today
    pub month: Option<String>,
    pub day: Option<String>,
    pub year: Option<String>,

    /// Text shown in the top-right corner (empty hides it)
    pub message: String,

    pub core_color: [u8; 3],

    pub halo_color: [u8; 4],

    /// Gaussian sigma of the glow
    pub glow_sigma: f32,

    pub font: TimestampFont,
}

/// Typeface used for the timestamp text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimestampFont {
    /// An installed font, bold where available; falls back to any sans-serif
    /// face and finally to the built-in OSD font
    System { family: String },
    /// The built-in 5x7 OSD font
    Bitmap,
}

impl Default for TimestampFont {
    fn default() -> Self {
        Self::System {
            family: "Arial".to_string(),
        }
    }
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            date: None,
            month: None,
            day: None,
            year: None,
            message: "REC".to_string(),
            core_color: [250, 189, 90],
            halo_color: [255, 120, 0, 180],
            glow_sigma: 1.5,
            font: TimestampFont::default(),
        }
    }
}

impl TimestampConfig {
    /// The date string to render, in camcorder `MM-DD-'YY` form
    pub fn date_text(&self) -> String {
        if let Some(date) = &self.date {
            return date.clone();
        }

        let now = Local::now();
        let part = |value: &Option<String>, fmt: &str| match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => now.format(fmt).to_string(),
        };

        format!(
            "{}-{}-'{}",
            part(&self.month, "%m"),
            part(&self.day, "%d"),
            part(&self.year, "%y")
        )
    }

    fn validate(&self) -> Result<()> {
        if !self.glow_sigma.is_finite() || self.glow_sigma < 0.0 {
            return Err(ConfigError::invalid("timestamp.glow_sigma", self.glow_sigma).into());
        }
        Ok(())
    }
}

/// Seeds above `i64::MAX` do not fit a TOML integer and are written as strings
mod seed_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(seed: &Option<u64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match seed {
            Some(seed) if *seed <= i64::MAX as u64 => serializer.serialize_some(seed),
            Some(seed) => serializer.serialize_some(&seed.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u64>, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Int(seed)) => Ok(Some(seed)),
            Some(Repr::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid seed '{}': {}", text, e))),
        }
    }
}
