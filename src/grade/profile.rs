use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CamcorderError, ConfigError, Result};

/// Alternate channel offsets used where blue dominates red and green,
/// so skies cool down less than skin tones warm up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlueCast {
    /// A pixel counts as blue-dominant when `B > (R + G) / 2 + threshold`
    pub threshold: f32,
    pub offset: [f32; 3],
}

/// Luma-keyed tone adjustment: pixels whose luma is past `threshold` move
/// back towards it by `strength` of the excess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneShape {
    pub threshold: f32,
    pub strength: f32,
}

/// Immutable parameter set describing one film simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorProfile {
    pub name: String,

    /// Gaussian blur sigma for lens softening (0 disables)
    pub softening: f32,

    /// Global multiplier folded into every channel gain
    pub brightness: f32,

    /// Per-channel gain (R, G, B)
    pub channel_gain: [f32; 3],

    /// Per-channel additive offset (R, G, B)
    pub channel_offset: [f32; 3],

    pub blue_cast: Option<BlueCast>,

    /// Contrast about the frame's mean luma (1.0 = unchanged)
    pub contrast: f32,

    /// Saturation about per-pixel luma (1.0 = unchanged)
    pub saturation: f32,

    /// Fraction of the result replaced by its own luma
    pub luma_blend: f32,

    /// Shadows below the threshold are lifted
    pub shadow_lift: Option<ToneShape>,

    /// Highlights above the threshold are pulled down
    pub highlight_rolloff: Option<ToneShape>,

    /// Monochrome grain amplitude in 8-bit levels
    pub grain: u8,
}

impl Default for ColorProfile {
    /// The identity profile
    fn default() -> Self {
        Self {
            name: "neutral".to_string(),
            softening: 0.0,
            brightness: 1.0,
            channel_gain: [1.0; 3],
            channel_offset: [0.0; 3],
            blue_cast: None,
            contrast: 1.0,
            saturation: 1.0,
            luma_blend: 0.0,
            shadow_lift: None,
            highlight_rolloff: None,
            grain: 0,
        }
    }
}

impl ColorProfile {
    /// Start an identity profile with the given name
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.channel_offset = offset;
        self
    }

    pub fn with_grain(mut self, grain: u8) -> Self {
        self.grain = grain;
        self
    }

    /// Reject parameters that would produce NaN or inverted images
    pub fn validate(&self) -> Result<()> {
        let key = |field: &str| format!("profile.{}.{}", self.name, field);

        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("profile.name", "<empty>").into());
        }

        let non_negative = [
            ("softening", self.softening),
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(key(field), value).into());
            }
        }

        if !(0.0..=1.0).contains(&self.luma_blend) {
            return Err(ConfigError::invalid(key("luma_blend"), self.luma_blend).into());
        }

        let finite = self
            .channel_gain
            .iter()
            .chain(self.channel_offset.iter())
            .chain(self.blue_cast.iter().flat_map(|c| c.offset.iter()))
            .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::invalid(key("channels"), "non-finite").into());
        }
        if self.channel_gain.iter().any(|g| *g < 0.0) {
            return Err(ConfigError::invalid(key("channel_gain"), format!("{:?}", self.channel_gain)).into());
        }

        for (field, shape) in [("shadow_lift", self.shadow_lift), ("highlight_rolloff", self.highlight_rolloff)] {
            if let Some(shape) = shape {
                if !(0.0..=255.0).contains(&shape.threshold) || !(0.0..=1.0).contains(&shape.strength) {
                    return Err(ConfigError::invalid(
                        key(field),
                        format!("threshold={} strength={}", shape.threshold, shape.strength),
                    )
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// The built-in film simulations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilmSimulation {
    ModernFuji,
    TerracottaSun,
    Portra800,
    RealaAce,
    DreamyNegative,
}

impl FilmSimulation {
    pub const ALL: [FilmSimulation; 5] = [
        FilmSimulation::ModernFuji,
        FilmSimulation::TerracottaSun,
        FilmSimulation::Portra800,
        FilmSimulation::RealaAce,
        FilmSimulation::DreamyNegative,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ModernFuji => "modern_fuji_sim",
            Self::TerracottaSun => "terracotta_sun_sim",
            Self::Portra800 => "portra_800_sim",
            Self::RealaAce => "reala_ace_sim",
            Self::DreamyNegative => "dreamy_negative_sim",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ModernFuji => "Clean digital Fuji look: slight warmth, a touch of bleach bypass",
            Self::TerracottaSun => "Soft, saturated sunset orange with cooled-down skies",
            Self::Portra800 => "Bright, warm portrait negative with heavy grain",
            Self::RealaAce => "Cool greens and low contrast",
            Self::DreamyNegative => "Washed negative with lifted shadows and tamed highlights",
        }
    }

    pub fn profile(&self) -> ColorProfile {
        let base = ColorProfile::named(self.name());
        match self {
            Self::ModernFuji => ColorProfile {
                brightness: 1.05,
                contrast: 0.95,
                channel_offset: [15.0, 5.0, -10.0],
                luma_blend: 0.05,
                ..base
            },
            Self::TerracottaSun => ColorProfile {
                softening: 1.6,
                contrast: 0.85,
                saturation: 1.35,
                channel_offset: [40.0, -5.0, -35.0],
                blue_cast: Some(BlueCast {
                    threshold: 30.0,
                    offset: [15.0, -10.0, -70.0],
                }),
                grain: 5,
                ..base
            },
            Self::Portra800 => ColorProfile {
                softening: 0.6,
                brightness: 1.08,
                contrast: 0.85,
                saturation: 1.3,
                channel_offset: [19.0, 10.0, -33.0],
                grain: 15,
                ..base
            },
            Self::RealaAce => ColorProfile {
                softening: 0.8,
                contrast: 0.8,
                saturation: 1.2,
                channel_offset: [-11.0, 10.0, 11.0],
                grain: 5,
                ..base
            },
            Self::DreamyNegative => ColorProfile {
                contrast: 0.9,
                saturation: 1.5,
                channel_offset: [20.0, 0.0, -20.0],
                shadow_lift: Some(ToneShape {
                    threshold: 60.0,
                    strength: 0.2,
                }),
                highlight_rolloff: Some(ToneShape {
                    threshold: 200.0,
                    strength: 0.15,
                }),
                grain: 8,
                ..base
            },
        }
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|sim| sim.name().to_string()).collect()
    }
}

impl fmt::Display for FilmSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilmSimulation {
    type Err = CamcorderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|sim| sim.name() == s)
            .ok_or_else(|| CamcorderError::InvalidProfile {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        for sim in FilmSimulation::ALL {
            let profile = sim.profile();
            assert_eq!(profile.name, sim.name());
            assert!(profile.validate().is_ok(), "{} failed validation", sim);
        }
    }

    #[test]
    fn test_parse_known_and_unknown_names() {
        assert_eq!("portra_800_sim".parse::<FilmSimulation>().unwrap(), FilmSimulation::Portra800);

        let err = "vhs_ultra".parse::<FilmSimulation>().unwrap_err();
        match err {
            CamcorderError::InvalidProfile { name, available } => {
                assert_eq!(name, "vhs_ultra");
                assert_eq!(available.len(), 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut profile = ColorProfile::named("broken");
        profile.contrast = -1.0;
        assert!(profile.validate().is_err());

        let mut profile = ColorProfile::named("broken");
        profile.channel_offset[1] = f32::NAN;
        assert!(profile.validate().is_err());

        let mut profile = ColorProfile::named("broken");
        profile.highlight_rolloff = Some(ToneShape { threshold: 300.0, strength: 0.1 });
        assert!(profile.validate().is_err());
    }
}
