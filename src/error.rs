use thiserror::Error;

/// Main error type for the Retro-Camcorder library
#[derive(Error, Debug)]
pub enum CamcorderError {
    #[error("Unknown color profile '{name}' (available: {})", .available.join(", "))]
    InvalidProfile { name: String, available: Vec<String> },

    #[error(
        "Asset '{asset}' ({asset_width}x{asset_height}) does not fit a {frame_width}x{frame_height} frame at ({x}, {y})"
    )]
    AssetDimensionMismatch {
        asset: String,
        asset_width: u32,
        asset_height: u32,
        x: u32,
        y: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Asset load failure: {0}")]
    AssetLoadFailure(#[from] AssetError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Overlay and timestamp asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to decode asset {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("Failed to render {asset}: {reason}")]
    RenderFailed { asset: String, reason: String },
}

/// Frame buffer errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame is {actual_width}x{actual_height}, pipeline expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Pixel buffer of {len} bytes does not hold a {width}x{height} frame with {channels} channels")]
    InvalidBuffer {
        width: u32,
        height: u32,
        channels: usize,
        len: usize,
    },

    #[error("Failed to write frame {index}: {reason}")]
    WriteFailed { index: u64, reason: String },
}

/// Convenience type alias for Results using CamcorderError
pub type Result<T> = std::result::Result<T, CamcorderError>;

impl ConfigError {
    /// Shorthand for an `InvalidValue` error
    pub fn invalid<K: Into<String>, V: ToString>(key: K, value: V) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl CamcorderError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidProfile { name, available } => {
                format!(
                    "Color profile '{}' does not exist. Pick one of: {}",
                    name,
                    available.join(", ")
                )
            }
            Self::AssetDimensionMismatch { asset, .. } => {
                format!(
                    "Overlay '{}' is larger than the video frame at its position. Resize or crop it when loading.",
                    asset
                )
            }
            Self::AssetLoadFailure(AssetError::NotFound { path }) => {
                format!("Could not find asset '{}'. Please check the path exists.", path)
            }
            Self::InvalidConfiguration(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_profile_lists_alternatives() {
        let err = CamcorderError::InvalidProfile {
            name: "vhs_ultra".to_string(),
            available: vec!["portra_800_sim".to_string(), "reala_ace_sim".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("vhs_ultra"));
        assert!(message.contains("portra_800_sim, reala_ace_sim"));
        assert!(err.user_message().contains("Pick one of"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: CamcorderError = ConfigError::invalid("jitter.max_shift_px", 500).into();
        assert!(matches!(err, CamcorderError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("jitter.max_shift_px = 500"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = CamcorderError::AssetDimensionMismatch {
            asset: "leak.png".to_string(),
            asset_width: 10,
            asset_height: 10,
            x: 4,
            y: 0,
            frame_width: 8,
            frame_height: 8,
        };
        assert_eq!(
            err.to_string(),
            "Asset 'leak.png' (10x10) does not fit a 8x8 frame at (4, 0)"
        );
    }
}
