use tracing::{info, warn};

use crate::assets::overlay::{OverlayAsset, PlacedOverlay};
use crate::assets::provider::AssetProvider;
use crate::assets::timestamp::render_timestamp;
use crate::config::{Config, LeakFit};
use crate::error::{ConfigError, Result};

/// Overlays decoded or rendered once per run and shared read-only by every frame
#[derive(Debug, Clone)]
pub struct AssetCache {
    frame_size: (u32, u32),
    light_leaks: Vec<OverlayAsset>,
    timestamp: Option<PlacedOverlay>,
}

impl AssetCache {
    /// A cache with no overlays for frames of the given size
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            frame_size: (width, height),
            light_leaks: Vec::new(),
            timestamp: None,
        }
    }

    /// Decode light leaks and render the timestamp as `config` asks.
    ///
    /// `provider` is only consulted when light leaks are enabled. Decode
    /// failures are returned, never skipped.
    pub fn load(config: &Config, provider: Option<&dyn AssetProvider>) -> Result<Self> {
        let (width, height) = (config.video.width, config.video.height);
        let mut cache = Self::empty(width, height);

        let leaks = &config.light_leaks;
        if leaks.enabled {
            let provider = provider.ok_or_else(|| ConfigError::invalid("light_leaks.directory", "<none>"))?;
            let names = provider.list()?;
            if names.is_empty() {
                warn!("No light leaks available, continuing without them");
            }

            let selected: Vec<&String> = names.iter().take(leaks.max_assets).collect();
            info!("Loading {} light leaks into memory...", selected.len());
            for name in selected {
                let asset = OverlayAsset::new(name.as_str(), provider.load(name)?);
                cache.insert_light_leak(asset, leaks.fit, leaks.position)?;
            }
        }

        if config.timestamp.enabled {
            info!("Generating timestamp overlay...");
            cache.timestamp = render_timestamp(width, height, &config.timestamp)?;
        }

        Ok(cache)
    }

    /// Fit `asset` to the frame once and check it lies inside the frame at `position`
    pub fn insert_light_leak(&mut self, asset: OverlayAsset, fit: LeakFit, position: (u32, u32)) -> Result<()> {
        let (width, height) = self.frame_size;
        let asset = match fit {
            LeakFit::Stretch => asset.resized(width, height),
            LeakFit::Native => asset,
        };
        asset.ensure_fits(width, height, position)?;
        self.light_leaks.push(asset);
        Ok(())
    }

    pub fn set_timestamp(&mut self, timestamp: Option<PlacedOverlay>) {
        self.timestamp = timestamp;
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    pub fn light_leaks(&self) -> &[OverlayAsset] {
        &self.light_leaks
    }

    pub fn timestamp(&self) -> Option<&PlacedOverlay> {
        self.timestamp.as_ref()
    }

    pub fn into_parts(self) -> (Vec<OverlayAsset>, Option<PlacedOverlay>) {
        (self.light_leaks, self.timestamp)
    }
}
