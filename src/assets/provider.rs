use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info};

use crate::error::{AssetError, Result};
use crate::video::io::{is_hidden_file, is_image_file};

/// Supplies decoded overlay images by name
///
/// Enumeration must be deterministic: the same provider lists the same
/// names in the same order on every call.
pub trait AssetProvider {
    fn list(&self) -> Result<Vec<String>>;

    fn load(&self, name: &str) -> Result<RgbaImage>;
}

/// Overlay images (`.png`, `.jpg`, `.jpeg`) in one directory, sorted by file name
pub struct DirectoryAssetProvider {
    directory: PathBuf,
}

impl DirectoryAssetProvider {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl AssetProvider for DirectoryAssetProvider {
    fn list(&self) -> Result<Vec<String>> {
        if !self.directory.is_dir() {
            return Err(AssetError::NotFound {
                path: self.directory.display().to_string(),
            }
            .into());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() && !is_hidden_file(&path) && is_image_file(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        info!("Found {} overlay assets in {:?}", names.len(), self.directory);
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<RgbaImage> {
        let path = self.directory.join(name);
        if !path.is_file() {
            return Err(AssetError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        debug!("Decoding overlay {:?}", path);
        let image = image::open(&path).map_err(|e| AssetError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(image.to_rgba8())
    }
}

/// Provider over images already held in memory
#[derive(Debug, Default)]
pub struct MemoryAssetProvider {
    assets: Vec<(String, RgbaImage)>,
}

impl MemoryAssetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset<S: Into<String>>(mut self, name: S, image: RgbaImage) -> Self {
        self.assets.push((name.into(), image));
        self
    }
}

impl AssetProvider for MemoryAssetProvider {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.assets.iter().map(|(name, _)| name.clone()).collect())
    }

    fn load(&self, name: &str) -> Result<RgbaImage> {
        self.assets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, image)| image.clone())
            .ok_or_else(|| AssetError::NotFound { path: name.to_string() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_directory_provider_lists_sorted_images() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]))
            .save(dir.path().join("b_leak.png"))
            .unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 128]))
            .save(dir.path().join("a_leak.png"))
            .unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not an image").unwrap();

        let provider = DirectoryAssetProvider::new(dir.path());
        assert_eq!(provider.list().unwrap(), vec!["a_leak.png", "b_leak.png"]);

        let image = provider.load("a_leak.png").unwrap();
        assert_eq!(*image.get_pixel(1, 1), Rgba([0, 255, 0, 128]));
    }

    #[test]
    fn test_directory_provider_errors() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), "definitely not a png").unwrap();
        let provider = DirectoryAssetProvider::new(dir.path());

        assert!(provider.load("missing.png").is_err());
        assert!(matches!(
            provider.load("broken.png"),
            Err(crate::error::CamcorderError::AssetLoadFailure(AssetError::DecodeFailed { .. }))
        ));
        assert!(DirectoryAssetProvider::new(dir.path().join("nope")).list().is_err());
    }

    #[test]
    fn test_memory_provider() {
        let provider = MemoryAssetProvider::new().with_asset("leak", RgbaImage::new(1, 1));
        assert_eq!(provider.list().unwrap(), vec!["leak"]);
        assert!(provider.load("leak").is_ok());
        assert!(provider.load("other").is_err());
    }
}
