//! # Overlay Assets
//!
//! Everything composited on top of the graded picture: light leak and
//! scratch images supplied by an [`AssetProvider`], and the camcorder
//! timestamp rendered from text. All of it is decoded or rendered once into
//! an [`AssetCache`] before the first frame and only read afterwards.

pub mod cache;
pub mod font;
pub mod leaks;
pub mod overlay;
pub mod provider;
pub mod timestamp;

pub use cache::AssetCache;
pub use font::{BitmapFont, OsdFont, OutlineFont};
pub use leaks::leak_for_frame;
pub use overlay::{OverlayAsset, PlacedOverlay};
pub use provider::{AssetProvider, DirectoryAssetProvider, MemoryAssetProvider};
pub use timestamp::{render_timestamp, render_timestamp_with};
