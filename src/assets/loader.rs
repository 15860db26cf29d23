use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use rayon::prelude::*;

use crate::assets::decode::{DecodedAsset, decode_image, parse_svg};
use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Image,
    Svg,
}

/// One asset to fetch. `url` doubles as the key in the loaded map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AssetDescriptor {
    #[serde(rename = "type")]
    pub ty: AssetType,
    pub url: String,
}

impl AssetDescriptor {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            ty: AssetType::Image,
            url: url.into(),
        }
    }

    pub fn svg(url: impl Into<String>) -> Self {
        Self {
            ty: AssetType::Svg,
            url: url.into(),
        }
    }
}

/// Fetches and decodes a batch of assets.
///
/// Failed assets are left out of the returned map; callers treat a missing key as
/// "not available" and draw without it.
pub trait AssetLoader: Send + Sync {
    fn load(&self, descriptors: &[AssetDescriptor]) -> HashMap<String, DecodedAsset>;
}

/// Loads asset URLs relative to a directory on disk.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads one asset, reporting why it failed.
    pub fn load_one(&self, descriptor: &AssetDescriptor) -> WeatherscapeResult<DecodedAsset> {
        let rel = normalize_asset_url(&descriptor.url)?;
        let path = self.root.join(&rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))?;
        Ok(match descriptor.ty {
            AssetType::Image => DecodedAsset::Raster(Arc::new(decode_image(&bytes)?)),
            AssetType::Svg => DecodedAsset::Vector(Arc::new(parse_svg(&bytes)?)),
        })
    }
}

impl AssetLoader for FsAssetLoader {
    #[tracing::instrument(skip_all, fields(root = %self.root.display(), count = descriptors.len()))]
    fn load(&self, descriptors: &[AssetDescriptor]) -> HashMap<String, DecodedAsset> {
        descriptors
            .par_iter()
            .filter_map(|d| match self.load_one(d) {
                Ok(asset) => Some((d.url.clone(), asset)),
                Err(err) => {
                    tracing::warn!(url = %d.url, error = %err, "asset failed to load");
                    None
                }
            })
            .collect()
    }
}

/// Maps a site-absolute asset URL such as `/images/weather/moon.svg` onto a relative path.
///
/// Backslashes become `/`, empty and `.` segments are dropped, and `..` is rejected.
pub fn normalize_asset_url(url: &str) -> WeatherscapeResult<String> {
    let s = url.replace('\\', "/");
    let s = s.trim_start_matches('/');
    if s.is_empty() {
        return Err(WeatherscapeError::asset("asset url must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(WeatherscapeError::asset("asset urls must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(WeatherscapeError::asset("asset url must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
