use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use crate::assets::decode::{DecodedAsset, VectorImage};
use crate::assets::loader::{AssetDescriptor, AssetLoader};

pub type AssetMap = HashMap<String, DecodedAsset>;

type PostProcess = fn(&mut AssetMap);

/// Write-once cache for one group of assets.
///
/// The map is resolved exactly once, either synchronously or by a worker thread whose
/// result is picked up by [`AssetLibrary::poll`] from the frame loop. Until then every
/// lookup returns `None` and drawing code skips the asset.
pub struct AssetLibrary {
    name: &'static str,
    descriptors: Vec<AssetDescriptor>,
    post_process: Option<PostProcess>,
    loaded: OnceCell<AssetMap>,
    pending: RefCell<Option<mpsc::Receiver<AssetMap>>>,
}

impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("name", &self.name)
            .field("descriptors", &self.descriptors.len())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl AssetLibrary {
    pub fn new(name: &'static str, descriptors: Vec<AssetDescriptor>) -> Self {
        Self {
            name,
            descriptors,
            post_process: None,
            loaded: OnceCell::new(),
            pending: RefCell::new(None),
        }
    }

    /// Runs `post` over the map once, right before it is stored.
    pub fn with_post_process(mut self, post: PostProcess) -> Self {
        self.post_process = Some(post);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptors(&self) -> &[AssetDescriptor] {
        &self.descriptors
    }

    /// Stores the loaded map. Returns `false` if the library was already resolved.
    pub fn resolve(&self, mut assets: AssetMap) -> bool {
        if self.loaded.get().is_some() {
            return false;
        }
        if let Some(post) = self.post_process {
            post(&mut assets);
        }
        tracing::debug!(library = self.name, count = assets.len(), "assets resolved");
        self.loaded.set(assets).is_ok()
    }

    pub fn load_blocking(&self, loader: &dyn AssetLoader) -> bool {
        if self.is_loaded() {
            return false;
        }
        self.resolve(loader.load(&self.descriptors))
    }

    /// Starts loading on a worker thread. Call [`AssetLibrary::poll`] to collect the result.
    pub fn load_in_background(&self, loader: Arc<dyn AssetLoader>) {
        if self.is_loaded() || self.pending.borrow().is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let descriptors = self.descriptors.clone();
        std::thread::spawn(move || {
            let _ = tx.send(loader.load(&descriptors));
        });
        *self.pending.borrow_mut() = Some(rx);
    }

    /// Non-blocking; returns `true` when the library is resolved.
    pub fn poll(&self) -> bool {
        if self.is_loaded() {
            return true;
        }
        let received = {
            let pending = self.pending.borrow();
            match pending.as_ref().map(|rx| rx.try_recv()) {
                Some(Ok(map)) => Some(Ok(map)),
                Some(Err(mpsc::TryRecvError::Disconnected)) => Some(Err(())),
                Some(Err(mpsc::TryRecvError::Empty)) | None => None,
            }
        };
        match received {
            Some(Ok(map)) => {
                self.pending.borrow_mut().take();
                self.resolve(map)
            }
            Some(Err(())) => {
                self.pending.borrow_mut().take();
                tracing::warn!(library = self.name, "asset worker exited without a result");
                false
            }
            None => false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn get(&self, key: &str) -> Option<&DecodedAsset> {
        self.loaded.get().and_then(|m| m.get(key))
    }

    /// Keys of the assets that actually loaded, in descriptor order.
    pub fn keys(&self) -> Vec<&str> {
        let Some(map) = self.loaded.get() else {
            return Vec::new();
        };
        self.descriptors
            .iter()
            .map(|d| d.url.as_str())
            .filter(|url| map.contains_key(*url))
            .collect()
    }
}

/// Scales every vector asset in `assets` by one shared factor so the largest fits
/// `max_width` x `max_height`, and pads each by `padding` on every side.
pub fn normalize_vector_assets(assets: &mut AssetMap, max_width: f64, max_height: f64, padding: f64) {
    let (mut widest, mut tallest) = (0.0f64, 0.0f64);
    for asset in assets.values() {
        if let DecodedAsset::Vector(svg) = asset {
            let (w, h) = svg.intrinsic_size();
            widest = widest.max(w);
            tallest = tallest.max(h);
        }
    }
    if widest <= 0.0 || tallest <= 0.0 {
        return;
    }
    let scale = (max_width / widest).min(max_height / tallest);

    for asset in assets.values_mut() {
        if let DecodedAsset::Vector(svg) = asset {
            *svg = Arc::new(VectorImage {
                tree: svg.tree.clone(),
                scale,
                padding,
            });
        }
    }
}

pub const CLOUD_URLS: [&str; 8] = [
    "/images/weather/cloud-01.svg",
    "/images/weather/cloud-02.svg",
    "/images/weather/cloud-03.svg",
    "/images/weather/cloud-04.svg",
    "/images/weather/cloud-05.svg",
    "/images/weather/cloud-06.svg",
    "/images/weather/cloud-07.svg",
    "/images/weather/cloud-08.svg",
];
pub const MOON_URL: &str = "/images/weather/moon.svg";
pub const SNOWFLAKE_URL: &str = "/images/weather/snowflake-01.svg";

const CLOUD_MAX_WIDTH: f64 = 256.0;
const CLOUD_MAX_HEIGHT: f64 = 200.0;
const CLOUD_PADDING: f64 = 10.0;

fn normalize_clouds(assets: &mut AssetMap) {
    normalize_vector_assets(assets, CLOUD_MAX_WIDTH, CLOUD_MAX_HEIGHT, CLOUD_PADDING);
}

/// Every asset group the scene draws from.
#[derive(Debug)]
pub struct SceneAssets {
    pub clouds: AssetLibrary,
    pub moon: AssetLibrary,
    pub snowflake: AssetLibrary,
}

impl Default for SceneAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneAssets {
    pub fn new() -> Self {
        Self {
            clouds: AssetLibrary::new(
                "clouds",
                CLOUD_URLS.iter().map(|u| AssetDescriptor::svg(*u)).collect(),
            )
            .with_post_process(normalize_clouds),
            moon: AssetLibrary::new("moon", vec![AssetDescriptor::svg(MOON_URL)]),
            snowflake: AssetLibrary::new("snowflake", vec![AssetDescriptor::svg(SNOWFLAKE_URL)]),
        }
    }

    fn libraries(&self) -> [&AssetLibrary; 3] {
        [&self.clouds, &self.moon, &self.snowflake]
    }

    #[tracing::instrument(skip_all)]
    pub fn load_all_blocking(&self, loader: &dyn AssetLoader) {
        for library in self.libraries() {
            library.load_blocking(loader);
        }
    }

    pub fn load_all_in_background(&self, loader: Arc<dyn AssetLoader>) {
        for library in self.libraries() {
            library.load_in_background(loader.clone());
        }
    }

    /// Returns `true` once every group is resolved.
    pub fn poll_all(&self) -> bool {
        self.libraries()
            .into_iter()
            .fold(true, |all, library| library.poll() && all)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
