//! Weatherscape renders an animated, weather-reactive background scene.
//!
//! The scene is a tree of [`Entity`] nodes: a background, a sky holding the day/night
//! cycle and an optional weather sky full of particles, and a scrolling wave. Every
//! frame the [`RenderEngine`] updates the tree (velocity integration, viewport culling,
//! enter/exit events) and then renders the visible part of it onto a [`DrawSurface`].
//!
//! # Building blocks
//!
//! - [`Transition`]: a self-driving scalar animation with `Tick`/`Complete` events.
//! - [`ParticleFactory`]: randomized particle spawning at the center or along weighted edges.
//! - [`FrameLimiter`]: caps the host's per-frame callbacks to a target FPS.
//! - [`Host`]: the clock and frame scheduler the above run on; [`ManualClock`] and
//!   [`FrameQueue`] make everything deterministic in tests and offline rendering.
//! - [`CpuSurface`]: `vello_cpu` rasterizer; [`RecordingSurface`] records draw calls instead.
//!
//! The whole engine is single-threaded (`Rc`/`RefCell`). Only asset decoding runs on
//! other threads, and its results are picked up from the frame loop.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod events;
mod foundation;
mod host;
mod render;
mod scene;
mod weather;

pub use animation::transition::{Transition, TransitionEvent, TransitionParams, lerp};
pub use assets::decode::{DecodedAsset, RasterImage, VectorImage, decode_image, parse_svg};
pub use assets::library::{
    AssetLibrary, AssetMap, CLOUD_URLS, MOON_URL, SNOWFLAKE_URL, SceneAssets,
    normalize_vector_assets,
};
pub use assets::loader::{
    AssetDescriptor, AssetLoader, AssetType, FsAssetLoader, normalize_asset_url,
};
pub use events::target::{Event, EventTarget, EventType, Listener, ListenerId, notify};
pub use foundation::config::{FPS_ENV, SceneConfig};
pub use foundation::core::{Affine, BezPath, BoundingBox, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{WeatherscapeError, WeatherscapeResult};
pub use foundation::math::{Rng64, degrees_to_radians};
pub use host::Host;
pub use host::clock::{Clock, ManualClock, SystemClock};
pub use host::frame_limiter::FrameLimiter;
pub use host::scheduler::{FrameCallback, FrameQueue, FrameRequestId, FrameScheduler};
pub use render::cpu::CpuSurface;
pub use render::engine::RenderEngine;
pub use render::glow::{DEFAULT_GLOW_BLUR, default_glow, with_glow};
pub use render::recording::{DrawCommand, RecordedState, RecordingSurface};
pub use render::surface::{
    DrawSurface, LinearGradient, Paint, RenderContext, Shadow, circle_path,
};
pub use scene::Scene;
pub use scene::entities::circadian::{CircadianPhase, classify as classify_circadian};
pub use scene::entities::particle_sky::SkyPreset;
pub use scene::entities::sky::is_snow_season;
pub use scene::entity::{
    Category, Entity, EntityEvent, EntityParams, EntityRef, WeakEntityRef,
};
pub use scene::env::SceneEnv;
pub use scene::kind::{EntityKind, ParticleKind, Planet};
pub use scene::particle_factory::{
    BoxSide, CreateOptions, EdgeEntry, EnterType, ParticleConstructor, ParticleFactory,
    ParticleOptions, Range, VelocityRange,
};
pub use scene::weather_factory::{WeatherEntityFactory, WeatherSkyKind};
pub use weather::condition::WeatherCondition;
pub use weather::flags::FeatureFlags;
pub use weather::snapshot::WeatherSnapshot;
pub use weather::store::{WeatherEvent, WeatherSource, WeatherStore};
