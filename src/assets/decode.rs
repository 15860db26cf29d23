use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::WeatherscapeResult;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parsed vector image plus the scale and padding it should be drawn with.
#[derive(Clone, Debug)]
pub struct VectorImage {
    pub tree: Arc<usvg::Tree>,
    pub scale: f64,
    pub padding: f64,
}

impl VectorImage {
    pub fn new(tree: usvg::Tree) -> Self {
        Self {
            tree: Arc::new(tree),
            scale: 1.0,
            padding: 0.0,
        }
    }

    /// Intrinsic size of the document before scaling.
    pub fn intrinsic_size(&self) -> (f64, f64) {
        let size = self.tree.size();
        (f64::from(size.width()), f64::from(size.height()))
    }

    /// Size the image occupies once scaled, with `padding` on every side.
    pub fn display_size(&self) -> (f64, f64) {
        let (w, h) = self.intrinsic_size();
        (
            w * self.scale + self.padding * 2.0,
            h * self.scale + self.padding * 2.0,
        )
    }
}

/// An asset ready to be drawn.
#[derive(Clone, Debug)]
pub enum DecodedAsset {
    Raster(Arc<RasterImage>),
    Vector(Arc<VectorImage>),
}

impl DecodedAsset {
    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Vector(svg) => svg.display_size(),
        }
    }

    /// Stable identity for caches keyed on the underlying allocation.
    pub fn cache_id(&self) -> usize {
        match self {
            Self::Raster(img) => Arc::as_ptr(img) as usize,
            Self::Vector(svg) => Arc::as_ptr(svg) as usize,
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> WeatherscapeResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(RasterImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> WeatherscapeResult<VectorImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(VectorImage::new(tree))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
