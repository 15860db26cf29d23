use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::decode::{DecodedAsset, RasterImage, VectorImage};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};
use crate::render::blur::{blur_rgba8_premul, premul_over_in_place, premul_over_px, radius_for_sigma};
use crate::render::surface::{DrawSurface, LinearGradient, Paint, Shadow};

const STROKE_TOLERANCE: f64 = 0.1;
const PAINT_CACHE_LIMIT: usize = 32;

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine,
    alpha: f64,
    shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            shadow: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    from: [u8; 4],
    to: [u8; 4],
    start: (i64, i64),
    end: (i64, i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ImageKey {
    id: usize,
    width: u32,
    height: u32,
}

enum Shape {
    Rect(Rect),
    Path(BezPath),
}

impl Shape {
    fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Path(p) => p.bounding_box(),
        }
    }
}

enum Fill {
    Color(Rgba8),
    Image {
        image: vello_cpu::Image,
        paint_transform: Affine,
    },
}

/// `vello_cpu` raster surface.
///
/// Draw calls are batched into a `vello_cpu` render context and composited onto a
/// premultiplied RGBA8 accumulation buffer whenever the batch has to be observed
/// (clears, shadows, snapshots). Shadowed draws are rendered alone so their alpha
/// can be blurred into a shadow before the shape itself is composited.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pending: bool,
    accum: Vec<u8>,
    state: DrawState,
    saved: Vec<DrawState>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    // The asset is kept alongside its paint so the pointer used as key stays unique.
    image_cache: HashMap<ImageKey, (DecodedAsset, vello_cpu::Image)>,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> WeatherscapeResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| WeatherscapeError::configuration("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| WeatherscapeError::configuration("surface height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(WeatherscapeError::configuration(
                "surface width and height must be > 0",
            ));
        }
        Ok(Self {
            width: width_u16,
            height: height_u16,
            ctx: vello_cpu::RenderContext::new(width_u16, height_u16),
            pending: false,
            accum: vec![0u8; width as usize * height as usize * 4],
            state: DrawState::default(),
            saved: Vec::new(),
            gradient_cache: HashMap::new(),
            image_cache: HashMap::new(),
        })
    }

    /// Flushes pending draws and returns the frame as straight-alpha RGBA8.
    pub fn snapshot(&mut self) -> WeatherscapeResult<image::RgbaImage> {
        self.flush();
        let mut data = self.accum.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(u32::from(self.width), u32::from(self.height), data)
            .ok_or_else(|| WeatherscapeError::render("snapshot buffer size mismatch"))
    }

    fn flush(&mut self) {
        if !self.pending {
            return;
        }
        let layer = self.render_batch();
        premul_over_in_place(&mut self.accum, layer.data_as_u8_slice());
        self.pending = false;
    }

    fn render_batch(&mut self) -> vello_cpu::Pixmap {
        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut layer);
        self.ctx.reset();
        layer
    }

    fn submit(&mut self, shape: Shape, fill: Fill, transform: Affine) {
        let alpha = self.state.alpha;
        if alpha <= 0.0 || transform.determinant().abs() < 1e-12 {
            return;
        }
        match self.state.shadow.filter(Shadow::is_visible) {
            None => {
                self.encode(&shape, &fill, transform, alpha);
                self.pending = true;
            }
            Some(shadow) => {
                self.flush();
                self.encode(&shape, &fill, transform, alpha);
                let layer = self.render_batch();
                let bounds = transform.transform_rect_bbox(shape.bounds());
                self.composite_shadow(layer.data_as_u8_slice(), bounds, shadow);
                premul_over_in_place(&mut self.accum, layer.data_as_u8_slice());
            }
        }
    }

    fn encode(&mut self, shape: &Shape, fill: &Fill, transform: Affine, alpha: f64) {
        let ctx = &mut self.ctx;
        ctx.set_transform(affine_to_cpu(transform));
        match fill {
            Fill::Color(c) => {
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            }
            Fill::Image {
                image,
                paint_transform,
            } => {
                ctx.set_paint_transform(affine_to_cpu(*paint_transform));
                ctx.set_paint(image.clone());
            }
        }

        let layered = alpha < 1.0;
        if layered {
            ctx.push_opacity_layer(alpha as f32);
        }
        match shape {
            Shape::Rect(r) => ctx.fill_rect(&rect_to_cpu(*r)),
            Shape::Path(p) => ctx.fill_path(&bezpath_to_cpu(p)),
        }
        if layered {
            ctx.pop_layer();
        }
    }

    fn composite_shadow(&mut self, layer: &[u8], bounds: Rect, shadow: Shadow) {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        // Canvas shadow blur is twice the gaussian standard deviation.
        let sigma = shadow.blur / 2.0;
        let pad = f64::from(radius_for_sigma(sigma));
        let region = Rect::new(
            bounds.x0 + shadow.offset.x - pad,
            bounds.y0 + shadow.offset.y - pad,
            bounds.x1 + shadow.offset.x + pad,
            bounds.y1 + shadow.offset.y + pad,
        );
        let x0 = (region.x0.floor() as i64).clamp(0, w);
        let y0 = (region.y0.floor() as i64).clamp(0, h);
        let x1 = (region.x1.ceil() as i64).clamp(0, w);
        let y1 = (region.y1.ceil() as i64).clamp(0, h);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let (rw, rh) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let (dx, dy) = (
            shadow.offset.x.round() as i64,
            shadow.offset.y.round() as i64,
        );
        let tint = shadow.color.to_premul_array();

        let mut mask = vec![0u8; rw * rh * 4];
        for y in 0..rh {
            for x in 0..rw {
                let sx = x0 + x as i64 - dx;
                let sy = y0 + y as i64 - dy;
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let a = u16::from(layer[((sy * w + sx) as usize) * 4 + 3]);
                if a == 0 {
                    continue;
                }
                let idx = (y * rw + x) * 4;
                for c in 0..4 {
                    mask[idx + c] = ((u16::from(tint[c]) * a + 127) / 255) as u8;
                }
            }
        }

        let blurred = match blur_rgba8_premul(&mask, rw as u32, rh as u32, sigma) {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "skipping shadow");
                return;
            }
        };
        for y in 0..rh {
            let row = (((y0 + y as i64) * w + x0) as usize) * 4;
            for x in 0..rw {
                let d = row + x * 4;
                let s = (y * rw + x) * 4;
                premul_over_px(&mut self.accum[d..d + 4], &blurred[s..s + 4]);
            }
        }
    }

    fn paint_fill(&mut self, paint: &Paint, transform: Affine) -> Fill {
        match paint {
            Paint::Solid(c) => Fill::Color(*c),
            Paint::LinearGradient(g) => match self.gradient_paint(g, transform) {
                Ok(image) => Fill::Image {
                    image,
                    paint_transform: transform.inverse(),
                },
                Err(err) => {
                    tracing::warn!(error = %err, "falling back to gradient start colour");
                    Fill::Color(g.from)
                }
            },
        }
    }

    /// Gradient rasterized in device space over the whole surface.
    fn gradient_paint(
        &mut self,
        g: &LinearGradient,
        transform: Affine,
    ) -> WeatherscapeResult<vello_cpu::Image> {
        let start = transform * g.start;
        let end = transform * g.end;
        let quantize = |p: Point| ((p.x * 4.0).round() as i64, (p.y * 4.0).round() as i64);
        let key = GradientKey {
            from: [g.from.r, g.from.g, g.from.b, g.from.a],
            to: [g.to.r, g.to.g, g.to.b, g.to.a],
            start: quantize(start),
            end: quantize(end),
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }

        let (w, h) = (u32::from(self.width), u32::from(self.height));
        let axis: Vec2 = end - start;
        let len2 = axis.hypot2();
        let mut bytes = vec![0u8; w as usize * h as usize * 4];
        for y in 0..h {
            for x in 0..w {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = if len2 <= f64::EPSILON {
                    0.0
                } else {
                    ((p - start).dot(axis) / len2).clamp(0.0, 1.0)
                };
                let lerp = |a: u8, b: u8| -> u8 {
                    let (af, bf) = (f64::from(a), f64::from(b));
                    (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
                };
                let c = Rgba8::rgba(
                    lerp(g.from.r, g.to.r),
                    lerp(g.from.g, g.to.g),
                    lerp(g.from.b, g.to.b),
                    lerp(g.from.a, g.to.a),
                );
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&c.to_premul_array());
            }
        }
        let img = premul_bytes_to_image(&bytes, w, h)?;
        if self.gradient_cache.len() >= PAINT_CACHE_LIMIT {
            self.gradient_cache.clear();
        }
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn raster_paint(
        &mut self,
        asset: &DecodedAsset,
        img: &RasterImage,
    ) -> WeatherscapeResult<(vello_cpu::Image, f64, f64)> {
        let key = ImageKey {
            id: asset.cache_id(),
            width: img.width,
            height: img.height,
        };
        let paint = match self.image_cache.get(&key) {
            Some((_, paint)) => paint.clone(),
            None => {
                let paint = premul_bytes_to_image(img.rgba8_premul.as_slice(), img.width, img.height)?;
                self.cache_image(key, asset, paint.clone());
                paint
            }
        };
        Ok((paint, f64::from(img.width), f64::from(img.height)))
    }

    fn vector_paint(
        &mut self,
        asset: &DecodedAsset,
        svg: &VectorImage,
        dest: Rect,
    ) -> WeatherscapeResult<(vello_cpu::Image, f64, f64)> {
        let width = dest.width().abs().round().max(1.0) as u32;
        let height = dest.height().abs().round().max(1.0) as u32;
        let key = ImageKey {
            id: asset.cache_id(),
            width,
            height,
        };
        let paint = match self.image_cache.get(&key) {
            Some((_, paint)) => paint.clone(),
            None => {
                let rgba8_premul = rasterize_vector(svg, width, height)?;
                let paint = premul_bytes_to_image(&rgba8_premul, width, height)?;
                self.cache_image(key, asset, paint.clone());
                paint
            }
        };
        Ok((paint, f64::from(width), f64::from(height)))
    }

    fn cache_image(&mut self, key: ImageKey, asset: &DecodedAsset, paint: vello_cpu::Image) {
        if self.image_cache.len() >= PAINT_CACHE_LIMIT {
            self.image_cache.clear();
        }
        self.image_cache.insert(key, (asset.clone(), paint));
    }
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl DrawSurface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.flush();
        let device = self.state.transform.transform_rect_bbox(rect);
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let x0 = (device.x0.floor() as i64).clamp(0, w) as usize;
        let x1 = (device.x1.ceil() as i64).clamp(0, w) as usize;
        let y0 = (device.y0.floor() as i64).clamp(0, h) as usize;
        let y1 = (device.y1.ceil() as i64).clamp(0, h) as usize;
        let stride = w as usize * 4;
        for y in y0..y1 {
            self.accum[y * stride + x0 * 4..y * stride + x1 * 4].fill(0);
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let transform = self.state.transform;
        let fill = self.paint_fill(paint, transform);
        self.submit(Shape::Rect(rect), fill, transform);
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let transform = self.state.transform;
        let fill = self.paint_fill(paint, transform);
        self.submit(Shape::Path(path.clone()), fill, transform);
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, width: f64) {
        if width <= 0.0 {
            return;
        }
        let outline = kurbo::stroke(
            path.iter(),
            &kurbo::Stroke::new(width),
            &kurbo::StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        self.fill_path(&outline, paint);
    }

    fn draw_image(&mut self, image: &DecodedAsset, dest: Rect) {
        if dest.width() == 0.0 || dest.height() == 0.0 {
            return;
        }
        let resolved = match image {
            DecodedAsset::Raster(img) => self.raster_paint(image, img),
            DecodedAsset::Vector(svg) => self.vector_paint(image, svg, dest),
        };
        match resolved {
            Ok((paint, iw, ih)) => {
                let transform = self.state.transform
                    * Affine::translate((dest.x0, dest.y0))
                    * Affine::scale_non_uniform(dest.width() / iw, dest.height() / ih);
                self.submit(
                    Shape::Rect(Rect::new(0.0, 0.0, iw, ih)),
                    Fill::Image {
                        image: paint,
                        paint_transform: Affine::IDENTITY,
                    },
                    transform,
                );
            }
            Err(err) => tracing::warn!(error = %err, "skipping image draw"),
        }
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform * Affine::translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * Affine::rotate(radians);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }
}

fn rasterize_vector(svg: &VectorImage, width: u32, height: u32) -> WeatherscapeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WeatherscapeError::render("failed to allocate svg pixmap"))?;
    let (dw, dh) = svg.display_size();
    if dw <= 0.0 || dh <= 0.0 {
        return Err(WeatherscapeError::render("svg has an empty display size"));
    }
    let kx = f64::from(width) / dw;
    let ky = f64::from(height) / dh;
    let xform = resvg::tiny_skia::Transform::from_row(
        (svg.scale * kx) as f32,
        0.0,
        0.0,
        (svg.scale * ky) as f32,
        (svg.padding * kx) as f32,
        (svg.padding * ky) as f32,
    );

    resvg::render(&svg.tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

fn premul_bytes_to_image(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> WeatherscapeResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WeatherscapeError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WeatherscapeError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(WeatherscapeError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((u16::from(px[c]) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
