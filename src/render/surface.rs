use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::decode::DecodedAsset;
use crate::foundation::core::{BezPath, Point, Rect, Rgba8, Vec2};

/// Two-stop linear gradient between `start` and `end`, in local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub from: Rgba8,
    pub to: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    LinearGradient(LinearGradient),
}

impl From<Rgba8> for Paint {
    fn from(color: Rgba8) -> Self {
        Self::Solid(color)
    }
}

/// Drop shadow applied to every draw call while set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    pub blur: f64,
    pub offset: Vec2,
}

impl Shadow {
    pub fn is_visible(&self) -> bool {
        self.color.a > 0 && (self.blur > 0.0 || self.offset != Vec2::ZERO)
    }
}

/// Immediate-mode 2D drawing surface.
///
/// Draw calls use the current transform, global alpha and shadow. `save`/`restore`
/// push and pop all three.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);
    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, paint: &Paint);
    fn fill_path(&mut self, path: &BezPath, paint: &Paint);
    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, width: f64);
    fn draw_image(&mut self, image: &DecodedAsset, dest: Rect);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Rotation in radians, clockwise in screen space.
    fn rotate(&mut self, radians: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_shadow(&mut self, shadow: Option<Shadow>);
}

/// Shared handle to the surface every entity of a scene draws into.
#[derive(Clone)]
pub struct RenderContext {
    surface: Rc<RefCell<dyn DrawSurface>>,
}

impl RenderContext {
    pub fn new<S: DrawSurface + 'static>(surface: Rc<RefCell<S>>) -> Self {
        Self { surface }
    }

    pub fn from_surface<S: DrawSurface + 'static>(surface: S) -> Self {
        Self::new(Rc::new(RefCell::new(surface)))
    }

    /// Runs `f` with exclusive access to the surface. Must not be re-entered from `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn DrawSurface) -> R) -> R {
        let mut surface = self.surface.borrow_mut();
        f(&mut *surface)
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.borrow().size()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.surface, &other.surface)
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("size", &self.size())
            .finish()
    }
}

/// Circle inscribed in `rect`'s width, anchored at its top-left corner.
pub fn circle_path(rect: Rect) -> BezPath {
    use kurbo::Shape;

    let radius = rect.width() / 2.0;
    kurbo::Circle::new((rect.x0 + radius, rect.y0 + radius), radius).to_path(0.1)
}
