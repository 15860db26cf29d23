use crate::foundation::core::Rect;
use crate::render::surface::RenderContext;
use crate::scene::entity::EntityRef;

/// Owns the top-level entities and drives one update/render pass per frame.
#[derive(Debug, Default)]
pub struct RenderEngine {
    entities: Vec<EntityRef>,
    context: Option<RenderContext>,
    frame_width: f64,
    frame_height: f64,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: RenderContext) -> Self {
        let (w, h) = context.size();
        let mut engine = Self::new();
        engine.set_render_context(context);
        engine.set_frame_size(f64::from(w), f64::from(h));
        engine
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    /// Registers `entity`, handing it the engine's context and frame size when set.
    pub fn add_entity(&mut self, entity: EntityRef) {
        if let Some(context) = self.valid_context() {
            entity.set_render_context(context.clone());
            entity.set_frame_size(self.frame_width, self.frame_height);
        }
        self.entities.push(entity);
    }

    pub fn remove_entity(&mut self, entity: &EntityRef) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| !e.ptr_eq(entity));
        before != self.entities.len()
    }

    pub fn set_render_context(&mut self, context: RenderContext) {
        for entity in &self.entities {
            entity.set_render_context(context.clone());
        }
        self.context = Some(context);
    }

    pub fn set_frame_size(&mut self, width: f64, height: f64) {
        self.frame_width = width;
        self.frame_height = height;
        for entity in &self.entities {
            entity.set_frame_size(width, height);
        }
    }

    pub fn frame_size(&self) -> (f64, f64) {
        (self.frame_width, self.frame_height)
    }

    pub fn is_render_context_valid(&self) -> bool {
        self.valid_context().is_some()
    }

    fn valid_context(&self) -> Option<&RenderContext> {
        self.context
            .as_ref()
            .filter(|_| self.frame_width != 0.0 && self.frame_height != 0.0)
    }

    pub fn update(&self) {
        for entity in self.entities.clone() {
            entity.update();
        }
    }

    /// Clears the frame and renders every entity. Does nothing without a valid context.
    pub fn render(&self) {
        let Some(context) = self.valid_context() else {
            return;
        };
        context.with(|surface| {
            surface.clear_rect(Rect::new(0.0, 0.0, self.frame_width, self.frame_height));
        });
        for entity in self.entities.clone() {
            entity.render();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
