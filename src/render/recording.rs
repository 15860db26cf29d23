use crate::assets::decode::DecodedAsset;
use crate::foundation::core::{Affine, BezPath, Rect, Vec2};
use crate::render::surface::{DrawSurface, Paint, Shadow};

/// State in effect when a draw command was issued.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedState {
    pub transform: Affine,
    pub alpha: f64,
    pub shadow: Option<Shadow>,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            shadow: None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    ClearRect(Rect),
    FillRect {
        rect: Rect,
        paint: Paint,
        state: RecordedState,
    },
    FillPath {
        path: BezPath,
        paint: Paint,
        state: RecordedState,
    },
    StrokePath {
        path: BezPath,
        paint: Paint,
        width: f64,
        state: RecordedState,
    },
    DrawImage {
        size: (f64, f64),
        dest: Rect,
        state: RecordedState,
    },
}

impl DrawCommand {
    pub fn state(&self) -> Option<&RecordedState> {
        match self {
            Self::ClearRect(_) => None,
            Self::FillRect { state, .. }
            | Self::FillPath { state, .. }
            | Self::StrokePath { state, .. }
            | Self::DrawImage { state, .. } => Some(state),
        }
    }
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    state: RecordedState,
    stack: Vec<RecordedState>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: RecordedState::default(),
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Depth of unmatched `save` calls.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_state(&self) -> RecordedState {
        self.state
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            paint: *paint,
            state: self.state,
        });
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            paint: *paint,
            state: self.state,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, width: f64) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            paint: *paint,
            width,
            state: self.state,
        });
    }

    fn draw_image(&mut self, image: &DecodedAsset, dest: Rect) {
        self.commands.push(DrawCommand::DrawImage {
            size: image.size(),
            dest,
            state: self.state,
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
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

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
