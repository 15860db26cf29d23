pub(crate) mod entities;
pub(crate) mod entity;
pub(crate) mod env;
pub(crate) mod kind;
pub(crate) mod particle_factory;
pub(crate) mod weather_factory;

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::BoundingBox;
use crate::host::frame_limiter::FrameLimiter;
use crate::render::engine::RenderEngine;
use crate::render::surface::RenderContext;
use crate::scene::entities::root::create_root;
use crate::scene::entity::EntityRef;
use crate::scene::env::SceneEnv;

/// Composition root: the scene graph under one root entity, the engine driving it and
/// the services it was built with.
#[derive(Debug)]
pub struct Scene {
    env: Rc<SceneEnv>,
    engine: Rc<RefCell<RenderEngine>>,
    root: EntityRef,
}

impl Scene {
    #[tracing::instrument(skip_all)]
    pub fn new(env: Rc<SceneEnv>, context: RenderContext) -> Self {
        let frame = frame_of(&context);
        tracing::debug!(width = frame.width, height = frame.height, "building scene");
        let root = create_root(&env, context.clone(), frame);
        let mut engine = RenderEngine::with_context(context);
        engine.add_entity(root.clone());
        Self {
            env,
            engine: Rc::new(RefCell::new(engine)),
            root,
        }
    }

    pub fn env(&self) -> &Rc<SceneEnv> {
        &self.env
    }

    pub fn root(&self) -> &EntityRef {
        &self.root
    }

    /// One frame: collect finished asset loads, then update and render.
    pub fn tick(&self) {
        run_frame(&self.env, &self.engine);
    }

    /// Re-targets the scene at a new surface and re-lays out the graph for its size.
    pub fn resize(&self, context: RenderContext) {
        let frame = frame_of(&context);
        {
            let mut engine = self.engine.borrow_mut();
            engine.set_render_context(context);
            engine.set_frame_size(frame.width, frame.height);
        }
        self.root.resize(Some(frame), Some(frame));
    }

    /// Drives `tick` from `limiter` until the limiter is stopped.
    pub fn run(&self, limiter: &FrameLimiter) {
        let env = self.env.clone();
        let engine = self.engine.clone();
        limiter.start(move || run_frame(&env, &engine));
    }

    pub fn destroy(&self) {
        self.engine.borrow_mut().remove_entity(&self.root);
        self.root.destroy();
    }
}

fn frame_of(context: &RenderContext) -> BoundingBox {
    let (w, h) = context.size();
    BoundingBox::from_size(f64::from(w), f64::from(h))
}

fn run_frame(env: &SceneEnv, engine: &RefCell<RenderEngine>) {
    env.assets.poll_all();
    let engine = engine.borrow();
    engine.update();
    engine.render();
}
