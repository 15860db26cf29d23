use std::rc::{Rc, Weak};

use crate::events::target::{EventType, Listener};
use crate::foundation::core::BoundingBox;
use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};
use crate::foundation::math::Rng64;
use crate::scene::entity::{Category, Entity, EntityEvent, EntityParams, EntityRef, WeakEntityRef};

/// Where new particles appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnterType {
    /// Anywhere over the parent, including just off its leading edges.
    #[default]
    Center,
    /// Just outside one of the configured edges.
    Edge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxSide {
    Top,
    Right,
    Bottom,
    Left,
}

/// Interval sampled uniformly. The bounds are used as given; `min` may exceed `max`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &Rng64) -> f64 {
        rng.range(self.min, self.max)
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Velocity ranges per axis, plus rotation in degrees per update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityRange {
    pub x: Range,
    pub y: Range,
    pub rotation: Range,
}

/// Edge a particle may enter from, with the velocity it enters with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeEntry {
    pub side: BoxSide,
    pub x: Range,
    pub y: Range,
}

/// Builds the particle entity from its randomized parameters.
pub type ParticleConstructor = Rc<dyn Fn(EntityParams) -> Entity>;

#[derive(Clone)]
pub struct ParticleOptions {
    pub category: Category,
    pub constructor: ParticleConstructor,
    pub size: Range,
    pub velocity: VelocityRange,
    pub edges: Vec<EdgeEntry>,
    pub enter_listener: Option<Listener<EntityEvent>>,
    pub exit_listener: Option<Listener<EntityEvent>>,
}

impl ParticleOptions {
    pub fn new(category: Category, constructor: ParticleConstructor, size: Range) -> Self {
        Self {
            category,
            constructor,
            size,
            velocity: VelocityRange::default(),
            edges: Vec::new(),
            enter_listener: None,
            exit_listener: None,
        }
    }
}

impl std::fmt::Debug for ParticleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleOptions")
            .field("category", &self.category)
            .field("size", &self.size)
            .field("velocity", &self.velocity)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateOptions {
    pub count: usize,
    pub enter_type: EnterType,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            count: 1,
            enter_type: EnterType::Center,
        }
    }
}

impl CreateOptions {
    pub fn center(count: usize) -> Self {
        Self {
            count,
            enter_type: EnterType::Center,
        }
    }

    pub fn edge(count: usize) -> Self {
        Self {
            count,
            enter_type: EnterType::Edge,
        }
    }
}

/// Mints randomized particles into a parent entity.
///
/// The factory keeps no reference to what it creates; each particle is handed to the
/// parent with `add_child` under the configured category.
#[derive(Debug)]
pub struct ParticleFactory {
    parent: WeakEntityRef,
    options: ParticleOptions,
    rng: Rc<Rng64>,
}

impl ParticleFactory {
    pub fn new(
        parent: WeakEntityRef,
        options: ParticleOptions,
        rng: Rc<Rng64>,
    ) -> WeatherscapeResult<Self> {
        validate_options(&options)?;
        Ok(Self {
            parent,
            options,
            rng,
        })
    }

    /// Factory whose particles are replaced as soon as they leave their viewport.
    ///
    /// Any `exit_listener` in `options` is overridden by one that detaches and destroys
    /// the particle, then spawns one new particle at an edge.
    pub fn new_self_replacing(
        parent: WeakEntityRef,
        mut options: ParticleOptions,
        rng: Rc<Rng64>,
    ) -> WeatherscapeResult<Rc<Self>> {
        validate_options(&options)?;
        if options.edges.is_empty() {
            return Err(WeatherscapeError::configuration(
                "self-replacing particles need at least one edge entry",
            ));
        }
        Ok(Rc::new_cyclic(|me: &Weak<Self>| {
            let me = me.clone();
            let on_exit: Listener<EntityEvent> = Rc::new(move |event: &EntityEvent| {
                if let Some(factory) = me.upgrade() {
                    factory.replace(&event.target);
                }
            });
            options.exit_listener = Some(on_exit);
            Self {
                parent,
                options,
                rng,
            }
        }))
    }

    pub fn options(&self) -> &ParticleOptions {
        &self.options
    }

    pub fn create(&self, opts: CreateOptions) -> WeatherscapeResult<Vec<EntityRef>> {
        if opts.enter_type == EnterType::Edge && self.options.edges.is_empty() {
            return Err(WeatherscapeError::configuration(
                "edge spawning requires at least one edge entry",
            ));
        }
        let parent = self.parent.upgrade().ok_or_else(|| {
            WeatherscapeError::configuration("particle factory parent no longer exists")
        })?;
        let (bounds, context) = {
            let p = parent.borrow();
            (p.position(), p.context().clone())
        };

        let mut created = Vec::with_capacity(opts.count);
        for _ in 0..opts.count {
            let size = self.options.size.sample(&self.rng);
            let edge = match opts.enter_type {
                EnterType::Center => None,
                EnterType::Edge => Some(self.pick_edge(&bounds)),
            };
            let (vx, vy) = match edge {
                None => (
                    self.options.velocity.x.sample(&self.rng),
                    self.options.velocity.y.sample(&self.rng),
                ),
                Some(edge) => (edge.x.sample(&self.rng), edge.y.sample(&self.rng)),
            };
            let rotation_velocity = self.options.velocity.rotation.sample(&self.rng);

            let params = EntityParams::new(
                context.clone(),
                BoundingBox::new(bounds.x, bounds.y, size, size),
            )
            .viewport(bounds)
            .velocity(vx, vy)
            .rotation_velocity(rotation_velocity);
            let particle = EntityRef::new((self.options.constructor)(params));
            // Placed after construction: constructors may resize the particle.
            {
                let mut entity = particle.borrow_mut();
                let position = entity.position_mut();
                let (width, height) = (position.width, position.height);
                let (x, y) = match edge {
                    None => (
                        self.rng.range(-width, bounds.width),
                        self.rng.range(-height, bounds.height),
                    ),
                    Some(edge) => self.edge_coordinates(edge.side, &bounds, width, height),
                };
                position.x = bounds.x + x;
                position.y = bounds.y + y;
            }
            if let Some(listener) = &self.options.enter_listener {
                particle.add_listener(EventType::EnterFrame, listener.clone());
            }
            if let Some(listener) = &self.options.exit_listener {
                particle.add_listener(EventType::ExitFrame, listener.clone());
            }
            parent.add_child(self.options.category, particle.clone());
            // Every spawn overlaps the parent, so it is on screen from the start and is
            // guaranteed an `ExitFrame` once it drifts off.
            particle.refresh_visibility();
            created.push(particle);
        }
        Ok(created)
    }

    /// Detaches and destroys `particle`, then spawns its successor at an edge.
    pub fn replace(&self, particle: &EntityRef) {
        if let Some(parent) = self.parent.upgrade() {
            parent.remove_child(self.options.category, particle);
        }
        particle.destroy();
        match self.create(CreateOptions::edge(1)) {
            Ok(_) => tracing::debug!(category = ?self.options.category, "particle replaced"),
            Err(err) => tracing::error!(%err, "replacement particle could not be created"),
        }
    }

    /// Length-weighted choice over the configured edges. Callers guarantee at least one.
    fn pick_edge(&self, bounds: &BoundingBox) -> EdgeEntry {
        let edges = &self.options.edges;
        let total: f64 = edges.iter().map(|e| side_length(e.side, bounds)).sum();
        if total <= 0.0 {
            let index = self.rng.below(edges.len() as f64) as usize;
            return edges[index.min(edges.len() - 1)];
        }

        let position = self.rng.below(total);
        let mut cumulative = 0.0;
        for edge in edges {
            cumulative += side_length(edge.side, bounds);
            if position < cumulative {
                return *edge;
            }
        }
        edges[edges.len() - 1]
    }

    /// Offset from the parent origin for a particle entering through `side`.
    fn edge_coordinates(
        &self,
        side: BoxSide,
        bounds: &BoundingBox,
        width: f64,
        height: f64,
    ) -> (f64, f64) {
        match side {
            BoxSide::Top => (self.rng.range(0.0, bounds.width), -height),
            BoxSide::Right => (bounds.width, self.rng.range(0.0, bounds.height)),
            BoxSide::Bottom => (self.rng.range(0.0, bounds.width), bounds.height),
            BoxSide::Left => (-width, self.rng.range(0.0, bounds.height)),
        }
    }
}

fn validate_options(options: &ParticleOptions) -> WeatherscapeResult<()> {
    let v = &options.velocity;
    let ranges_finite = [options.size, v.x, v.y, v.rotation]
        .iter()
        .chain(options.edges.iter().flat_map(|e| [&e.x, &e.y]))
        .all(Range::is_finite);
    if !ranges_finite {
        return Err(WeatherscapeError::configuration(
            "particle ranges must be finite",
        ));
    }
    Ok(())
}

pub fn side_length(side: BoxSide, bounds: &BoundingBox) -> f64 {
    match side {
        BoxSide::Top | BoxSide::Bottom => bounds.width,
        BoxSide::Left | BoxSide::Right => bounds.height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/particle_factory.rs"]
mod tests;
