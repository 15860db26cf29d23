use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::transition::Transition;
use crate::events::target::{Event, EventTarget, EventType, Listener, ListenerId, notify};
use crate::foundation::core::BoundingBox;
use crate::render::surface::RenderContext;
use crate::scene::kind::EntityKind;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Grouping label for a parent's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Background,
    Sky,
    Wave,
    CircadianCycle,
    WeatherSky,
    Planet,
    Star,
    Particle,
    Lightning,
}

/// Enter/exit notification. `target` is the entity whose visibility changed.
#[derive(Clone, Debug)]
pub struct EntityEvent {
    pub ty: EventType,
    pub target: EntityRef,
}

impl Event for EntityEvent {
    fn event_type(&self) -> EventType {
        self.ty
    }
}

/// Construction parameters shared by every entity variant.
#[derive(Clone, Debug)]
pub struct EntityParams {
    pub context: RenderContext,
    pub position: BoundingBox,
    /// Defaults to the full drawing surface.
    pub viewport: Option<BoundingBox>,
    pub x_velocity: f64,
    pub y_velocity: f64,
    pub rotation_velocity: f64,
}

impl EntityParams {
    pub fn new(context: RenderContext, position: BoundingBox) -> Self {
        Self {
            context,
            position,
            viewport: None,
            x_velocity: 0.0,
            y_velocity: 0.0,
            rotation_velocity: 0.0,
        }
    }

    pub fn viewport(mut self, viewport: BoundingBox) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn velocity(mut self, x: f64, y: f64) -> Self {
        self.x_velocity = x;
        self.y_velocity = y;
        self
    }

    pub fn rotation_velocity(mut self, degrees_per_update: f64) -> Self {
        self.rotation_velocity = degrees_per_update;
        self
    }
}

/// A node of the scene graph.
///
/// Holds kinematic state, the viewport used for culling, the shared drawing context,
/// the logical frame size and the children grouped by [`Category`]. Variant-specific
/// behaviour lives in [`EntityKind`].
pub struct Entity {
    id: u64,
    position: BoundingBox,
    viewport: BoundingBox,
    x_velocity: f64,
    y_velocity: f64,
    rotation_velocity: f64,
    context: RenderContext,
    frame_width: f64,
    frame_height: f64,
    visible: bool,
    children: Vec<(Category, Vec<EntityRef>)>,
    events: EventTarget<EntityEvent>,
    transition: Option<Transition>,
    kind: EntityKind,
}

impl Entity {
    pub fn new(params: EntityParams, kind: EntityKind) -> Self {
        let EntityParams {
            context,
            mut position,
            viewport,
            x_velocity,
            y_velocity,
            rotation_velocity,
        } = params;

        if !position.rotation.is_finite() {
            position.rotation = 0.0;
        }
        let viewport = viewport.unwrap_or_else(|| {
            let (w, h) = context.size();
            BoundingBox::from_size(f64::from(w), f64::from(h))
        });

        Self {
            id: NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed),
            position,
            viewport,
            x_velocity,
            y_velocity,
            rotation_velocity,
            context,
            frame_width: 0.0,
            frame_height: 0.0,
            visible: false,
            children: Vec::new(),
            events: EventTarget::new(),
            transition: None,
            kind,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn position(&self) -> BoundingBox {
        self.position
    }

    pub fn position_mut(&mut self) -> &mut BoundingBox {
        &mut self.position
    }

    pub fn set_position(&mut self, position: BoundingBox) {
        self.position = position;
    }

    pub fn set_width(&mut self, width: f64) {
        self.position.width = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.position.height = height;
    }

    pub fn viewport(&self) -> BoundingBox {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: BoundingBox) {
        self.viewport = viewport;
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.x_velocity, self.y_velocity)
    }

    pub fn set_velocity(&mut self, x: f64, y: f64) {
        self.x_velocity = x;
        self.y_velocity = y;
    }

    pub fn rotation_velocity(&self) -> f64 {
        self.rotation_velocity
    }

    pub fn set_rotation_velocity(&mut self, degrees_per_update: f64) {
        self.rotation_velocity = degrees_per_update;
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn frame_size(&self) -> (f64, f64) {
        (self.frame_width, self.frame_height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Current value of the attached transition, or `fallback` when there is none.
    pub fn transition_value_or(&self, fallback: f64) -> f64 {
        self.transition.as_ref().map_or(fallback, Transition::value)
    }

    pub fn is_within_viewport(&self) -> bool {
        self.position.overlaps(&self.viewport)
    }

    fn integrate(&mut self) {
        self.position.x += self.x_velocity;
        self.position.y += self.y_velocity;
        if self.rotation_velocity != 0.0 {
            self.position.rotation += self.rotation_velocity;
        }
    }

    /// Recomputes visibility and returns the event owed for the change, if any.
    fn refresh_visibility(&mut self) -> Option<EventType> {
        let was_visible = self.visible;
        self.visible = self.is_within_viewport();
        match (was_visible, self.visible) {
            (false, true) => Some(EventType::EnterFrame),
            (true, false) => Some(EventType::ExitFrame),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("position", &self.position)
            .field("visible", &self.visible)
            .finish()
    }
}

/// Shared handle to an [`Entity`].
///
/// Graph operations never hold a borrow of the entity while calling listeners, kind
/// hooks or children, so any of those may mutate the graph, including the entity that
/// is currently being updated.
#[derive(Clone)]
pub struct EntityRef(Rc<RefCell<Entity>>);

impl EntityRef {
    pub fn new(entity: Entity) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    pub fn borrow(&self) -> Ref<'_, Entity> {
        self.0.borrow()
    }

    /// Do not hold the returned guard across `update`, `render` or listener calls.
    pub fn borrow_mut(&self) -> RefMut<'_, Entity> {
        self.0.borrow_mut()
    }

    pub fn id(&self) -> u64 {
        self.0.borrow().id
    }

    pub fn kind(&self) -> EntityKind {
        self.0.borrow().kind.clone()
    }

    pub fn position(&self) -> BoundingBox {
        self.0.borrow().position
    }

    pub fn viewport(&self) -> BoundingBox {
        self.0.borrow().viewport
    }

    pub fn frame_size(&self) -> (f64, f64) {
        self.0.borrow().frame_size()
    }

    pub fn context(&self) -> RenderContext {
        self.0.borrow().context.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    /// Advances one frame: integrates velocity, recomputes visibility, fires
    /// `EnterFrame`/`ExitFrame` on a change, runs the variant hook, then updates the
    /// children that existed when the hook returned.
    pub fn update(&self) {
        let event = {
            let mut entity = self.0.borrow_mut();
            entity.integrate();
            entity.refresh_visibility()
        };
        if let Some(ty) = event {
            self.dispatch(ty);
        }

        self.kind().after_update(self);

        for child in self.all_children() {
            child.update();
        }
    }

    /// Re-evaluates visibility in place, without moving, and fires the owed
    /// `EnterFrame`/`ExitFrame`. Returns the new visibility.
    pub fn refresh_visibility(&self) -> bool {
        let (event, visible) = {
            let mut entity = self.0.borrow_mut();
            let event = entity.refresh_visibility();
            (event, entity.visible)
        };
        if let Some(ty) = event {
            self.dispatch(ty);
        }
        visible
    }

    /// Draws this entity and then its children. Skipped entirely while not visible.
    pub fn render(&self) {
        {
            let entity = self.0.borrow();
            if !entity.visible {
                return;
            }
            entity
                .context
                .with(|surface| entity.kind.draw(&entity, surface));
        }

        for child in self.all_children() {
            child.render();
        }
    }

    /// Appends `child` under `category`, handing down this entity's frame size if it
    /// already has one.
    pub fn add_child(&self, category: Category, child: EntityRef) {
        let (w, h) = self.frame_size();
        if w != 0.0 && h != 0.0 {
            child.set_frame_size(w, h);
        }

        let mut entity = self.0.borrow_mut();
        match entity.children.iter_mut().find(|(c, _)| *c == category) {
            Some((_, list)) => list.push(child),
            None => entity.children.push((category, vec![child])),
        }
    }

    /// Removes `child` by identity. Returns `false` when it is not a child under `category`.
    pub fn remove_child(&self, category: Category, child: &EntityRef) -> bool {
        let mut entity = self.0.borrow_mut();
        let Some((_, list)) = entity.children.iter_mut().find(|(c, _)| *c == category) else {
            return false;
        };
        match list.iter().position(|e| e.ptr_eq(child)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn children(&self, category: Category) -> Vec<EntityRef> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, list)| list.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, category: Category) -> Option<EntityRef> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|(c, _)| *c == category)
            .and_then(|(_, list)| list.first().cloned())
    }

    pub fn child_count(&self, category: Category) -> usize {
        self.0
            .borrow()
            .children
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, list)| list.len())
    }

    /// Snapshot of every child, categories in insertion order.
    pub fn all_children(&self) -> Vec<EntityRef> {
        self.0
            .borrow()
            .children
            .iter()
            .flat_map(|(_, list)| list.iter().cloned())
            .collect()
    }

    pub fn set_render_context(&self, context: RenderContext) {
        self.0.borrow_mut().context = context.clone();
        for child in self.all_children() {
            child.set_render_context(context.clone());
        }
    }

    pub fn set_frame_size(&self, width: f64, height: f64) {
        {
            let mut entity = self.0.borrow_mut();
            entity.frame_width = width;
            entity.frame_height = height;
        }
        for child in self.all_children() {
            child.set_frame_size(width, height);
        }
    }

    pub fn is_render_context_valid(&self) -> bool {
        let (w, h) = self.frame_size();
        w != 0.0 && h != 0.0
    }

    /// Moves and/or re-targets this entity, then lets the variant re-lay out its children.
    pub fn resize(&self, position: Option<BoundingBox>, viewport: Option<BoundingBox>) {
        {
            let mut entity = self.0.borrow_mut();
            if let Some(position) = position {
                let rotation = entity.position.rotation;
                entity.position = BoundingBox {
                    rotation,
                    ..position
                };
            }
            if let Some(viewport) = viewport {
                entity.viewport = viewport;
            }
        }
        self.kind().on_resize(self);
    }

    pub fn add_listener(&self, ty: EventType, listener: Listener<EntityEvent>) -> ListenerId {
        self.0.borrow_mut().events.add_listener(ty, listener)
    }

    pub fn remove_listener(&self, ty: EventType, id: ListenerId) -> bool {
        self.0.borrow_mut().events.remove_listener(ty, id)
    }

    pub fn listener_count(&self, ty: EventType) -> usize {
        self.0.borrow().events.listener_count(ty)
    }

    pub fn dispatch(&self, ty: EventType) {
        let listeners = self.0.borrow().events.listeners(ty);
        notify(
            &listeners,
            &EntityEvent {
                ty,
                target: self.clone(),
            },
        );
    }

    /// Attaches `transition`, destroying the one it replaces.
    pub fn set_transition(&self, transition: Transition) {
        let previous = self.0.borrow_mut().transition.replace(transition);
        if let Some(previous) = previous {
            previous.destroy();
        }
    }

    pub fn transition(&self) -> Option<Transition> {
        self.0.borrow().transition.clone()
    }

    pub fn clear_transition(&self) {
        let previous = self.0.borrow_mut().transition.take();
        if let Some(previous) = previous {
            previous.destroy();
        }
    }

    /// Drops every listener and the transition, then destroys and detaches all children.
    pub fn destroy(&self) {
        let (transition, kind, children) = {
            let mut entity = self.0.borrow_mut();
            entity.events.remove_all_listeners();
            let children: Vec<EntityRef> = entity
                .children
                .drain(..)
                .flat_map(|(_, list)| list)
                .collect();
            (entity.transition.take(), entity.kind.clone(), children)
        };
        if let Some(transition) = transition {
            transition.destroy();
        }
        kind.on_destroy();
        for child in children {
            child.destroy();
        }
    }

    pub fn downgrade(&self) -> WeakEntityRef {
        WeakEntityRef(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(entity) => entity.fmt(f),
            Err(_) => f.write_str("Entity(<borrowed>)"),
        }
    }
}

/// Non-owning handle, used by listeners and factories to refer back to a parent.
#[derive(Clone, Default)]
pub struct WeakEntityRef(Weak<RefCell<Entity>>);

impl WeakEntityRef {
    pub fn upgrade(&self) -> Option<EntityRef> {
        self.0.upgrade().map(EntityRef)
    }
}

impl std::fmt::Debug for WeakEntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WeakEntityRef")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/entity.rs"]
mod tests;
