use std::rc::Rc;

/// Event names shared by entities, transitions and the weather store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    EnterFrame,
    ExitFrame,
    Tick,
    Complete,
    Updated,
}

/// Payload carried through an [`EventTarget`].
pub trait Event {
    fn event_type(&self) -> EventType;
}

/// Shared listener callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Handle returned by [`EventTarget::add_listener`], used to remove that listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration<E> {
    ty: EventType,
    id: ListenerId,
    listener: Listener<E>,
}

/// Listener registry for one event payload type.
///
/// The registry is plain data; owners usually keep it behind a `RefCell` and call
/// [`EventTarget::listeners`] to take a snapshot before dispatching, so a listener may
/// add or remove listeners (or tear the owner down) while it runs.
pub struct EventTarget<E> {
    next_id: u64,
    registrations: Vec<Registration<E>>,
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            registrations: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventTarget<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}

impl<E> EventTarget<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, ty: EventType, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { ty, id, listener });
        id
    }

    /// Returns `false` when no listener with this id is registered for `ty`.
    pub fn remove_listener(&mut self, ty: EventType, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| !(r.ty == ty && r.id == id));
        before != self.registrations.len()
    }

    pub fn remove_all_listeners(&mut self) {
        self.registrations.clear();
    }

    /// Snapshot of the listeners registered for `ty`, in registration order.
    pub fn listeners(&self, ty: EventType) -> Vec<Listener<E>> {
        self.registrations
            .iter()
            .filter(|r| r.ty == ty)
            .map(|r| r.listener.clone())
            .collect()
    }

    pub fn listener_count(&self, ty: EventType) -> usize {
        self.registrations.iter().filter(|r| r.ty == ty).count()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl<E: Event> EventTarget<E> {
    /// Dispatches directly from the registry. Only valid when no listener can reach
    /// back into the owner of `self`; otherwise snapshot with `listeners` and use [`notify`].
    pub fn dispatch(&self, event: &E) {
        notify(&self.listeners(event.event_type()), event);
    }
}

pub fn notify<E>(listeners: &[Listener<E>], event: &E) {
    for listener in listeners {
        listener(event);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/target.rs"]
mod tests;
