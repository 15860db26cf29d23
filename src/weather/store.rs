use std::cell::RefCell;
use crate::events::target::{Event, EventTarget, EventType, Listener, ListenerId, notify};
use crate::foundation::error::WeatherscapeResult;
use crate::weather::snapshot::WeatherSnapshot;

/// Sent with `EventType::Updated` whenever the cached reading changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherEvent {
    pub snapshot: Option<WeatherSnapshot>,
}

impl Event for WeatherEvent {
    fn event_type(&self) -> EventType {
        EventType::Updated
    }
}

/// Read side of the weather cache. `weather()` is `None` until the first reading lands.
pub trait WeatherSource {
    fn weather(&self) -> Option<WeatherSnapshot>;
    fn add_listener(&self, listener: Listener<WeatherEvent>) -> ListenerId;
    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// Cached weather reading fed by whatever polls the weather API.
#[derive(Debug, Default)]
pub struct WeatherStore {
    current: RefCell<Option<WeatherSnapshot>>,
    events: RefCell<EventTarget<WeatherEvent>>,
}

impl WeatherStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: WeatherSnapshot) -> Self {
        let store = Self::new();
        *store.current.borrow_mut() = Some(snapshot);
        store
    }

    /// Replaces the cached reading. Listeners are only notified when it differs.
    pub fn publish(&self, snapshot: Option<WeatherSnapshot>) -> bool {
        if *self.current.borrow() == snapshot {
            return false;
        }
        *self.current.borrow_mut() = snapshot;
        tracing::debug!(?snapshot, "weather updated");
        let listeners = self.events.borrow().listeners(EventType::Updated);
        notify(&listeners, &WeatherEvent { snapshot });
        true
    }

    pub fn publish_json(&self, body: &str) -> WeatherscapeResult<bool> {
        let snapshot = WeatherSnapshot::from_response_json(body)?;
        Ok(self.publish(Some(snapshot)))
    }

    pub fn listener_count(&self) -> usize {
        self.events.borrow().listener_count(EventType::Updated)
    }
}

impl WeatherSource for WeatherStore {
    fn weather(&self) -> Option<WeatherSnapshot> {
        *self.current.borrow()
    }

    fn add_listener(&self, listener: Listener<WeatherEvent>) -> ListenerId {
        self.events
            .borrow_mut()
            .add_listener(EventType::Updated, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.events
            .borrow_mut()
            .remove_listener(EventType::Updated, id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/weather/store.rs"]
mod tests;
