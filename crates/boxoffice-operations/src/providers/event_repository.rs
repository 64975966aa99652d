use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use boxoffice_core::{DomainError, EntityKind, Event, Result};
use tracing::{debug, warn};

use crate::traits::EventRepository;

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<BTreeMap<String, Event>>,
}

impl InMemoryEventRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository. A later event with an id already seen replaces
    /// the earlier one, and the replacement is logged.
    #[must_use]
    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut seeded = BTreeMap::new();
        for event in events {
            if let Some(replaced) = seeded.insert(event.id.clone(), event) {
                warn!(event_id = %replaced.id, "duplicate event id, keeping the later one");
            }
        }
        Self {
            events: RwLock::new(seeded),
        }
    }
}

impl EventRepository for InMemoryEventRepository {
    fn find_by_id(&self, id: &str) -> Result<Event> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(EntityKind::Event, id))
    }

    fn update(&self, event: Event) -> Result<()> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        let stored = events
            .get_mut(&event.id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Event, &event.id))?;
        *stored = event;
        Ok(())
    }

    fn update_with<T, F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Event) -> Result<T>,
    {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        let stored = events
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Event, id))?;

        let mut draft = stored.clone();
        let value = f(&mut draft)?;
        debug!(
            event_id = id,
            sold_before = stored.sold_tickets(),
            sold_after = draft.sold_tickets(),
            "updated event"
        );
        *stored = draft;
        Ok(value)
    }

    fn add_event(&self, event: Event) {
        debug!(event_id = %event.id, max_tickets = event.max_tickets(), "adding event");
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event.id.clone(), event);
    }

    fn events(&self) -> Vec<Event> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
