use boxoffice_core::{Event, Result};

/// Owner of event records and the only writer of their capacity counters.
pub trait EventRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `NotFound` if no event has this id.
    fn find_by_id(&self, id: &str) -> Result<Event>;

    /// Replace the stored record with the same id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no event has this id.
    fn update(&self, event: Event) -> Result<()>;

    /// Apply `f` to the stored event as one atomic step.
    ///
    /// The change is kept only if `f` succeeds; no other writer can observe or
    /// interleave with the event in between.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no event has this id, or the error from `f`.
    fn update_with<T, F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Event) -> Result<T>;

    /// Insert or replace an event.
    fn add_event(&self, event: Event);

    /// Copies of all events, ordered by id.
    fn events(&self) -> Vec<Event>;
}
