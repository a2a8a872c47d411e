//! Thread-safe tracker wrapper with a ticking lifecycle and event fan-out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::clock::Clock;
use super::engine::{CycleSnapshot, CycleTracker};
use super::ticker::TickerHandle;
use crate::events::Event;
use crate::storage::KvBackend;

/// How often an activated tracker refreshes "now".
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A [`CycleTracker`] behind a mutex.
///
/// Ticks and mutations take the same lock, so the profile and its derived
/// state always change together. Clones share the tracker and the event
/// channel.
pub struct SharedTracker<B, C: Clock> {
    inner: Arc<Mutex<CycleTracker<B, C>>>,
    event_tx: broadcast::Sender<Event>,
}

impl<B, C: Clock> Clone for SharedTracker<B, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<B, C: Clock> std::fmt::Debug for SharedTracker<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTracker")
            .field("event_tx", &"<broadcast::Sender>")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

impl<B: KvBackend, C: Clock> SharedTracker<B, C> {
    pub fn new(tracker: CycleTracker<B, C>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(tracker)),
            event_tx,
        }
    }

    /// Subscribe to snapshots and mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        self.lock().snapshot()
    }

    /// Run a read-only query against the tracker under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&CycleTracker<B, C>) -> R) -> R {
        f(&self.lock())
    }

    /// Refresh "now" and publish the resulting snapshot.
    pub fn tick(&self) -> CycleSnapshot {
        let (transition, snapshot) = {
            let mut tracker = self.lock();
            let transition = tracker.tick();
            (transition, tracker.snapshot())
        };
        if let Some(event) = transition {
            self.publish(event);
        }
        self.publish(Event::StateSnapshot(snapshot.clone()));
        snapshot
    }

    pub fn initialize_user(&self, name: &str, count: u32, date: DateTime<Utc>) -> Event {
        let event = self.lock().initialize_user(name, count, date);
        self.publish(event.clone());
        event
    }

    pub fn record_donation_today(&self) -> Event {
        let event = self.lock().record_donation_today();
        self.publish(event.clone());
        event
    }

    pub fn reset_data(&self) -> Event {
        let event = self.lock().reset_data();
        self.publish(event.clone());
        event
    }

    fn lock(&self) -> MutexGuard<'_, CycleTracker<B, C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: Event) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("no subscribers for tracker event");
        }
    }
}

impl<B, C> SharedTracker<B, C>
where
    B: KvBackend + 'static,
    C: Clock + 'static,
    CycleTracker<B, C>: Send,
{
    /// Start ticking once a second. The returned handle owns the timer.
    pub fn activate(&self) -> TickerHandle {
        self.activate_every(TICK_PERIOD)
    }

    pub fn activate_every(&self, period: Duration) -> TickerHandle {
        let tracker = self.clone();
        TickerHandle::spawn(period, move || {
            tracker.tick();
        })
    }
}
