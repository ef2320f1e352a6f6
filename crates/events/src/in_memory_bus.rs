//! In-process callback bus.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::bus::{EventBus, Handler, Subscription};

type SharedHandler<M> = Arc<dyn Fn(&M) + Send + Sync + 'static>;

struct Registry<M: 'static> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, SharedHandler<M>)>>,
}

/// Synchronous in-process bus.
///
/// Dispatch snapshots the registry before invoking anything, so handlers
/// may subscribe, unsubscribe or publish re-entrantly; a subscriber added
/// mid-dispatch first sees the *next* publish.
pub struct InMemoryEventBus<M: 'static> {
    registry: Arc<Registry<M>>,
}

impl<M: 'static> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: 'static> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl<M: 'static> core::fmt::Debug for InMemoryEventBus<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let subscribers = self
            .registry
            .handlers
            .lock()
            .map(|handlers| handlers.len())
            .unwrap_or(0);
        f.debug_struct("InMemoryEventBus")
            .field("subscribers", &subscribers)
            .finish()
    }
}

impl<M: 'static> EventBus<M> for InMemoryEventBus<M> {
    fn publish(&self, message: M) {
        let handlers: Vec<(u64, SharedHandler<M>)> = match self.registry.handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => {
                tracing::error!("subscriber registry poisoned; dropping notification");
                return;
            }
        };

        for (id, handler) in handlers {
            // A panicking subscriber must not starve the ones after it.
            if catch_unwind(AssertUnwindSafe(|| handler(&message))).is_err() {
                tracing::error!(subscriber = id, "subscriber panicked while handling a notification");
            }
        }
    }

    fn subscribe(&self, handler: Handler<M>) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let shared: SharedHandler<M> = Arc::from(handler);

        if let Ok(mut handlers) = self.registry.handlers.lock() {
            handlers.push((id, shared));
        }

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                if let Ok(mut handlers) = registry.handlers.lock() {
                    handlers.retain(|(handler_id, _)| *handler_id != id);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn publish_with_no_subscribers_is_a_no_op() {
        let bus = InMemoryEventBus::<u32>::new();
        bus.publish(1);
    }

    #[test]
    fn delivers_once_per_subscriber_in_registration_order() {
        let bus = InMemoryEventBus::<u32>::new();
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let _first = bus.subscribe(Box::new(move |_| first_log.lock().unwrap().push("first")));
        let second_log = Arc::clone(&log);
        let _second = bus.subscribe(Box::new(move |_| second_log.lock().unwrap().push("second")));

        bus.publish(1);
        bus.publish(2);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first", "second", "first", "second"]
        );
    }

    #[test]
    fn panicking_subscriber_does_not_starve_later_ones() {
        let bus = InMemoryEventBus::<u32>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let _bad = bus.subscribe(Box::new(|_| panic!("boom")));
        let seen_by_good = Arc::clone(&seen);
        let _good = bus.subscribe(Box::new(move |_| {
            seen_by_good.fetch_add(1, Ordering::SeqCst);
        }));

        // Quiet the default hook while the intentional panic fires.
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        bus.publish(1);
        std::panic::set_hook(previous_hook);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_guard_unsubscribes() {
        let bus = InMemoryEventBus::<u32>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_by_handler = Arc::clone(&seen);
        let guard = bus.subscribe(Box::new(move |_| {
            seen_by_handler.fetch_add(1, Ordering::SeqCst);
        }));

        bus.publish(1);
        drop(guard);
        bus.publish(2);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_unsubscribes() {
        let bus = InMemoryEventBus::<u32>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_by_handler = Arc::clone(&seen);
        let guard = bus.subscribe(Box::new(move |_| {
            seen_by_handler.fetch_add(1, Ordering::SeqCst);
        }));

        guard.cancel();
        bus.publish(1);

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscriber_added_mid_dispatch_first_sees_the_next_publish() {
        let bus = Arc::new(InMemoryEventBus::<u32>::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let guards: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

        let bus_in_handler = Arc::clone(&bus);
        let seen_in_handler = Arc::clone(&seen);
        let guards_in_handler = Arc::clone(&guards);
        let _outer = bus.subscribe(Box::new(move |_| {
            let seen = Arc::clone(&seen_in_handler);
            let guard = bus_in_handler.subscribe(Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));
            guards_in_handler.lock().unwrap().push(guard);
        }));

        bus.publish(1);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        bus.publish(2);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
