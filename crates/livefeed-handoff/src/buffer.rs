use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// Single-slot synchronized exchange for exactly one producer and one consumer.
///
/// Items are released through their `Drop` implementation. Dropping a
/// superseded item happens on the producer thread while the lock is held, so
/// it must be cheap.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use livefeed_handoff::HandoffBuffer;
///
/// let buffer = Arc::new(HandoffBuffer::new());
/// let consumer = {
///     let buffer = Arc::clone(&buffer);
///     std::thread::spawn(move || buffer.pop())
/// };
///
/// buffer.push(42u32);
/// assert_eq!(consumer.join().unwrap(), Some(42));
/// buffer.stop();
/// ```
pub struct HandoffBuffer<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

struct Slot<T> {
    item: Option<T>,
    stopped: bool,
    pushed: u64,
    popped: u64,
    superseded: u64,
}

/// Counters describing the traffic through a [`HandoffBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandoffStats {
    /// Items handed to `push`.
    pub pushed: u64,
    /// Items returned by `pop`.
    pub popped: u64,
    /// Items dropped because a newer one replaced them before being popped.
    pub superseded: u64,
}

impl<T> HandoffBuffer<T> {
    /// Create an empty, running buffer.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                item: None,
                stopped: false,
                pushed: 0,
                popped: 0,
                superseded: 0,
            }),
            ready: Condvar::new(),
        }
    }

    // A panicking peer must not wedge the other side; the slot is always
    // left consistent between statements.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand an item to the consumer, dropping any item still waiting.
    ///
    /// Never blocks on the consumer and never fails. Pushing after
    /// [`stop`](Self::stop) still installs the item; it can no longer be
    /// popped and is released when the buffer is dropped.
    pub fn push(&self, item: T) {
        let mut slot = self.lock();

        if let Some(superseded) = slot.item.take() {
            drop(superseded);
            slot.superseded += 1;
            trace!(superseded = slot.superseded, "dropped unconsumed item");
        }

        slot.item = Some(item);
        slot.pushed += 1;
        self.ready.notify_one();
    }

    /// Take the newest item, blocking until one is pushed or the buffer stops.
    ///
    /// Returns `None` once stopped, even if an item is still resident.
    pub fn pop(&self) -> Option<T> {
        let mut slot = self.lock();

        while !slot.stopped && slot.item.is_none() {
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if slot.stopped {
            return None;
        }

        let item = slot.item.take();
        slot.popped += 1;
        item
    }

    /// Stop the buffer and wake every waiter. Idempotent; never undone.
    pub fn stop(&self) {
        let mut slot = self.lock();
        if !slot.stopped {
            trace!("handoff buffer stopped");
        }
        slot.stopped = true;
        self.ready.notify_all();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Snapshot of the traffic counters.
    pub fn stats(&self) -> HandoffStats {
        let slot = self.lock();
        HandoffStats {
            pushed: slot.pushed,
            popped: slot.popped,
            superseded: slot.superseded,
        }
    }
}

impl<T> Default for HandoffBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HandoffBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("HandoffBuffer")
            .field("occupied", &slot.item.is_some())
            .field("stopped", &slot.stopped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    struct Tracked {
        name: &'static str,
        log: Log,
    }

    impl Tracked {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Arc::clone(log),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    fn drops(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn latest_push_wins() {
        let log = Log::default();
        let buffer = HandoffBuffer::new();

        buffer.push(Tracked::new("a", &log));
        assert!(drops(&log).is_empty());

        buffer.push(Tracked::new("b", &log));
        assert_eq!(drops(&log), ["a"]);

        let popped = buffer.pop().unwrap();
        assert_eq!(popped.name, "b");
        assert_eq!(drops(&log), ["a"]);

        drop(popped);
        drop(buffer);
        assert_eq!(drops(&log), ["a", "b"]);
    }

    #[test]
    fn stats_count_superseded_items() {
        let buffer = HandoffBuffer::new();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.pop(), Some(3));

        assert_eq!(
            buffer.stats(),
            HandoffStats {
                pushed: 3,
                popped: 1,
                superseded: 2,
            }
        );
    }

    #[test]
    fn pop_blocks_until_stop() {
        let buffer = Arc::new(HandoffBuffer::<u32>::new());
        let returned = Arc::new(AtomicBool::new(false));

        let consumer = {
            let buffer = Arc::clone(&buffer);
            let returned = Arc::clone(&returned);
            thread::spawn(move || {
                let item = buffer.pop();
                returned.store(true, Ordering::SeqCst);
                item
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!returned.load(Ordering::SeqCst));

        buffer.stop();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn pop_wakes_on_push() {
        let buffer = Arc::new(HandoffBuffer::new());

        let consumer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.pop())
        };

        thread::sleep(Duration::from_millis(20));
        buffer.push(String::from("frame"));
        assert_eq!(consumer.join().unwrap().as_deref(), Some("frame"));
    }

    #[test]
    fn stopped_buffer_keeps_resident_item_until_teardown() {
        let log = Log::default();
        let buffer = HandoffBuffer::new();

        buffer.push(Tracked::new("c", &log));
        buffer.stop();
        assert!(buffer.pop().is_none());
        assert!(drops(&log).is_empty());

        drop(buffer);
        assert_eq!(drops(&log), ["c"]);
    }

    #[test]
    fn push_after_stop_is_installed_but_never_popped() {
        let log = Log::default();
        let buffer = HandoffBuffer::new();
        buffer.stop();

        buffer.push(Tracked::new("d", &log));
        buffer.push(Tracked::new("e", &log));
        assert_eq!(drops(&log), ["d"]);
        assert!(buffer.pop().is_none());

        drop(buffer);
        assert_eq!(drops(&log), ["d", "e"]);
    }

    #[test]
    fn stop_is_idempotent() {
        let buffer = HandoffBuffer::<u8>::new();
        assert!(!buffer.is_stopped());
        buffer.stop();
        buffer.stop();
        assert!(buffer.is_stopped());
        assert!(buffer.pop().is_none());
    }

    #[test]
    fn consumer_sees_increasing_sequence() {
        let buffer = Arc::new(HandoffBuffer::new());

        let consumer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(n) = buffer.pop() {
                    seen.push(n);
                }
                seen
            })
        };

        for n in 0..10_000u32 {
            buffer.push(n);
        }
        thread::sleep(Duration::from_millis(20));
        buffer.stop();

        let seen = consumer.join().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));

        let stats = buffer.stats();
        assert_eq!(stats.pushed, 10_000);
        assert_eq!(stats.popped, seen.len() as u64);
        assert!(stats.popped + stats.superseded <= stats.pushed);
    }

    #[test]
    fn debug_reports_occupancy() {
        let buffer = HandoffBuffer::new();
        buffer.push(1u8);
        let debug = format!("{buffer:?}");
        assert!(debug.contains("occupied: true"));
        assert!(debug.contains("stopped: false"));
    }

    /// Panics when dropped if `explode` is set.
    struct Fragile {
        id: u32,
        explode: bool,
    }

    impl Drop for Fragile {
        fn drop(&mut self) {
            if self.explode {
                panic!("fragile item {} dropped", self.id);
            }
        }
    }

    #[test]
    fn poisoned_lock_keeps_working() {
        let buffer = Arc::new(HandoffBuffer::new());
        buffer.push(Fragile {
            id: 1,
            explode: true,
        });

        let pusher = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                buffer.push(Fragile {
                    id: 2,
                    explode: false,
                })
            })
        };
        assert!(pusher.join().is_err());
        assert!(buffer.slot.is_poisoned());

        buffer.push(Fragile {
            id: 3,
            explode: false,
        });
        assert_eq!(buffer.pop().map(|item| item.id), Some(3));
        assert_eq!(buffer.stats().pushed, 2);

        let waiter = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.pop().map(|item| item.id))
        };
        thread::sleep(Duration::from_millis(50));
        buffer.stop();
        assert_eq!(waiter.join().unwrap(), None);
        assert!(buffer.is_stopped());
    }
}
