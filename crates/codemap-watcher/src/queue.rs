//! Bounded event queue with duplicate-path coalescing on overflow.
//!
//! The watcher's consumer processes events strictly in order, one at a
//! time, so a full channel means the consumer is behind, not that the
//! filesystem is broken. Rather than drop the newest event outright, a
//! full send parks it in an overflow map keyed by path — a later event
//! for the same path simply replaces the parked one — and every
//! successful send to the channel gives the parked events a chance to
//! drain back in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::WatchEvent;

pub struct BoundedEventQueue {
    tx: mpsc::Sender<WatchEvent>,
    overflow: Arc<Mutex<HashMap<String, WatchEvent>>>,
}

impl BoundedEventQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<WatchEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            BoundedEventQueue {
                tx,
                overflow: Arc::new(Mutex::new(HashMap::new())),
            },
            rx,
        )
    }

    /// Enqueue an event. Never blocks and never panics: a momentarily full
    /// channel coalesces the event into the overflow map instead. Every
    /// call gives previously parked events a chance to drain before the
    /// new one is considered, so overflow entries leave in roughly the
    /// order they first arrived.
    pub fn push(&self, event: WatchEvent) {
        self.drain_overflow();
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.overflow.lock().unwrap().insert(event.path().to_string(), event);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    fn drain_overflow(&self) {
        let pending: Vec<WatchEvent> = {
            let mut overflow = self.overflow.lock().unwrap();
            if overflow.is_empty() {
                return;
            }
            overflow.drain().map(|(_, event)| event).collect()
        };
        for event in pending {
            if let Err(TrySendError::Full(event)) = self.tx.try_send(event) {
                self.overflow.lock().unwrap().insert(event.path().to_string(), event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overflowing_events_for_the_same_path_coalesce_to_the_latest() {
        let (queue, mut rx) = BoundedEventQueue::new(1);
        queue.push(WatchEvent::Modified("a.py".to_string()));
        queue.push(WatchEvent::Modified("b.py".to_string()));
        queue.push(WatchEvent::Deleted("b.py".to_string()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first, WatchEvent::Modified("a.py".to_string()));

        // pushing again gives the overflow map a chance to drain
        queue.push(WatchEvent::Modified("c.py".to_string()));
        let second = rx.recv().await.unwrap();
        assert_eq!(second, WatchEvent::Deleted("b.py".to_string()));

        queue.push(WatchEvent::Modified("c.py".to_string()));
        let third = rx.recv().await.unwrap();
        assert_eq!(third, WatchEvent::Modified("c.py".to_string()));
    }
}
