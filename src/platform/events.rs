//! Event dispatch
//!
//! Screens own a small bounded `EventQueue` and subscribe it to a facility on
//! the bus. Publishing never blocks: when a queue is full the event is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Event source category a queue can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facility {
    Input,
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Up,
    Down,
    Select,
    Alt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Input { button: Button, action: Action },
    Battery { percent: u8 },
}

impl Event {
    pub fn press(button: Button) -> Self {
        Event::Input {
            button,
            action: Action::Press,
        }
    }

    pub fn release(button: Button) -> Self {
        Event::Input {
            button,
            action: Action::Release,
        }
    }

    pub fn facility(&self) -> Facility {
        match self {
            Event::Input { .. } => Facility::Input,
            Event::Battery { .. } => Facility::Battery,
        }
    }
}

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// Bounded receive queue owned by one screen
pub struct EventQueue {
    id: u64,
    tx: SyncSender<Event>,
    rx: Receiver<Event>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        Self {
            id: NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed),
            tx,
            rx,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait up to `timeout` for the next event; a zero timeout only polls
    pub fn get(&self, timeout: Duration) -> Option<Event> {
        if timeout.is_zero() {
            self.rx.try_recv().ok()
        } else {
            self.rx.recv_timeout(timeout).ok()
        }
    }

    fn sender(&self) -> SyncSender<Event> {
        self.tx.clone()
    }
}

pub trait EventBus: Send + Sync {
    fn listen(&self, facility: Facility, queue: &EventQueue);
    /// Remove every subscription of `queue`
    fn unlisten(&self, queue: &EventQueue);
}

struct Subscriber {
    queue_id: u64,
    facility: Facility,
    tx: SyncSender<Event>,
}

/// In-process event bus
#[derive(Default)]
pub struct InputEvents {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl InputEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every queue subscribed to its facility
    pub fn publish(&self, event: Event) {
        let facility = event.facility();
        let subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        for sub in subscribers.iter().filter(|s| s.facility == facility) {
            match sub.tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::trace!("queue {} full, dropping {:?}", sub.queue_id, event);
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::trace!("queue {} gone, dropping {:?}", sub.queue_id, event);
                }
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventBus for InputEvents {
    fn listen(&self, facility: Facility, queue: &EventQueue) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let already = subscribers
            .iter()
            .any(|s| s.queue_id == queue.id() && s.facility == facility);
        if !already {
            subscribers.push(Subscriber {
                queue_id: queue.id(),
                facility,
                tx: queue.sender(),
            });
        }
    }

    fn unlisten(&self, queue: &EventQueue) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s.queue_id != queue.id());
    }
}
