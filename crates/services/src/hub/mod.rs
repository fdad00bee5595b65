pub mod event;
pub mod topic;

pub use event::{EventKind, HubEvent, MessageEvent, RoomEvent, UnreadDelta};
pub use topic::{Topic, TopicParseError};

use std::sync::Arc;

use dashmap::DashMap;
use parley_config::HubSettings;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A subscriber is one connection's outbound lane: serialized events are
/// pushed into `tx` and a socket task on the other end writes them out.
#[derive(Clone)]
struct Subscriber {
    id: String,
    tx: mpsc::Sender<String>,
}

/// Topic-addressed fan-out hub. `publish` never blocks the caller: events
/// go through a bounded queue drained by a background worker, and both
/// queue overflow and slow subscribers drop events with a warning rather
/// than stalling the write path. Delivery is at-least-once at best;
/// clients reconcile by refetch.
pub struct EventHub {
    topics: DashMap<String, Vec<Subscriber>>,
    tx: mpsc::Sender<HubEvent>,
    subscriber_capacity: usize,
}

impl EventHub {
    /// Creates the hub and spawns its worker. Must be called from within
    /// a tokio runtime.
    pub fn spawn(settings: &HubSettings) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let hub = Arc::new(Self {
            topics: DashMap::new(),
            tx,
            subscriber_capacity: settings.subscriber_capacity.max(1),
        });
        tokio::spawn(run_worker(hub.clone(), rx));
        hub
    }

    pub fn subscriber_capacity(&self) -> usize {
        self.subscriber_capacity
    }

    /// Fire-and-forget publish. A full or closed queue is delivery
    /// degradation, never an error for the caller.
    pub fn publish(&self, event: HubEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(ev) => {
                    warn!(topic = %ev.topic, "Event hub queue full, dropping event");
                }
                mpsc::error::TrySendError::Closed(ev) => {
                    warn!(topic = %ev.topic, "Event hub worker gone, dropping event");
                }
            }
        }
    }

    pub fn subscribe(&self, topic: &Topic, subscriber_id: &str, tx: mpsc::Sender<String>) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber {
                id: subscriber_id.to_string(),
                tx,
            });
        debug!(%topic, subscriber_id, "Hub subscription added");
    }

    /// Drops every subscription held by a connection. Called on socket
    /// teardown.
    pub fn unsubscribe_all(&self, subscriber_id: &str) {
        self.topics.retain(|_, subscribers| {
            subscribers.retain(|s| s.id != subscriber_id);
            !subscribers.is_empty()
        });
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(&topic.to_string())
            .map(|s| s.len())
            .unwrap_or(0)
    }

    fn dispatch(&self, event: &HubEvent) {
        let Some(subscribers) = self
            .topics
            .get(&event.topic.to_string())
            .map(|s| s.clone())
        else {
            return;
        };

        let text = match serde_json::to_string(&event.kind) {
            Ok(t) => t,
            Err(e) => {
                warn!(topic = %event.topic, %e, "Failed to serialize hub event");
                return;
            }
        };

        for subscriber in subscribers {
            if subscriber.tx.try_send(text.clone()).is_err() {
                warn!(
                    topic = %event.topic,
                    subscriber_id = %subscriber.id,
                    "Subscriber lagging or gone, dropping event"
                );
            }
        }
    }
}

async fn run_worker(hub: Arc<EventHub>, mut rx: mpsc::Receiver<HubEvent>) {
    while let Some(event) = rx.recv().await {
        hub.dispatch(&event);
    }
}
