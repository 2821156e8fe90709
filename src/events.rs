// Refresh signals that flow from completed mutations to interested views
//
// A mutation finishing in one screen (say, deleting an exercise) must make
// any other screen showing the same entity re-fetch. The bus is a typed
// broadcast channel: a closed enum of events instead of stringly-typed
// notification names, so consumers pattern match and the compiler knows
// every event that exists.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{ClientId, SessionId};

/// Capacity of the broadcast ring buffer. Receivers that fall further behind
/// than this see a `Lagged` error on recv and should do a full re-fetch.
const BUS_CAPACITY: usize = 256;

/// "Remote state changed, re-fetch" - scoped to the entity that changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RefreshEvent {
    /// The client roster changed (create/update/delete of a client)
    ClientsChanged,

    /// A client's session list changed
    SessionsChanged { client_id: ClientId },

    /// A session's exercise list or detail changed
    ExercisesChanged {
        client_id: ClientId,
        session_id: SessionId,
    },

    /// A client's nutrition plan changed
    NutritionChanged { client_id: ClientId },
}

/// Many-producer/many-consumer refresh bus
///
/// Delivery is at-least-once to every receiver subscribed at publish time.
/// There is no replay: a receiver obtained after a publish never sees that
/// event. Subscriptions end when the receiver is dropped, which scopes them
/// naturally to a view's lifetime.
#[derive(Debug, Clone)]
pub struct RefreshBus {
    tx: broadcast::Sender<RefreshEvent>,
}

impl RefreshBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Broadcast an event to all current subscribers.
    ///
    /// A send error only means nobody is listening right now, which is fine:
    /// the store already holds the canonical state and the next subscriber
    /// fetches fresh anyway.
    pub fn publish(&self, event: RefreshEvent) {
        tracing::debug!(?event, "publishing refresh event");
        if self.tx.send(event).is_err() {
            tracing::trace!("no refresh subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = RefreshBus::new();
        let mut rx_a = bus.subscribe();
        let mut rx_b = bus.subscribe();

        let event = RefreshEvent::SessionsChanged {
            client_id: ClientId::new("c1"),
        };
        bus.publish(event.clone());

        assert_eq!(rx_a.recv().await.unwrap(), event);
        assert_eq!(rx_b.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn late_subscribers_see_no_replay() {
        let bus = RefreshBus::new();
        // keep one receiver alive so the publish isn't dropped outright
        let _rx_early = bus.subscribe();

        bus.publish(RefreshEvent::ClientsChanged);

        let mut rx_late = bus.subscribe();
        assert_eq!(rx_late.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = RefreshBus::new();
        // must not panic or block
        bus.publish(RefreshEvent::ClientsChanged);
    }
}
