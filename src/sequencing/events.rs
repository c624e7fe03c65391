//! Transport notifications.
//!
//! Observers subscribe to one [`EventKind`] and get their own channel of
//! [`EVENT_CAPACITY`] events. Sends never block the transport: when a
//! subscriber falls that far behind, new events for it are dropped and
//! counted, and a subscriber whose receiver has been dropped is forgotten on
//! the next emit.

use crossbeam_channel::{bounded, Receiver, Sender, TryIter, TrySendError};
use tracing::warn;

/// Events buffered per subscriber before new ones are dropped.
pub const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Step,
    PlayStateChange,
    TrackTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The scheduler advanced to `step_index`.
    Step { step_index: usize },
    PlayStateChange { is_playing: bool },
    TrackTrigger {
        track_id: u32,
        step_index: usize,
        velocity: u8,
    },
}

impl SequencerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SequencerEvent::Step { .. } => EventKind::Step,
            SequencerEvent::PlayStateChange { .. } => EventKind::PlayStateChange,
            SequencerEvent::TrackTrigger { .. } => EventKind::TrackTrigger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Receiving end of one subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    receiver: Receiver<SequencerEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn receiver(&self) -> &Receiver<SequencerEvent> {
        &self.receiver
    }

    /// Events delivered so far, without waiting.
    pub fn try_iter(&self) -> TryIter<'_, SequencerEvent> {
        self.receiver.try_iter()
    }
}

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    sender: Sender<SequencerEvent>,
    dropped: u64,
}

#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind) -> Subscription {
        self.subscribe_with_capacity(kind, EVENT_CAPACITY)
    }

    pub fn subscribe_with_capacity(&mut self, kind: EventKind, capacity: usize) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let (sender, receiver) = bounded(capacity.max(1));
        self.subscribers.push(Subscriber {
            id,
            kind,
            sender,
            dropped: 0,
        });
        Subscription { id, kind, receiver }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Events dropped for `id` because its channel was full.
    pub fn dropped(&self, id: SubscriptionId) -> Option<u64> {
        self.subscribers.iter().find(|s| s.id == id).map(|s| s.dropped)
    }

    pub fn emit(&mut self, event: SequencerEvent) {
        let kind = event.kind();
        self.subscribers.retain_mut(|s| {
            if s.kind != kind {
                return true;
            }
            match s.sender.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    s.dropped += 1;
                    if s.dropped == 1 {
                        warn!(id = s.id.0, ?kind, "subscriber is not keeping up, dropping events");
                    }
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_only_subscribed_kind() {
        let mut hub = EventHub::new();
        let steps = hub.subscribe(EventKind::Step);
        let state = hub.subscribe(EventKind::PlayStateChange);

        hub.emit(SequencerEvent::Step { step_index: 3 });
        hub.emit(SequencerEvent::PlayStateChange { is_playing: true });

        let got: Vec<_> = steps.try_iter().collect();
        assert_eq!(got, vec![SequencerEvent::Step { step_index: 3 }]);
        let got: Vec<_> = state.try_iter().collect();
        assert_eq!(got, vec![SequencerEvent::PlayStateChange { is_playing: true }]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut hub = EventHub::new();
        let steps = hub.subscribe(EventKind::Step);
        assert!(hub.unsubscribe(steps.id()));
        assert!(!hub.unsubscribe(steps.id()));

        hub.emit(SequencerEvent::Step { step_index: 0 });
        assert_eq!(steps.try_iter().count(), 0);
    }

    #[test]
    fn full_subscriber_drops_newest_and_counts() {
        let mut hub = EventHub::new();
        let slow = hub.subscribe_with_capacity(EventKind::Step, 4);
        let fast = hub.subscribe(EventKind::Step);

        for step_index in 0..10 {
            hub.emit(SequencerEvent::Step { step_index });
        }

        let kept: Vec<_> = slow.try_iter().collect();
        let expected: Vec<_> = (0..4).map(|step_index| SequencerEvent::Step { step_index }).collect();
        assert_eq!(kept, expected);
        assert_eq!(hub.dropped(slow.id()), Some(6));
        assert_eq!(fast.try_iter().count(), 10);
        assert_eq!(hub.dropped(fast.id()), Some(0));

        // Draining makes room again; the subscriber is still attached.
        hub.emit(SequencerEvent::Step { step_index: 10 });
        assert_eq!(
            slow.try_iter().collect::<Vec<_>>(),
            vec![SequencerEvent::Step { step_index: 10 }]
        );
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[test]
    fn default_capacity_holds_a_long_backlog() {
        let mut hub = EventHub::new();
        let steps = hub.subscribe(EventKind::Step);
        for step_index in 0..EVENT_CAPACITY + 1 {
            hub.emit(SequencerEvent::Step { step_index });
        }
        assert_eq!(steps.try_iter().count(), EVENT_CAPACITY);
        assert_eq!(hub.dropped(steps.id()), Some(1));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut hub = EventHub::new();
        drop(hub.subscribe(EventKind::TrackTrigger));
        let _kept = hub.subscribe(EventKind::Step);

        hub.emit(SequencerEvent::TrackTrigger {
            track_id: 0,
            step_index: 0,
            velocity: 100,
        });
        assert_eq!(hub.subscriber_count(), 1);
    }
}
