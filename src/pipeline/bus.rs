// src/pipeline/bus.rs
//
// Subscriber delivery. Consumers register once and receive orientation
// states in emission order; identical consecutive values are never
// forwarded. All publishes happen from the pipeline's worker thread,
// which is the single delivery context.

use crate::types::OrientationState;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

pub struct OrientationBus {
    subscribers: Vec<Sender<OrientationState>>,
    last_published: Option<OrientationState>,
}

impl OrientationBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            last_published: None,
        }
    }

    /// Register a consumer. The channel is unbounded so publishing never
    /// blocks on a slow consumer.
    pub fn subscribe(&mut self) -> Receiver<OrientationState> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Forward `state` to every live subscriber unless it equals the last
    /// forwarded value. Disconnected subscribers are pruned on the way.
    /// Returns true when a delivery happened.
    ///
    /// The duplicate filter here is independent of the classifier's
    /// previous-state: the classifier re-emits unchanged states every
    /// pass, and this is where those re-emissions die.
    pub fn publish(&mut self, state: OrientationState) -> bool {
        if self.last_published == Some(state) {
            return false;
        }
        self.last_published = Some(state);

        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(state).is_ok());
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            debug!("pruned {} disconnected subscriber(s)", dropped);
        }

        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn last_published(&self) -> Option<OrientationState> {
        self.last_published
    }
}

impl Default for OrientationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrientationState::*;

    #[test]
    fn test_delivery_in_emission_order() {
        let mut bus = OrientationBus::new();
        let rx = bus.subscribe();

        bus.publish(Portrait);
        bus.publish(LandscapeLeft);
        bus.publish(PortraitUpsideDown);

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![Portrait, LandscapeLeft, PortraitUpsideDown]);
    }

    #[test]
    fn test_consecutive_duplicates_suppressed() {
        let mut bus = OrientationBus::new();
        let rx = bus.subscribe();

        assert!(bus.publish(Portrait));
        assert!(!bus.publish(Portrait));
        assert!(!bus.publish(Portrait));
        assert!(bus.publish(LandscapeLeft));

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![Portrait, LandscapeLeft]);
    }

    #[test]
    fn test_non_consecutive_repeat_is_delivered() {
        let mut bus = OrientationBus::new();
        let rx = bus.subscribe();

        bus.publish(Portrait);
        bus.publish(LandscapeLeft);
        bus.publish(Portrait);

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![Portrait, LandscapeLeft, Portrait]);
    }

    #[test]
    fn test_every_subscriber_sees_every_change() {
        let mut bus = OrientationBus::new();
        let rx_a = bus.subscribe();
        let rx_b = bus.subscribe();

        bus.publish(LandscapeRight);
        bus.publish(Portrait);

        assert_eq!(
            rx_a.try_iter().collect::<Vec<_>>(),
            vec![LandscapeRight, Portrait]
        );
        assert_eq!(
            rx_b.try_iter().collect::<Vec<_>>(),
            vec![LandscapeRight, Portrait]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut bus = OrientationBus::new();
        let rx_kept = bus.subscribe();
        let rx_dropped = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx_dropped);
        bus.publish(LandscapeLeft);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(rx_kept.try_iter().collect::<Vec<_>>(), vec![LandscapeLeft]);
    }

    #[test]
    fn test_late_subscriber_sees_only_later_changes() {
        let mut bus = OrientationBus::new();
        bus.publish(Portrait);

        let rx = bus.subscribe();
        bus.publish(LandscapeLeft);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![LandscapeLeft]);
        assert_eq!(bus.last_published(), Some(LandscapeLeft));
    }
}
