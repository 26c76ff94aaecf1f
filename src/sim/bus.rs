use super::signal::{Signal, SignalTopic};

/// Opaque token returned by `EventBus::subscribe`; the only way to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

type Handler = Box<dyn FnMut(&Signal)>;

struct Subscription {
    handle: SubscriptionHandle,
    topic: SignalTopic,
    owner: String,
    handler: Handler,
}

/// Synchronous publish/subscribe for signals leaving the simulation.
///
/// Handlers run in subscription order. A second subscription by the same owner to the
/// same topic is rejected, since closures cannot be compared for identity.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_handle: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        topic: SignalTopic,
        owner: &str,
        handler: impl FnMut(&Signal) + 'static,
    ) -> Option<SubscriptionHandle> {
        if self
            .subscriptions
            .iter()
            .any(|s| s.topic == topic && s.owner == owner)
        {
            tracing::warn!("`{owner}` is already subscribed to {topic:?}; ignoring duplicate");
            return None;
        }
        self.next_handle += 1;
        let handle = SubscriptionHandle(self.next_handle);
        self.subscriptions.push(Subscription {
            handle,
            topic,
            owner: owner.to_string(),
            handler: Box::new(handler),
        });
        Some(handle)
    }

    /// Returns false if the handle was never issued or is already unsubscribed.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.handle != handle);
        before != self.subscriptions.len()
    }

    pub fn publish(&mut self, signal: &Signal) {
        let topic = signal.topic();
        for subscription in self.subscriptions.iter_mut() {
            if subscription.topic == topic {
                (subscription.handler)(signal);
            }
        }
    }

    pub fn subscriber_count(&self, topic: SignalTopic) -> usize {
        self.subscriptions.iter().filter(|s| s.topic == topic).count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn died(id: u64) -> Signal {
        Signal::CharacterDied { character_id: id }
    }

    #[test]
    fn delivers_only_matching_topics_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&log);
        bus.subscribe(SignalTopic::CharacterDied, "first", move |s| {
            if let Signal::CharacterDied { character_id } = s {
                first.borrow_mut().push(format!("first:{character_id}"));
            }
        });
        let second = Rc::clone(&log);
        bus.subscribe(SignalTopic::CharacterDied, "second", move |_| {
            second.borrow_mut().push("second".to_string());
        });
        let never = Rc::clone(&log);
        bus.subscribe(SignalTopic::NewYear, "first", move |_| {
            never.borrow_mut().push("new year".to_string());
        });

        bus.publish(&died(3));
        assert_eq!(*log.borrow(), vec!["first:3", "second"]);
    }

    #[test]
    fn duplicate_owner_topic_is_rejected() {
        let mut bus = EventBus::new();
        assert!(bus.subscribe(SignalTopic::OfficeAssigned, "ui", |_| {}).is_some());
        assert!(bus.subscribe(SignalTopic::OfficeAssigned, "ui", |_| {}).is_none());
        assert!(bus.subscribe(SignalTopic::NewYear, "ui", |_| {}).is_some());
        assert_eq!(bus.subscriber_count(SignalTopic::OfficeAssigned), 1);
    }

    #[test]
    fn unsubscribe_by_handle() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let handle = bus
            .subscribe(SignalTopic::CharacterDied, "counter", move |_| {
                *counter.borrow_mut() += 1;
            })
            .unwrap();

        bus.publish(&died(1));
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        bus.publish(&died(2));
        assert_eq!(*count.borrow(), 1);

        // The owner may subscribe again once the old handle is gone.
        assert!(bus.subscribe(SignalTopic::CharacterDied, "counter", |_| {}).is_some());
    }
}
