//! Change notification for store subscribers.
//!
//! Presentation code subscribes a callback and re-queries the store when it
//! fires. The store fires exactly one event per successful save or delete.

use chrono::NaiveDate;

/// What happened to a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Saved,
    Deleted,
}

/// Which record changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKey {
    BodyComposition(NaiveDate),
    Exercise(u32),
    Workout(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub key: RecordKey,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ChangeEvent)>;

/// Ordered list of subscriber callbacks
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl ChangeNotifier {
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn notify(&mut self, event: ChangeEvent) {
        tracing::debug!("Change: {:?} {:?}", event.kind, event.key);
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn saved_exercise(id: u32) -> ChangeEvent {
        ChangeEvent {
            kind: ChangeKind::Saved,
            key: RecordKey::Exercise(id),
        }
    }

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::default();

        let first = Rc::clone(&seen);
        notifier.subscribe(move |e| first.borrow_mut().push(("first", *e)));
        let second = Rc::clone(&seen);
        notifier.subscribe(move |e| second.borrow_mut().push(("second", *e)));

        notifier.notify(saved_exercise(1));

        assert_eq!(
            *seen.borrow(),
            vec![("first", saved_exercise(1)), ("second", saved_exercise(1))]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut notifier = ChangeNotifier::default();

        let counter = Rc::clone(&count);
        let id = notifier.subscribe(move |_| *counter.borrow_mut() += 1);
        notifier.notify(saved_exercise(1));

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert!(notifier.is_empty());

        notifier.notify(saved_exercise(2));
        assert_eq!(*count.borrow(), 1);
    }
}
