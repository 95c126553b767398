use std::{
    any::Any,
    cell::{Cell, RefCell},
    mem::take,
    rc::{Rc, Weak},
};

use slabmap::SlabMap;

use crate::{Changes, Registry};


/// Keeps a subscription alive. Dropping it unsubscribes.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
    pub(crate) fn from_subscriber(
        subscribers: &Rc<Subscribers>,
        key: usize,
        node: Rc<SubscriberNode>,
    ) -> Self {
        Subscription(RawSubscription::Subscriber {
            subscribers: Rc::downgrade(subscribers),
            key,
            node,
        })
    }

    /// Returns `true` until the subscription is unsubscribed.
    pub fn is_active(&self) -> bool {
        match &self.0 {
            RawSubscription::Empty => false,
            RawSubscription::Fn(_) => true,
            RawSubscription::Subscriber { node, .. } => node.active.get(),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
            RawSubscription::Subscriber {
                subscribers,
                key,
                node,
            } => {
                node.active.set(false);
                if let Some(subscribers) = subscribers.upgrade() {
                    subscribers.remove(key);
                }
                tracing::trace!(store = &*node.store_name, key, "unsubscribed");
            }
        }
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            RawSubscription::Empty => write!(f, "Subscription(<empty>)"),
            RawSubscription::Fn(_) => write!(f, "Subscription(<fn>)"),
            RawSubscription::Subscriber { node, key, .. } => {
                write!(f, "Subscription({}#{key})", node.store_name)
            }
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
    Subscriber {
        subscribers: Weak<Subscribers>,
        key: usize,
        node: Rc<SubscriberNode>,
    },
}

type Notify = Box<dyn FnMut(&dyn Any) -> bool>;

pub(crate) struct SubscriberNode {
    store: usize,
    store_name: Rc<str>,
    active: Cell<bool>,
    notify: RefCell<Notify>,
}

/// Builds the notify function of a subscription.
///
/// The returned function recomputes the projection from a new state and calls `on_change` only
/// when it differs from the last one. `initial` is the projection taken at subscribe time.
pub(crate) fn projection<S: 'static, T: PartialEq + 'static>(
    initial: T,
    selector: impl Fn(&S) -> T + 'static,
    mut on_change: impl FnMut(&T) + 'static,
) -> Notify {
    let mut last = initial;
    Box::new(move |state: &dyn Any| {
        let Some(state) = state.downcast_ref::<S>() else {
            return false;
        };
        let value = selector(state);
        if value == last {
            return false;
        }
        last = value;
        on_change(&last);
        true
    })
}

/// Live subscriptions, keyed by slab index.
pub(crate) struct Subscribers(RefCell<SlabMap<Rc<SubscriberNode>>>);

impl Subscribers {
    pub fn new() -> Self {
        Self(RefCell::new(SlabMap::new()))
    }
    pub fn insert(
        self: &Rc<Self>,
        store: usize,
        store_name: Rc<str>,
        notify: Notify,
    ) -> Subscription {
        let node = Rc::new(SubscriberNode {
            store,
            store_name,
            active: Cell::new(true),
            notify: RefCell::new(notify),
        });
        let key = self.0.borrow_mut().insert(node.clone());
        tracing::trace!(store = &*node.store_name, key, "subscribed");
        Subscription::from_subscriber(self, key, node)
    }
    fn remove(&self, key: usize) {
        self.0.borrow_mut().remove(key);
    }
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Notifies the subscribers of every changed store. Returns the number of `on_change` calls.
    ///
    /// Subscriptions added while notifying are not visited in this pass.
    /// Subscriptions removed while notifying are skipped.
    pub fn notify<A: 'static>(&self, changes: &Changes, registry: &Registry<A>) -> usize {
        if changes.is_empty() {
            return 0;
        }
        let nodes: Vec<_> = self
            .0
            .borrow()
            .values()
            .filter(|node| changes.contains_index(node.store))
            .cloned()
            .collect();
        let mut notified = 0;
        for node in nodes {
            if !node.active.get() {
                continue;
            }
            let state = registry.state_any(node.store);
            let Ok(mut notify) = node.notify.try_borrow_mut() else {
                continue;
            };
            if (*notify)(&*state) {
                notified += 1;
            }
        }
        notified
    }
}
