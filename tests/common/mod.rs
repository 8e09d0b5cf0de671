// Each integration test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use crossbeam_queue::SegQueue;
use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc, RwLock,
};

use pullflow::{Cancellable, Completion, Demand, Subscriber, Subscription};

/// Pops everything currently queued, in order.
pub fn drain<T>(queue: &SegQueue<T>) -> Vec<T> {
    let mut items = vec![];
    while let Some(item) = queue.pop() {
        items.push(item);
    }
    items
}

/// Records every delivery and drives demand from a per-value closure.
pub struct TestSubscriber<T, E> {
    initial_demand: Demand,
    on_next_demand: Box<dyn Fn(&T) -> Demand + Send + Sync>,
    pub values: SegQueue<T>,
    pub completions: SegQueue<Completion<E>>,
    subscription: RwLock<Option<Arc<dyn Subscription>>>,
}

impl<T, E> TestSubscriber<T, E> {
    pub fn new(
        initial_demand: Demand,
        on_next_demand: impl Fn(&T) -> Demand + Send + Sync + 'static,
    ) -> Self {
        TestSubscriber {
            initial_demand,
            on_next_demand: Box::new(on_next_demand),
            values: SegQueue::new(),
            completions: SegQueue::new(),
            subscription: RwLock::new(None),
        }
    }

    pub fn drain_values(&self) -> Vec<T> {
        drain(&self.values)
    }

    /// Requests more demand through the stored subscription, if any.
    pub fn request(&self, demand: Demand) {
        let subscription = {
            let slot = &*self.subscription.read().unwrap();
            slot.clone()
        };
        if let Some(subscription) = subscription {
            subscription.request(demand);
        }
    }

    /// Cancels and releases the stored subscription, if any.
    pub fn cancel(&self) {
        if let Some(subscription) = self.take_subscription() {
            subscription.cancel();
        }
    }

    pub fn take_subscription(&self) -> Option<Arc<dyn Subscription>> {
        let slot = &mut *self.subscription.write().unwrap();
        slot.take()
    }
}

impl<T, E> Subscriber for TestSubscriber<T, E>
where
    T: Send,
    E: Send,
{
    type Input = T;
    type Failure = E;

    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        {
            let slot = &mut *self.subscription.write().unwrap();
            *slot = Some(Arc::clone(&subscription));
        }
        if self.initial_demand.is_positive() {
            subscription.request(self.initial_demand);
        }
    }

    fn on_next(&self, input: T) -> Demand {
        let demand = (self.on_next_demand)(&input);
        self.values.push(input);
        demand
    }

    fn on_complete(&self, completion: Completion<E>) {
        self.completions.push(completion);
        // Release the subscription so that producer-side resources
        // (e.g. a nursery handle) are dropped with it.
        let slot = &mut *self.subscription.write().unwrap();
        *slot = None;
    }
}

/// Counts requests and cancellations without producing anything.
pub struct MockSubscription {
    pub requests: SegQueue<Demand>,
    pub cancels: AtomicUsize,
}

impl MockSubscription {
    pub fn new() -> Self {
        MockSubscription {
            requests: SegQueue::new(),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(AtomicOrdering::Acquire)
    }
}

impl Subscription for MockSubscription {
    fn request(&self, demand: Demand) {
        self.requests.push(demand);
    }
}

impl Cancellable for MockSubscription {
    fn cancel(&self) {
        self.cancels.fetch_add(1, AtomicOrdering::AcqRel);
    }
}
