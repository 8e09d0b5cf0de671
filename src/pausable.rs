use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc, RwLock,
};

use crate::{
    core::{Cancellable, Completion, Pausable, Publisher, Subscriber, Subscription},
    demand::Demand,
    utils::tracing::{instrument, trace},
};

/// A subscriber that requests exactly one item at a time and decides per item
/// whether to continue.
///
/// The decision closure returns `true` to keep the flow going and `false` to
/// pause it; a paused subscriber requests nothing further until
/// [`resume`](Pausable::resume) is called. Pausing never cancels the upstream
/// subscription, so the flow can always be re-entered later.
///
/// # Examples
///
/// ```
/// use pullflow::{from_iter, Pausable, PublisherExt};
///
/// let handle = from_iter(["a", "b", "c"]).pausable_sink(
///     |completion| println!("done: {completion:?}"),
///     |value| {
///         println!("{value}");
///         value != "b"
///     },
/// );
///
/// assert!(handle.is_paused());
/// handle.resume();
/// assert!(!handle.is_paused());
/// ```
pub struct PausableSubscriber<T, E> {
    receive_value: Box<dyn Fn(T) -> bool + Send + Sync>,
    receive_completion: Box<dyn Fn(Completion<E>) + Send + Sync>,
    paused: AtomicBool,
    subscription: RwLock<Option<Arc<dyn Subscription>>>,
}

impl<T, E> PausableSubscriber<T, E> {
    pub fn new(
        receive_completion: impl Fn(Completion<E>) + Send + Sync + 'static,
        receive_value: impl Fn(T) -> bool + Send + Sync + 'static,
    ) -> Self {
        PausableSubscriber {
            receive_value: Box::new(receive_value),
            receive_completion: Box::new(receive_completion),
            paused: AtomicBool::new(false),
            subscription: RwLock::new(None),
        }
    }
}

impl<T, E> Subscriber for PausableSubscriber<T, E> {
    type Input = T;
    type Failure = E;

    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        {
            let slot = &mut *self.subscription.write().unwrap();
            *slot = Some(Arc::clone(&subscription));
        }
        // The write guard is released before requesting: the producer may
        // deliver synchronously from within `request`.
        subscription.request(Demand::ONE);
    }

    fn on_next(&self, input: T) -> Demand {
        let keep_going = (self.receive_value)(input);
        self.paused.store(!keep_going, AtomicOrdering::Release);
        if keep_going {
            Demand::ONE
        } else {
            trace!("stop decision: pausing until resumed");
            Demand::NONE
        }
    }

    fn on_complete(&self, completion: Completion<E>) {
        (self.receive_completion)(completion);
        let slot = &mut *self.subscription.write().unwrap();
        *slot = None;
    }
}

impl<T, E> Pausable for PausableSubscriber<T, E> {
    fn is_paused(&self) -> bool {
        self.paused.load(AtomicOrdering::Acquire)
    }

    fn resume(&self) {
        if !self.paused.swap(false, AtomicOrdering::AcqRel) {
            return;
        }
        instrument!("resume");
        let subscription = {
            let slot = &*self.subscription.read().unwrap();
            slot.clone()
        };
        if let Some(subscription) = subscription {
            subscription.request(Demand::ONE);
        }
    }
}

impl<T, E> Cancellable for PausableSubscriber<T, E> {
    fn cancel(&self) {
        let subscription = {
            let slot = &mut *self.subscription.write().unwrap();
            slot.take()
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }
}

/// Subscribe-and-receive extension for every [`Publisher`].
pub trait PublisherExt: Publisher {
    /// Subscribes a [`PausableSubscriber`] built from the two closures and
    /// returns it, giving the caller a handle that is both [`Pausable`] and
    /// [`Cancellable`].
    fn pausable_sink<C, F>(
        &self,
        receive_completion: C,
        receive_value: F,
    ) -> Arc<PausableSubscriber<Self::Output, Self::Failure>>
    where
        C: Fn(Completion<Self::Failure>) + Send + Sync + 'static,
        F: Fn(Self::Output) -> bool + Send + Sync + 'static,
        Self::Output: 'static,
        Self::Failure: 'static,
    {
        let subscriber = Arc::new(PausableSubscriber::new(receive_completion, receive_value));
        self.subscribe(Arc::clone(&subscriber));
        subscriber
    }
}

impl<P> PublisherExt for P where P: Publisher {}
