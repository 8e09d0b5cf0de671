use std::sync::Arc;

use crate::demand::Demand;

/// Terminal signal delivered at most once per subscription.
///
/// Sources whose failure channel is uninhabited use [`never::Never`] for `E`,
/// making [`Completion::Failed`] impossible to construct for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion<E> {
    /// The source ran out of values and will never emit again.
    Finished,
    /// The source failed; no further values follow.
    Failed(E),
}

/// Something that can be torn down exactly once.
///
/// `cancel` is idempotent: calling it again after the first call has no
/// additional effect.
pub trait Cancellable {
    fn cancel(&self);
}

/// The live link between one producer and one consumer.
///
/// The subscriber owns its subscription; the producer side keeps at most a
/// non-owning reference back (see [`Interval`](crate::Interval)).
pub trait Subscription: Cancellable + Send + Sync {
    /// Adds `demand` to the outstanding requested count. The producer may
    /// deliver values synchronously from within this call.
    fn request(&self, demand: Demand);
}

/// A consumer of values and of one terminal signal.
pub trait Subscriber: Send + Sync {
    type Input;
    type Failure;

    /// Receives the subscription created for this subscriber. This is where a
    /// pull subscriber issues its first request.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Receives one value. The returned demand is added to the subscription's
    /// outstanding requested count; return [`Demand::NONE`] to stop the flow
    /// until more demand is requested explicitly.
    fn on_next(&self, input: Self::Input) -> Demand;

    /// Receives the terminal signal. No further interaction happens afterward.
    fn on_complete(&self, completion: Completion<Self::Failure>);
}

/// A producer that can be subscribed to.
///
/// `subscribe` is generic over the concrete subscriber; publishers form a
/// small closed set of types rather than an open dynamic-dispatch surface.
pub trait Publisher {
    type Output;
    type Failure;

    fn subscribe<S>(&self, subscriber: Arc<S>)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static;
}

/// A consumer that can voluntarily halt intake and later re-enter the flow.
pub trait Pausable {
    /// Whether the consumer is currently holding off on requesting more items.
    fn is_paused(&self) -> bool;

    /// Lifts a voluntary pause and re-issues a one-item request. No-op when
    /// not paused; never revives a completed or cancelled subscriber.
    fn resume(&self);
}
