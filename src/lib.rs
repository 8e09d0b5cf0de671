//! A pull-based, demand-driven reactive core.
//!
//! The crate provides three cooperating pieces:
//!
//! - [`Demand`], a saturating counter of "how many more items the consumer is
//!   willing to accept", either bounded or unbounded;
//! - [`PausableSubscriber`], a subscriber that pulls exactly one item at a
//!   time, decides per item whether to keep going, and exposes
//!   [`resume`](Pausable::resume) to re-enter the flow after pausing itself;
//! - [`Interval`], a timer-driven source that emits one tick timestamp per
//!   period, never runs ahead of outstanding demand, and finishes once a
//!   configured maximum emission count is exhausted.
//!
//! The producer/consumer contract is a small closed set of traits
//! ([`Publisher`], [`Subscriber`], [`Subscription`], [`Cancellable`],
//! [`Pausable`]); [`from_iter`] supplies a finite pull source for feeding a
//! subscriber from an in-memory sequence.
//!
//! # Examples
//!
//! ```
//! use pullflow::{from_iter, Pausable, PublisherExt};
//!
//! let handle = from_iter([1, 2, 3, 4, 5, 6]).pausable_sink(
//!     |completion| println!("done: {completion:?}"),
//!     |value| {
//!         println!("{value}");
//!         value % 2 == 0
//!     },
//! );
//!
//! // The sink pauses itself after every odd value; un-stick it from outside.
//! while handle.is_paused() {
//!     handle.resume();
//! }
//! ```

pub use crate::{
    core::{Cancellable, Completion, Pausable, Publisher, Subscriber, Subscription},
    demand::Demand,
    from_iter::{from_iter, FromIter},
    interval::{interval, Interval, IntervalConfig},
    pausable::{PausableSubscriber, PublisherExt},
};

mod core;
mod demand;
mod from_iter;
mod interval;
mod pausable;
mod utils;
