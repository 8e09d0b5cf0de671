use arc_swap::ArcSwapOption;
use async_nursery::{Nurse, NurseExt};
use futures_timer::Delay;
use never::Never;
use std::{
    pin::Pin,
    sync::{Arc, Mutex, Weak},
    time::{Duration, Instant},
};

use crate::{
    core::{Cancellable, Completion, Publisher, Subscriber, Subscription},
    demand::Demand,
    utils::tracing::{instrument, trace},
};

/// Configuration for an [`Interval`] source. Provided at construction; there
/// is no runtime reconfiguration.
#[derive(Clone, Copy, Debug)]
pub struct IntervalConfig {
    /// Time between consecutive ticks.
    pub period: Duration,
    /// Tolerated delivery lateness per tick. The timer substrate gives no
    /// hard scheduling guarantee; a tick landing later than this is reported
    /// through the tracing layer rather than dropped.
    pub leeway: Duration,
    /// Maximum total number of emissions; may be [`Demand::Unbounded`].
    pub times: Demand,
}

/// A source that emits the current [`Instant`] once per period.
///
/// Emission honors backpressure: a tick that fires while outstanding requested
/// demand is zero delivers nothing, and the value is not made up later. Once
/// `times` emissions have been delivered the source finishes; it can never
/// fail (`Failure = Never`). Cancellation is silent.
///
/// # Examples
///
/// ```
/// use async_nursery::Nursery;
/// use std::time::Duration;
///
/// use pullflow::{interval, Demand, IntervalConfig, PublisherExt};
///
/// let (nursery, nursery_out) = Nursery::new(async_executors::AsyncStd);
///
/// let source = interval(
///     IntervalConfig {
///         period: Duration::from_millis(100),
///         leeway: Duration::from_millis(10),
///         times: Demand::Bounded(3),
///     },
///     nursery.clone(),
/// );
///
/// source.pausable_sink(
///     |completion| println!("done: {completion:?}"),
///     |tick| {
///         println!("{tick:?}");
///         true
///     },
/// );
///
/// drop(source);
/// drop(nursery);
/// async_std::task::block_on(nursery_out);
/// ```
pub fn interval<N>(config: IntervalConfig, nursery: N) -> Interval<N>
where
    N: Nurse<()> + Clone + Send + Sync + 'static,
{
    Interval { config, nursery }
}

/// Timer-driven publisher of tick timestamps. See [`interval`].
pub struct Interval<N> {
    config: IntervalConfig,
    nursery: N,
}

impl<N> Publisher for Interval<N>
where
    N: Nurse<()> + Clone + Send + Sync + 'static,
{
    type Output = Instant;
    type Failure = Never;

    fn subscribe<S>(&self, subscriber: Arc<S>)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static,
    {
        let subscription = Arc::new_cyclic(|weak| IntervalSubscription {
            weak_self: Weak::clone(weak),
            period: self.config.period,
            leeway: self.config.leeway,
            nursery: self.nursery.clone(),
            subscriber: ArcSwapOption::from(Some(Arc::clone(&subscriber))),
            state: Mutex::new(IntervalState {
                requested: Demand::NONE,
                remaining: self.config.times,
                timer_running: false,
                cancelled: false,
            }),
        });
        subscriber.on_subscribe(subscription);
    }
}

struct IntervalState {
    /// Requested-but-unfulfilled demand.
    requested: Demand,
    /// Remaining emission budget, decremented once per delivery.
    remaining: Demand,
    timer_running: bool,
    /// Terminal marker, set by both cancellation and completion.
    cancelled: bool,
}

struct IntervalSubscription<S, N> {
    /// Handed to the timer task so that it never keeps the subscription
    /// alive; ownership flows subscriber -> subscription -> timer.
    weak_self: Weak<IntervalSubscription<S, N>>,
    period: Duration,
    leeway: Duration,
    nursery: N,
    subscriber: ArcSwapOption<S>,
    state: Mutex<IntervalState>,
}

impl<S, N> IntervalSubscription<S, N>
where
    S: Subscriber<Input = Instant, Failure = Never> + 'static,
    N: Nurse<()> + Clone + Send + Sync + 'static,
{
    fn start_timer(&self) {
        let weak = Weak::clone(&self.weak_self);
        let period = self.period;
        let leeway = self.leeway;
        self.nursery
            .nurse(async move {
                let mut delay = Delay::new(period);
                loop {
                    let due = Instant::now();
                    Pin::new(&mut delay).await;
                    let overshoot = due.elapsed().saturating_sub(period);
                    let subscription = match weak.upgrade() {
                        Some(subscription) => subscription,
                        None => break,
                    };
                    if overshoot > leeway {
                        trace!("tick landed {overshoot:?} past its leeway");
                    }
                    if !subscription.tick() {
                        break;
                    }
                    delay.reset(period);
                }
            })
            .unwrap();
    }

    /// One timer fire. Returns `false` when the timer should be torn down.
    fn tick(&self) -> bool {
        instrument!("interval_tick");
        let subscriber = match self.subscriber.load_full() {
            Some(subscriber) => subscriber,
            None => return false,
        };
        let finished = {
            let state = &mut *self.state.lock().unwrap();
            if state.cancelled {
                return false;
            }
            if !state.requested.is_positive() {
                // Backpressure: the timer keeps firing, delivery waits for
                // demand to be replenished.
                trace!("tick suppressed: no outstanding demand");
                return true;
            }
            state.requested -= Demand::ONE;
            state.remaining -= Demand::ONE;
            if state.remaining.is_none() {
                state.cancelled = true;
                true
            } else {
                false
            }
        };
        // The state lock is not held across subscriber callbacks.
        let more = subscriber.on_next(Instant::now());
        if finished {
            self.subscriber.store(None);
            subscriber.on_complete(Completion::Finished);
            return false;
        }
        if more.is_positive() {
            let state = &mut *self.state.lock().unwrap();
            state.requested += more;
        }
        true
    }
}

impl<S, N> Subscription for IntervalSubscription<S, N>
where
    S: Subscriber<Input = Instant, Failure = Never> + 'static,
    N: Nurse<()> + Clone + Send + Sync + 'static,
{
    fn request(&self, demand: Demand) {
        instrument!("interval_request");
        let subscriber = match self.subscriber.load_full() {
            Some(subscriber) => subscriber,
            None => return,
        };
        let mut complete_now = false;
        let mut start_timer = false;
        {
            let state = &mut *self.state.lock().unwrap();
            if state.cancelled {
                return;
            }
            if state.remaining.is_none() {
                // Budget exhausted before the timer ever ran.
                state.cancelled = true;
                complete_now = true;
            } else {
                state.requested += demand;
                trace!("requested now {:?}", state.requested);
                if !state.timer_running && state.requested.is_positive() {
                    state.timer_running = true;
                    start_timer = true;
                }
            }
        }
        if complete_now {
            self.subscriber.store(None);
            subscriber.on_complete(Completion::Finished);
            return;
        }
        if start_timer {
            self.start_timer();
        }
    }
}

impl<S, N> Cancellable for IntervalSubscription<S, N>
where
    S: Subscriber<Input = Instant, Failure = Never> + 'static,
    N: Nurse<()> + Clone + Send + Sync + 'static,
{
    fn cancel(&self) {
        {
            let state = &mut *self.state.lock().unwrap();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
        }
        self.subscriber.store(None);
        trace!("cancelled");
    }
}
