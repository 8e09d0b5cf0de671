use arc_swap::ArcSwapOption;
use never::Never;
use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc, Mutex,
};

use crate::{
    core::{Cancellable, Completion, Publisher, Subscriber, Subscription},
    demand::Demand,
    utils::tracing::{instrument, trace},
};

/// Converts an [iterable][`IntoIterator`] into a finite pull publisher.
///
/// Items are produced synchronously inside [`Subscription::request`], one per
/// unit of demand; nothing is produced while outstanding demand is zero. The
/// source cannot fail: once the iterator is exhausted it delivers
/// [`Completion::Finished`].
///
/// # Examples
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// use pullflow::{from_iter, PublisherExt};
///
/// let actual = Arc::new(SegQueue::new());
///
/// from_iter([10, 20, 30, 40]).pausable_sink(|_| {}, {
///     let actual = Arc::clone(&actual);
///     move |x| {
///         actual.push(x);
///         true
///     }
/// });
///
/// assert_eq!(
///     &{
///         let mut v = vec![];
///         while let Some(x) = actual.pop() {
///             v.push(x);
///         }
///         v
///     }[..],
///     [10, 20, 30, 40]
/// );
/// ```
pub fn from_iter<I>(iter: I) -> FromIter<I>
where
    I: IntoIterator + Clone,
{
    FromIter { iter }
}

/// Finite pull publisher over a cloneable [iterable][`IntoIterator`]. See
/// [`from_iter`].
pub struct FromIter<I> {
    iter: I,
}

impl<I> Publisher for FromIter<I>
where
    I: IntoIterator + Clone,
    <I as IntoIterator>::IntoIter: Send + 'static,
{
    type Output = I::Item;
    type Failure = Never;

    fn subscribe<S>(&self, subscriber: Arc<S>)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static,
    {
        let subscription = Arc::new(IterSubscription {
            iter: Mutex::new(self.iter.clone().into_iter()),
            requested: Mutex::new(Demand::NONE),
            in_loop: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            subscriber: ArcSwapOption::from(Some(Arc::clone(&subscriber))),
        });
        subscriber.on_subscribe(subscription);
    }
}

struct IterSubscription<It, S> {
    iter: Mutex<It>,
    /// Requested-but-unfulfilled demand.
    requested: Mutex<Demand>,
    /// Guards against re-entering the drain loop when `request` is called
    /// from within `on_next`; the active loop picks the new demand up.
    in_loop: AtomicBool,
    completed: AtomicBool,
    subscriber: ArcSwapOption<S>,
}

impl<It, S> IterSubscription<It, S>
where
    It: Iterator + Send + 'static,
    S: Subscriber<Input = It::Item, Failure = Never> + 'static,
{
    fn drain(&self) {
        loop {
            if self.completed.load(AtomicOrdering::Acquire) {
                break;
            }
            {
                let requested = &mut *self.requested.lock().unwrap();
                if !requested.is_positive() {
                    break;
                }
                *requested -= Demand::ONE;
            }
            let next = {
                let iter = &mut *self.iter.lock().unwrap();
                iter.next()
            };
            let subscriber = match self.subscriber.load_full() {
                Some(subscriber) => subscriber,
                None => break,
            };
            match next {
                Some(item) => {
                    let more = subscriber.on_next(item);
                    if more.is_positive() {
                        let requested = &mut *self.requested.lock().unwrap();
                        *requested += more;
                    }
                },
                None => {
                    self.completed.store(true, AtomicOrdering::Release);
                    self.subscriber.store(None);
                    trace!("iterator exhausted");
                    subscriber.on_complete(Completion::Finished);
                    break;
                },
            }
        }
    }
}

impl<It, S> Subscription for IterSubscription<It, S>
where
    It: Iterator + Send + 'static,
    S: Subscriber<Input = It::Item, Failure = Never> + 'static,
{
    fn request(&self, demand: Demand) {
        instrument!("iter_request");
        if self.completed.load(AtomicOrdering::Acquire) {
            return;
        }
        {
            let requested = &mut *self.requested.lock().unwrap();
            *requested += demand;
            trace!("requested now {requested:?}");
        }
        if self.in_loop.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        self.drain();
        self.in_loop.store(false, AtomicOrdering::Release);
    }
}

impl<It, S> Cancellable for IterSubscription<It, S>
where
    It: Iterator + Send + 'static,
    S: Subscriber<Input = It::Item, Failure = Never> + 'static,
{
    fn cancel(&self) {
        if self.completed.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        self.subscriber.store(None);
        trace!("cancelled");
    }
}
