//! Update Queue
//!
//! Each cell owns an ordered list of pending operations: the initial
//! computation plus any updates submitted while earlier ones were still
//! settling. The queue guarantees at-most-one in-flight evaluation per
//! cell and strict in-order application: the front entry is the active
//! operation, and the queue only advances past it once its settlement has
//! been fully processed.
//!
//! Invariant: the queue is never empty while the cell exists. The last
//! settled entry stays at the front so `refresh` can re-run it.

use std::collections::VecDeque;
use std::future::Future;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::{CellError, ReadError, UpdateError};

/// What one run of a computation produced.
pub enum Eval<T> {
    /// The value is available immediately.
    Now(T),
    /// The value arrives later; the future re-enters the cell's
    /// settlement logic when it completes.
    Later(BoxFuture<'static, Result<T, CellError>>),
}

type ComputeFn<T> = Box<dyn FnMut(Option<&T>) -> Result<Eval<T>, ReadError> + Send>;

/// One operation a cell can evaluate: a literal value, or a function of
/// the previous cached value.
///
/// Functions may read other cells (registering dependency edges and
/// propagating their not-ready signal with `?`) and may defer their
/// result by returning [`Eval::Later`].
pub enum Computation<T> {
    Literal(T),
    Func(ComputeFn<T>),
}

impl<T: Clone + Send + 'static> Computation<T> {
    /// A computation that is just a value.
    pub fn literal(value: T) -> Self {
        Computation::Literal(value)
    }

    /// The fully general form: a function of the previous cached value
    /// that decides per run whether its result is immediate or deferred.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(Option<&T>) -> Result<Eval<T>, ReadError> + Send + 'static,
    {
        Computation::Func(Box::new(f))
    }

    /// A synchronous function of the previous cached value.
    pub fn sync<F>(mut f: F) -> Self
    where
        F: FnMut(Option<&T>) -> Result<T, ReadError> + Send + 'static,
    {
        Self::new(move |prev| f(prev).map(Eval::Now))
    }

    /// A function whose result is a deferred value.
    pub fn deferred<F, Fut>(mut f: F) -> Self
    where
        F: FnMut(Option<&T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CellError>> + Send + 'static,
    {
        Self::new(move |prev| Ok(Eval::Later(Box::pin(f(prev)))))
    }

    /// Run the computation against the previous cached value.
    pub(crate) fn run(&mut self, prev: Option<&T>) -> Result<Eval<T>, ReadError> {
        match self {
            Computation::Literal(value) => Ok(Eval::Now(value.clone())),
            Computation::Func(f) => f(prev),
        }
    }
}

/// Completion side of the future returned by `update`.
pub(crate) type DoneSender<T> = oneshot::Sender<Result<T, UpdateError>>;

/// One entry in a cell's queue.
///
/// The computation is checked out (`Option::take`) for the duration of a
/// run so it can execute without the cell's core lock held; the in-flight
/// flag on the cell guarantees only one checkout at a time.
pub(crate) struct QueueEntry<T> {
    pub compute: Option<Computation<T>>,
    /// Present for externally submitted updates; consumed at settlement.
    /// Dropping an entry with an unconsumed sender cancels its future.
    pub done: Option<DoneSender<T>>,
}

/// Per-cell FIFO of pending operations.
pub(crate) struct UpdateQueue<T> {
    entries: VecDeque<QueueEntry<T>>,
}

impl<T> UpdateQueue<T> {
    /// A queue holding the cell's initial computation.
    pub fn new(initial: Computation<T>) -> Self {
        let mut entries = VecDeque::with_capacity(1);
        entries.push_back(QueueEntry {
            compute: Some(initial),
            done: None,
        });
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The active operation.
    pub fn front_mut(&mut self) -> &mut QueueEntry<T> {
        self.entries.front_mut().expect("cell queue never empty")
    }

    /// Take the front entry's completion sender, if it still has one.
    pub fn take_front_done(&mut self) -> Option<DoneSender<T>> {
        self.front_mut().done.take()
    }

    /// Append an externally submitted operation.
    pub fn push(&mut self, computation: Computation<T>, done: DoneSender<T>) {
        self.entries.push_back(QueueEntry {
            compute: Some(computation),
            done: Some(done),
        });
    }

    /// Drop the completed front entry. Only legal while newer entries
    /// remain, so the never-empty invariant holds.
    pub fn advance(&mut self) {
        debug_assert!(self.entries.len() > 1, "advance would empty the queue");
        self.entries.pop_front();
    }

    /// Drop a settled front entry ahead of a push that immediately
    /// replaces it. The caller must push before releasing the cell.
    pub fn discard_settled_front(&mut self) {
        debug_assert_eq!(self.entries.len(), 1, "front is settled only when alone");
        self.entries.pop_front();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_runs_to_its_value() {
        let mut computation = Computation::literal(7);
        match computation.run(None) {
            Ok(Eval::Now(v)) => assert_eq!(v, 7),
            _ => panic!("literal should produce an immediate value"),
        }
    }

    #[test]
    fn sync_function_sees_previous_value() {
        let mut computation = Computation::sync(|prev: Option<&i32>| {
            Ok(prev.copied().unwrap_or(0) + 1)
        });

        match computation.run(Some(&41)) {
            Ok(Eval::Now(v)) => assert_eq!(v, 42),
            _ => panic!("sync should produce an immediate value"),
        }
    }

    #[test]
    fn deferred_function_produces_a_future() {
        let mut computation = Computation::deferred(|_prev: Option<&i32>| async { Ok(9) });
        assert!(matches!(computation.run(None), Ok(Eval::Later(_))));
    }

    #[test]
    fn queue_starts_with_one_entry_and_keeps_order() {
        let (tx1, _rx1) = oneshot::channel();
        let (tx2, _rx2) = oneshot::channel();

        let mut queue = UpdateQueue::new(Computation::literal(0));
        assert_eq!(queue.len(), 1);

        queue.push(Computation::literal(1), tx1);
        queue.push(Computation::literal(2), tx2);
        assert_eq!(queue.len(), 3);

        // Draining advances strictly front-to-back.
        let mut front = queue.front_mut().compute.take().expect("front present");
        assert!(matches!(front.run(None), Ok(Eval::Now(0))));
        queue.front_mut().compute = Some(front);
        queue.advance();

        let mut front = queue.front_mut().compute.take().expect("front present");
        assert!(matches!(front.run(None), Ok(Eval::Now(1))));
    }

    #[test]
    fn dropping_an_entry_cancels_its_completion() {
        let (tx, mut rx) = oneshot::channel::<Result<i32, UpdateError>>();

        let mut queue = UpdateQueue::new(Computation::literal(0));
        queue.push(Computation::literal(1), tx);
        drop(queue);

        // Receiver observes closure, which the cell maps to Cancelled.
        assert!(rx.try_recv().is_err());
    }
}
