//! Value Cell
//!
//! A cell wraps one computation: it evaluates lazily, caches the result,
//! records which other cells read it, and propagates invalidation when it
//! resettles. The cell's state machine ties the notification bus, the
//! dependency tracker, and the update queue together.
//!
//! # How evaluation works
//!
//! 1. A `value` or `loading` access triggers maybe-evaluate, which only
//!    acts when the cell is `Uninitialized`, `Blocked`, or `Stale` and no
//!    evaluation is already in flight.
//!
//! 2. The front queue operation runs against the previous cached value,
//!    with the tracker slot held so dependency edges are captured and the
//!    core lock released so reads can re-enter other cells.
//!
//! 3. An immediate value fulfils the cell; a raised application error
//!    rejects it; a propagated not-ready signal parks it in `Blocked`
//!    with a one-shot retry subscription; a deferred value marks it
//!    `Pending` and hands the settlement continuation to the scheduler.
//!
//! 4. After any settlement the queue drains eagerly: the completed front
//!    entry is dropped and the next operation evaluates immediately,
//!    strictly in submission order, never concurrently.
//!
//! Evaluations are numbered so a deferred result that was superseded by a
//! `refresh` is discarded when it eventually arrives.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use parking_lot::{Mutex, MutexGuard};
use smallvec::SmallVec;
use tokio::sync::oneshot;
use tracing::{trace, warn};

use crate::context::Dependent;
use crate::error::{CellError, ReadError, UpdateError};
use crate::queue::{Computation, Eval, UpdateQueue};
use crate::runtime::ReactorShared;

/// Observable lifecycle of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Never evaluated.
    Uninitialized,
    /// A deferred computation is in flight and there is no prior value.
    Pending,
    /// Evaluation ran but a dependency was not ready; the cell retries
    /// on the next notification.
    Blocked,
    /// The cached value is valid and nothing newer is queued.
    Fulfilled,
    /// The cached error is valid.
    Rejected,
    /// The cached value is still observable, but a newer operation is
    /// queued and not yet applied.
    Stale,
}

/// What the evaluation loop does after a settlement.
#[derive(PartialEq)]
enum Step {
    Done,
    Continue,
}

struct CellCore<T> {
    state: CellState,
    cached: Option<T>,
    error: Option<CellError>,
    queue: UpdateQueue<T>,
    /// Set while the front operation is running or has a deferred result
    /// outstanding. At most one evaluation is in flight per cell.
    evaluating: bool,
    /// Sequence of the most recent evaluation run. A deferred settlement
    /// carrying an older sequence was superseded and is discarded.
    eval_seq: u64,
}

pub(crate) struct CellInner<T: Clone + Send + Sync + 'static> {
    key: String,
    reactor: Arc<ReactorShared>,
    weak_self: Weak<CellInner<T>>,
    core: Mutex<CellCore<T>>,
    /// Cells that read this cell's value during their own evaluation.
    /// Non-owning: a cell's lifetime does not depend on who observes it.
    dependents: Mutex<SmallVec<[Weak<dyn Dependent>; 4]>>,
}

impl<T: Clone + Send + Sync + 'static> CellInner<T> {
    pub(crate) fn create(
        key: String,
        computation: Computation<T>,
        reactor: Arc<ReactorShared>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            key,
            reactor,
            weak_self: weak.clone(),
            core: Mutex::new(CellCore {
                state: CellState::Uninitialized,
                cached: None,
                error: None,
                queue: UpdateQueue::new(computation),
                evaluating: false,
                eval_seq: 0,
            }),
            dependents: Mutex::new(SmallVec::new()),
        })
    }

    fn as_dependent(&self) -> Weak<dyn Dependent> {
        let weak: Weak<dyn Dependent> = self.weak_self.clone();
        weak
    }

    fn is_self(&self, other: &Weak<dyn Dependent>) -> bool {
        let me = self.as_dependent();
        std::ptr::addr_eq(Weak::as_ptr(&me), Weak::as_ptr(other))
    }

    pub fn state(&self) -> CellState {
        self.core.lock().state
    }

    /// Read the cached value, evaluating first if needed.
    ///
    /// Registers a dependency edge when some other cell is currently
    /// evaluating. A not-ready result carries the state observed after
    /// the evaluation attempt so callers can tell pending from blocked.
    pub fn value(&self) -> Result<T, ReadError> {
        self.maybe_evaluate();

        // Record the edge after evaluating: if this read settled the cell
        // just now, the reader already observes the fresh value and must
        // not be refreshed for it mid-evaluation.
        if let Some(current) = self.reactor.tracker.current() {
            if !self.is_self(&current) {
                self.add_dependent(current);
            }
        }

        let core = self.core.lock();
        match core.state {
            CellState::Fulfilled => Ok(core
                .cached
                .clone()
                .expect("fulfilled cell has no cached value")),
            CellState::Stale => match core.cached.clone() {
                Some(value) => Ok(value),
                // Updated before ever fulfilling; nothing observable yet.
                None => Err(ReadError::NotReady(CellState::Stale)),
            },
            CellState::Rejected => Err(ReadError::Failed(
                core.error
                    .clone()
                    .expect("rejected cell has no cached error"),
            )),
            state => Err(ReadError::NotReady(state)),
        }
    }

    /// True while the cell is waiting for a result: a deferred
    /// computation in flight, or a dependency that has not settled.
    pub fn loading(&self) -> bool {
        self.maybe_evaluate();
        matches!(
            self.core.lock().state,
            CellState::Pending | CellState::Blocked
        )
    }

    /// Submit an operation. Its effect applies after every earlier
    /// queued operation, and the returned future settles when this
    /// specific operation completes.
    pub fn update(&self, computation: Computation<T>) -> UpdateHandle<T> {
        let (done, receiver) = oneshot::channel();
        {
            let mut core = self.core.lock();
            if matches!(core.state, CellState::Fulfilled | CellState::Rejected) {
                // The settled front entry has served its purpose.
                core.queue.discard_settled_front();
            }
            core.queue.push(computation, done);
            core.state = CellState::Stale;
        }
        self.retry_on_next_change();
        self.reactor.bus.changed();
        UpdateHandle { receiver }
    }

    /// Force re-evaluation of the front operation.
    ///
    /// Discards `Blocked`/`Stale` progress but not the queue; an
    /// in-flight deferred result is abandoned and its settlement ignored.
    pub fn refresh(&self) {
        {
            let mut core = self.core.lock();
            trace!(key = %self.key, from = ?core.state, "refresh");
            core.state = CellState::Uninitialized;
            core.evaluating = false;
            core.eval_seq += 1;
        }
        self.maybe_evaluate();
    }

    /// Invoke `on_ok` or `on_err` once the cell settles; immediately if
    /// it already has. A settled cell with no cached value or error is an
    /// internal invariant violation and fails loudly.
    pub fn on_settled<S, F>(&self, on_ok: S, on_err: F)
    where
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(CellError) + Send + 'static,
    {
        let (state, cached, error) = {
            let core = self.core.lock();
            (core.state, core.cached.clone(), core.error.clone())
        };

        match state {
            CellState::Fulfilled => on_ok(cached.expect("fulfilled cell has no cached value")),
            CellState::Rejected => on_err(error.expect("rejected cell has no cached error")),
            _ => {
                let weak = self.weak_self.clone();
                self.reactor.bus.subscribe_once(move || {
                    if let Some(cell) = weak.upgrade() {
                        cell.on_settled(on_ok, on_err);
                    }
                });
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dependent_count(&self) -> usize {
        self.dependents
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// The transition algorithm. See the module docs for the shape; this
    /// loop is the eager sequential drain.
    fn maybe_evaluate(&self) {
        loop {
            let (mut computation, prev, seq) = {
                let mut core = self.core.lock();
                if core.evaluating {
                    return;
                }
                if !matches!(
                    core.state,
                    CellState::Uninitialized | CellState::Blocked | CellState::Stale
                ) {
                    return;
                }
                let Some(computation) = core.queue.front_mut().compute.take() else {
                    // Checked out by an evaluation further up the stack.
                    return;
                };
                core.evaluating = true;
                core.eval_seq += 1;
                (computation, core.cached.clone(), core.eval_seq)
            };

            let outcome = {
                let _guard = self.reactor.tracker.enter(self.as_dependent());
                computation.run(prev.as_ref())
            };

            let mut core = self.core.lock();
            core.queue.front_mut().compute = Some(computation);
            if core.eval_seq != seq {
                // Refreshed while running; the state gate decides what
                // happens on the next pass.
                drop(core);
                continue;
            }

            match outcome {
                Ok(Eval::Now(value)) => {
                    if self.settle(core, Ok(value)) == Step::Continue {
                        continue;
                    }
                    return;
                }
                Ok(Eval::Later(future)) => {
                    self.begin_deferred(core, future, seq);
                    return;
                }
                Err(ReadError::NotReady(dependency_state)) => {
                    let first = core.state != CellState::Blocked;
                    trace!(
                        key = %self.key,
                        dependency_state = ?dependency_state,
                        "evaluation blocked on an unready dependency"
                    );
                    core.state = CellState::Blocked;
                    core.evaluating = false;
                    drop(core);
                    if first {
                        self.reactor.bus.changed();
                    }
                    self.retry_on_next_change();
                    return;
                }
                Err(ReadError::Failed(error)) => {
                    if self.settle(core, Err(error)) == Step::Continue {
                        continue;
                    }
                    return;
                }
            }
        }
    }

    /// Apply a settlement: cache, resolve the entry's completion future,
    /// advance the queue, refresh dependents, notify the bus.
    fn settle(&self, mut core: MutexGuard<'_, CellCore<T>>, outcome: Result<T, CellError>) -> Step {
        core.evaluating = false;

        match outcome {
            Ok(value) => {
                trace!(key = %self.key, "fulfilled");
                core.cached = Some(value.clone());
                core.error = None;
                core.state = CellState::Fulfilled;
                if let Some(done) = core.queue.take_front_done() {
                    let _ = done.send(Ok(value));
                }
            }
            Err(error) => {
                trace!(key = %self.key, %error, "rejected");
                core.error = Some(error.clone());
                core.state = CellState::Rejected;
                if let Some(done) = core.queue.take_front_done() {
                    let _ = done.send(Err(UpdateError::Failed(error)));
                }
            }
        }

        let more = core.queue.len() > 1;
        if more {
            // The settled entry is fully processed; the next operation
            // becomes active and the cached value turns stale.
            core.queue.advance();
            core.state = CellState::Stale;
        }
        drop(core);

        self.refresh_dependents();
        self.reactor.bus.changed();

        if more {
            Step::Continue
        } else {
            Step::Done
        }
    }

    /// Hand a deferred result to the scheduler. The in-flight flag stays
    /// set until the future settles, keeping the queue at one evaluation.
    fn begin_deferred(
        &self,
        mut core: MutexGuard<'_, CellCore<T>>,
        future: BoxFuture<'static, Result<T, CellError>>,
        seq: u64,
    ) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(key = %self.key, "deferred computation with no async runtime; rejecting");
                let error = CellError::msg("deferred computation requires a tokio runtime");
                if self.settle(core, Err(error)) == Step::Continue {
                    self.maybe_evaluate();
                }
                return;
            }
        };

        let entered_pending = core.state == CellState::Uninitialized;
        if entered_pending {
            core.state = CellState::Pending;
        }
        drop(core);

        if entered_pending {
            self.reactor.bus.changed();
        }

        let weak = self.weak_self.clone();
        handle.spawn(async move {
            let result = future.await;
            if let Some(cell) = weak.upgrade() {
                cell.settle_deferred(seq, result);
            }
        });
    }

    /// Settlement continuation for a deferred result.
    fn settle_deferred(&self, seq: u64, result: Result<T, CellError>) {
        let core = self.core.lock();
        if !core.evaluating || core.eval_seq != seq {
            // Superseded by a refresh; a newer evaluation owns the front
            // entry now.
            trace!(key = %self.key, "discarding superseded deferred settlement");
            return;
        }
        if self.settle(core, result) == Step::Continue {
            self.maybe_evaluate();
        }
    }

    /// Record an edge from this cell to the evaluating one. Idempotent.
    fn add_dependent(&self, who: Weak<dyn Dependent>) {
        let mut dependents = self.dependents.lock();
        dependents.retain(|existing| existing.strong_count() > 0);
        let known = dependents
            .iter()
            .any(|existing| std::ptr::addr_eq(Weak::as_ptr(existing), Weak::as_ptr(&who)));
        if !known {
            dependents.push(who);
        }
    }

    /// Re-run every cell that read this one during its own evaluation.
    fn refresh_dependents(&self) {
        let snapshot: SmallVec<[Weak<dyn Dependent>; 4]> = {
            let mut dependents = self.dependents.lock();
            dependents.retain(|existing| existing.strong_count() > 0);
            dependents.clone()
        };

        for dependent in snapshot {
            if let Some(dependent) = dependent.upgrade() {
                dependent.dependency_changed();
            }
        }
    }

    fn retry_on_next_change(&self) {
        let weak = self.weak_self.clone();
        self.reactor.bus.subscribe_once(move || {
            if let Some(cell) = weak.upgrade() {
                cell.maybe_evaluate();
            }
        });
    }
}

impl<T: Clone + Send + Sync + 'static> Dependent for CellInner<T> {
    fn dependency_changed(&self) {
        self.refresh();
    }
}

/// Handle to a reactive cell. Cheap to clone; clones share state.
pub struct Cell<T: Clone + Send + Sync + 'static> {
    inner: Arc<CellInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Cell<T> {
    pub(crate) fn from_inner(inner: Arc<CellInner<T>>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner_any(&self) -> Arc<dyn std::any::Any + Send + Sync> {
        self.inner.clone()
    }

    /// Stable identity assigned by the resolver.
    pub fn key(&self) -> &str {
        self.inner.key()
    }

    /// Current state, without triggering evaluation.
    pub fn state(&self) -> CellState {
        self.inner.state()
    }

    /// Read the value. May trigger evaluation and may register a
    /// dependency edge; see [`ReadError`] for the non-value outcomes.
    pub fn value(&self) -> Result<T, ReadError> {
        self.inner.value()
    }

    /// True while a result is still being produced.
    pub fn loading(&self) -> bool {
        self.inner.loading()
    }

    /// Queue an operation; the returned future settles when it applies.
    pub fn update(&self, computation: Computation<T>) -> UpdateHandle<T> {
        self.inner.update(computation)
    }

    /// Queue a literal value.
    pub fn set(&self, value: T) -> UpdateHandle<T> {
        self.update(Computation::literal(value))
    }

    /// Force the front operation to re-run.
    pub fn refresh(&self) {
        self.inner.refresh()
    }

    /// Run a callback once the cell settles (immediately if it has).
    pub fn on_settled<S, F>(&self, on_ok: S, on_err: F)
    where
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(CellError) + Send + 'static,
    {
        self.inner.on_settled(on_ok, on_err)
    }

    /// Number of live cells that depend on this one.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependent_count()
    }

    /// True when both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Cell<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("key", &self.key())
            .field("state", &self.state())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

/// Future returned by [`Cell::update`]; settles when that specific
/// operation completes, or with [`UpdateError::Cancelled`] if the
/// operation is discarded before it can.
pub struct UpdateHandle<T> {
    receiver: oneshot::Receiver<Result<T, UpdateError>>,
}

impl<T> Future for UpdateHandle<T> {
    type Output = Result<T, UpdateError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_closed)) => Poll::Ready(Err(UpdateError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Reactor;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn literal_cell_fulfils_on_first_read() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal("Hello".to_string()));

        assert_eq!(cell.state(), CellState::Uninitialized);
        assert_eq!(cell.value().expect("literal settles"), "Hello");
        assert_eq!(cell.state(), CellState::Fulfilled);
        assert!(!cell.loading());
    }

    #[test]
    fn computation_runs_lazily_and_at_most_once_while_settled() {
        let reactor = Reactor::new();
        let runs = Arc::new(AtomicI32::new(0));
        let runs_clone = runs.clone();

        let cell = reactor.cell(Computation::sync(move |_| {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Ok(21 * 2)
        }));

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(cell.value().expect("settles"), 42);
        assert_eq!(cell.value().expect("settles"), 42);
        assert_eq!(cell.value().expect("settles"), 42);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_computation_rejects_and_propagates_to_readers() {
        let reactor = Reactor::new();
        let cell: Cell<i32> = reactor.cell(Computation::sync(|_| {
            Err(CellError::msg("bad input"))?
        }));

        match cell.value() {
            Err(ReadError::Failed(error)) => assert_eq!(error.to_string(), "bad input"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(cell.state(), CellState::Rejected);

        // The error is cached; readers keep failing with it.
        assert!(matches!(cell.value(), Err(ReadError::Failed(_))));
    }

    #[test]
    fn sync_function_sees_previous_cached_value() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal(1));
        assert_eq!(cell.value().expect("settles"), 1);

        let _handle = cell.update(Computation::sync(|prev: Option<&i32>| {
            Ok(prev.copied().unwrap_or(0) + 10)
        }));
        assert_eq!(cell.value().expect("settles"), 11);
    }

    #[test]
    fn refresh_reruns_the_front_operation() {
        let reactor = Reactor::new();
        let source = Arc::new(AtomicI32::new(1));
        let source_clone = source.clone();

        let cell = reactor.cell(Computation::sync(move |_| {
            Ok(source_clone.load(Ordering::SeqCst))
        }));

        assert_eq!(cell.value().expect("settles"), 1);

        source.store(2, Ordering::SeqCst);
        assert_eq!(cell.value().expect("settles"), 1, "cached until refreshed");

        cell.refresh();
        assert_eq!(cell.value().expect("settles"), 2);
    }

    #[test]
    fn update_on_fulfilled_cell_applies_synchronously_for_literals() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal("Hello".to_string()));
        assert_eq!(cell.value().expect("settles"), "Hello");

        let _handle = cell.set("Hello World".to_string());
        assert_eq!(cell.state(), CellState::Fulfilled);
        assert_eq!(cell.value().expect("settles"), "Hello World");
    }

    #[test]
    fn update_emits_one_notification_per_state_change() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal("Hello".to_string()));
        assert_eq!(cell.value().expect("settles"), "Hello");

        let notifications = Arc::new(AtomicI32::new(0));
        let notifications_clone = notifications.clone();
        let _sub = reactor.bus().subscribe(move || {
            notifications_clone.fetch_add(1, Ordering::SeqCst);
        });

        let _handle = cell.set("Hello World".to_string());

        // Fulfilled -> Stale, then Stale -> Fulfilled.
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
        assert_eq!(cell.value().expect("settles"), "Hello World");
    }

    #[test]
    fn update_failure_clears_on_subsequent_update() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal(1));
        assert_eq!(cell.value().expect("settles"), 1);

        let _failed = cell.update(Computation::sync(|_: Option<&i32>| {
            Err(CellError::msg("update exploded"))?
        }));
        assert_eq!(cell.state(), CellState::Rejected);

        let _recovered = cell.set(5);
        assert_eq!(cell.value().expect("settles"), 5);
        assert_eq!(cell.state(), CellState::Fulfilled);
    }

    #[test]
    fn on_settled_fires_immediately_when_fulfilled() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal(7));
        assert_eq!(cell.value().expect("settles"), 7);

        let seen = Arc::new(AtomicI32::new(0));
        let seen_clone = seen.clone();
        cell.on_settled(
            move |value| {
                seen_clone.store(value, Ordering::SeqCst);
            },
            |_| panic!("cell is fulfilled"),
        );
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn on_settled_waits_for_settlement() {
        let reactor = Reactor::new();
        let gate = Arc::new(AtomicI32::new(0));

        let cell = {
            let gate = gate.clone();
            reactor.cell(Computation::sync(move |_: Option<&i32>| {
                if gate.load(Ordering::SeqCst) == 0 {
                    // Not-ready propagated from a conceptual dependency.
                    Err(ReadError::NotReady(CellState::Pending))
                } else {
                    Ok(99)
                }
            }))
        };

        assert!(cell.value().is_err());
        assert_eq!(cell.state(), CellState::Blocked);

        let seen = Arc::new(AtomicI32::new(0));
        let seen_clone = seen.clone();
        cell.on_settled(
            move |value| {
                seen_clone.store(value, Ordering::SeqCst);
            },
            |_| panic!("should fulfil"),
        );
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        // Dependency becomes ready; the next notification retries both
        // the blocked cell and the waiting callback.
        gate.store(1, Ordering::SeqCst);
        reactor.bus().changed();

        assert_eq!(cell.state(), CellState::Fulfilled);
        assert_eq!(seen.load(Ordering::SeqCst), 99);
    }

    #[test]
    fn blocked_cell_notifies_once_and_retries_on_wake() {
        let reactor = Reactor::new();
        let gate = Arc::new(AtomicI32::new(0));

        let cell = {
            let gate = gate.clone();
            reactor.cell(Computation::sync(move |_: Option<&i32>| {
                if gate.load(Ordering::SeqCst) == 0 {
                    Err(ReadError::NotReady(CellState::Pending))
                } else {
                    Ok(1)
                }
            }))
        };

        let notifications = Arc::new(AtomicI32::new(0));
        let notifications_clone = notifications.clone();
        let _sub = reactor.bus().subscribe(move || {
            notifications_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            cell.value(),
            Err(ReadError::NotReady(CellState::Blocked))
        ));
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        // Still blocked: re-reading must not re-notify.
        assert!(cell.value().is_err());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
        assert!(cell.loading());

        gate.store(1, Ordering::SeqCst);
        reactor.bus().changed();
        assert_eq!(cell.value().expect("settles after wake"), 1);
        assert_eq!(cell.state(), CellState::Fulfilled);
    }

    #[test]
    fn clone_shares_state() {
        let reactor = Reactor::new();
        let cell = reactor.cell(Computation::literal(3));
        let clone = cell.clone();

        assert!(cell.ptr_eq(&clone));
        assert_eq!(cell.value().expect("settles"), 3);
        assert_eq!(clone.state(), CellState::Fulfilled);
    }
}
