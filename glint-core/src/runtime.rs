//! Reactor
//!
//! The reactor is the explicit context object the whole system threads
//! through: the notification bus, the "currently evaluating" tracker
//! slot, and the scope/generation pool all live here instead of in true
//! globals. Independent render passes construct independent reactors and
//! never interfere; the free functions at the bottom operate on a
//! thread-local default reactor for top-level convenience.
//!
//! # Identity resolution
//!
//! Requesting a cell goes through the resolver: a key already requested
//! this generation hands back the same cell; a key that matches a cell
//! from the previous generation reuses it, carrying its state, cache,
//! queue, and dependents and ignoring the freshly supplied computation;
//! anything else constructs a new cell and registers it in the live pool.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::bus::{Bus, Subscription};
use crate::cell::{Cell, CellInner};
use crate::context::Tracker;
use crate::queue::Computation;
use crate::scope::ScopeState;

/// Shared coordination state: one per reactor, referenced by every cell
/// it creates.
pub(crate) struct ReactorShared {
    pub(crate) bus: Arc<Bus>,
    pub(crate) tracker: Tracker,
    pub(crate) scopes: Mutex<ScopeState>,
}

/// An isolated reactive context. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Reactor {
    shared: Arc<ReactorShared>,
}

impl Reactor {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ReactorShared {
                bus: Arc::new(Bus::new()),
                tracker: Tracker::new(),
                scopes: Mutex::new(ScopeState::new()),
            }),
        }
    }

    /// The notification bus external observers subscribe to.
    pub fn bus(&self) -> &Arc<Bus> {
        &self.shared.bus
    }

    /// Request a cell with a key synthesized from the current scope path
    /// and ordinal.
    pub fn cell<T>(&self, computation: Computation<T>) -> Cell<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = self.shared.scopes.lock().next_key();
        self.resolve(key, computation)
    }

    /// Request a cell with an explicit identity key, bypassing scope
    /// synthesis.
    pub fn cell_keyed<T>(&self, key: impl Into<String>, computation: Computation<T>) -> Cell<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.resolve(key.into(), computation)
    }

    fn resolve<T>(&self, key: String, computation: Computation<T>) -> Cell<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let shared = &self.shared;
        let mut scopes = shared.scopes.lock();

        // Same-generation re-request: idempotent identity.
        if let Some(existing) = scopes.live_get(&key) {
            match Arc::clone(existing).downcast::<CellInner<T>>() {
                Ok(inner) => {
                    trace!(key = %key, "cell re-requested within generation");
                    return Cell::from_inner(inner);
                }
                Err(_) => {
                    // Two call sites collided on one explicit key with
                    // different value types. The first one keeps the
                    // registration; the second gets a detached cell.
                    warn!(key = %key, "cell key requested with a different value type");
                    drop(scopes);
                    return Cell::from_inner(CellInner::create(key, computation, Arc::clone(shared)));
                }
            }
        }

        if let Some(previous) = scopes.take_previous(&key) {
            match previous.downcast::<CellInner<T>>() {
                Ok(inner) => {
                    trace!(key = %key, "reusing cell from previous generation");
                    let cell = Cell::from_inner(inner);
                    scopes.register(key, cell.inner_any());
                    return cell;
                }
                Err(_) => {
                    warn!(key = %key, "cell value type changed across generations; rebuilding");
                }
            }
        }

        drop(scopes);
        debug!(key = %key, "creating cell");
        let cell = Cell::from_inner(CellInner::create(key.clone(), computation, Arc::clone(shared)));
        shared.scopes.lock().register(key, cell.inner_any());
        cell
    }

    /// Run `body` as one generation: the live pool is snapshotted, and
    /// on exit (normal or panicking) every previous-generation cell
    /// that was not re-requested is pruned.
    pub fn begin_generation<R>(&self, body: impl FnOnce() -> R) -> R {
        self.shared.scopes.lock().begin_generation();
        let _guard = GenerationGuard {
            shared: &self.shared,
        };
        body()
    }

    /// Run `body` under a named naming segment; the per-scope ordinal is
    /// saved and restored on exit.
    pub fn enter_scope<R>(&self, name: &str, body: impl FnOnce() -> R) -> R {
        self.shared.scopes.lock().push_scope(name);
        let _guard = ScopeGuard {
            shared: &self.shared,
        };
        body()
    }

    /// Drop every bus subscription. Test/reset utility.
    pub fn clear_subscriptions(&self) {
        self.shared.bus.clear();
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}

struct GenerationGuard<'a> {
    shared: &'a ReactorShared,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        let pruned = self.shared.scopes.lock().end_generation();
        if pruned > 0 {
            debug!(pruned, "pruned cells not requested this generation");
        }
    }
}

struct ScopeGuard<'a> {
    shared: &'a ReactorShared,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.shared.scopes.lock().pop_scope();
    }
}

thread_local! {
    static DEFAULT: Reactor = Reactor::new();
}

/// Run `f` against the calling thread's default reactor.
pub fn with_default<R>(f: impl FnOnce(&Reactor) -> R) -> R {
    DEFAULT.with(|reactor| f(reactor))
}

/// Request a cell from the default reactor with a synthesized key.
pub fn cell<T>(computation: Computation<T>) -> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    with_default(|reactor| reactor.cell(computation))
}

/// Request a cell from the default reactor with an explicit key.
pub fn cell_keyed<T>(key: impl Into<String>, computation: Computation<T>) -> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    with_default(|reactor| reactor.cell_keyed(key, computation))
}

/// Run one generation on the default reactor.
pub fn begin_generation<R>(body: impl FnOnce() -> R) -> R {
    with_default(|reactor| reactor.begin_generation(body))
}

/// Run `body` under a named scope on the default reactor.
pub fn enter_scope<R>(name: &str, body: impl FnOnce() -> R) -> R {
    with_default(|reactor| reactor.enter_scope(name, body))
}

/// Observe change notifications on the default reactor.
pub fn subscribe<F>(callback: F) -> Subscription
where
    F: Fn() + Send + Sync + 'static,
{
    with_default(|reactor| reactor.bus().subscribe(callback))
}

/// Drop every subscription on the default reactor.
pub fn clear_subscriptions() {
    with_default(|reactor| reactor.clear_subscriptions());
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
