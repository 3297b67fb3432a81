//! Glint Core
//!
//! This crate provides the reactive async-value primitive at the heart of
//! the Glint render-pass framework: a *cell* that wraps a computation,
//! evaluates it lazily, caches its result, tracks which other cells
//! depend on it, and propagates invalidation when it changes.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`Cell`] holds one computation (a literal value, a function of the
//! previous cached value, or a function producing a deferred value) and
//! a small state machine around it: `Uninitialized`, `Pending`,
//! `Blocked`, `Fulfilled`, `Rejected`, and `Stale`. Reading `value`
//! triggers evaluation on demand; reading it *during another cell's
//! evaluation* additionally records a dependency edge, so the reader is
//! re-run whenever this cell resettles.
//!
//! ## Updates
//!
//! [`Cell::update`] queues an operation behind whatever is already
//! settling. Operations apply strictly in submission order, one at a
//! time, and each returns a future that resolves when that specific
//! operation completes. While newer operations are queued, the old value
//! stays observable (`Stale`, stale-while-revalidating).
//!
//! ## Identity
//!
//! Cells get stable keys from the scope path and call ordinal (or an
//! explicit override), so the same call site yields the same cell across
//! render generations. A [`Reactor`] owns the pools, the notification
//! bus, and the dependency tracker; a thread-local default reactor backs
//! the free functions.
//!
//! # Example
//!
//! ```rust,ignore
//! use glint_core::{cell, Computation};
//!
//! let data = cell(Computation::deferred(|_| async {
//!     Ok(fetch_schedule().await?)
//! }));
//!
//! let message = {
//!     let data = data.clone();
//!     cell(Computation::sync(move |_| {
//!         let schedule = data.value()?;
//!         Ok(if schedule.day_of_week == 0 { "closed" } else { "open" })
//!     }))
//! };
//!
//! // While `data` is in flight, `message.loading()` is true; once it
//! // settles, `message.value()` yields the derived string.
//! ```

mod bus;
mod cell;
mod context;
mod error;
mod queue;
mod runtime;
mod scope;

pub use bus::{Bus, Subscription, SubscriptionId};
pub use cell::{Cell, CellState, UpdateHandle};
pub use error::{CellError, ReadError, UpdateError};
pub use queue::{Computation, Eval};
pub use runtime::{
    begin_generation, cell, cell_keyed, clear_subscriptions, enter_scope, subscribe, with_default,
    Reactor,
};
