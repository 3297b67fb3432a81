//! Error types for the reactive cell system.
//!
//! Two disjoint error classes flow through the system and must never be
//! conflated:
//!
//! - An *application failure* ([`CellError`]): the computation itself
//!   failed. The cell transitions to `Rejected`, caches the error, and
//!   every subsequent `value` read fails with it.
//!
//! - A *not-ready signal* ([`ReadError::NotReady`]): a dependency has not
//!   settled yet. This is control flow, not an error. It is caught inside
//!   the evaluation algorithm (the cell transitions to `Blocked` and
//!   retries on the next notification) and surfaces to callers outside an
//!   evaluation only as a tagged "not ready" result, never as a failure.
//!
//! Computations return `Result<_, ReadError>` so a dependency read can be
//! propagated with `?`; the `From<CellError>` conversion lets genuine
//! failures use the same operator.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::cell::CellState;

/// An application failure produced by a computation.
///
/// The error is reference-counted so it can be cached by a rejected cell
/// and handed out to every reader without requiring the underlying error
/// type to be `Clone`.
#[derive(Clone)]
pub struct CellError(Arc<dyn StdError + Send + Sync + 'static>);

impl CellError {
    /// Wrap any error type.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Build an error from a plain message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(Arc::new(Message(msg.into())))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl StdError for CellError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// A message-only error payload.
#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

/// Why a `value` read did not produce a value.
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    /// The cell has not settled. Carries the state observed after the
    /// read triggered evaluation, so callers can distinguish a deferred
    /// computation in flight (`Pending`) from a cell waiting on an
    /// unready dependency (`Blocked`).
    #[error("cell is not ready (state {0:?})")]
    NotReady(CellState),

    /// The cell's computation failed; the error is the cached rejection.
    #[error(transparent)]
    Failed(#[from] CellError),
}

impl ReadError {
    /// True for the not-ready signal, false for a genuine failure.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ReadError::NotReady(_))
    }
}

/// Why an update future settled without a value.
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    /// The operation ran and failed.
    #[error("update failed: {0}")]
    Failed(CellError),

    /// The operation was superseded, or its cell was pruned, before it
    /// could settle.
    #[error("update cancelled before settlement")]
    Cancelled,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
