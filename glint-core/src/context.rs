//! Dependency Tracker
//!
//! A single "currently evaluating" slot enables automatic dependency
//! capture: when cell A's value is read while cell B is evaluating, A
//! records B as a dependent without B having to announce itself.
//!
//! Entering an evaluation is a scoped acquisition. The previous occupant
//! is saved and restored when the guard drops, on every exit path,
//! including a failed or not-ready evaluation. Nested evaluations (a cell
//! reading a cell that must itself evaluate) therefore behave like a
//! stack without one being stored anywhere.

use std::sync::Weak;

use parking_lot::Mutex;

/// Type-erased view of a cell as a participant in the dependency graph.
///
/// The tracker and the dependent edge lists hold cells through this trait
/// so cells of different value types can depend on each other.
pub(crate) trait Dependent: Send + Sync {
    /// A value this cell read during evaluation has resettled; re-run.
    fn dependency_changed(&self);
}

/// The "currently evaluating" slot.
pub(crate) struct Tracker {
    current: Mutex<Option<Weak<dyn Dependent>>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Occupy the slot for the duration of the returned guard.
    pub fn enter(&self, who: Weak<dyn Dependent>) -> TrackerGuard<'_> {
        let previous = self.current.lock().replace(who);
        TrackerGuard {
            tracker: self,
            previous,
        }
    }

    /// The cell currently evaluating, if any.
    pub fn current(&self) -> Option<Weak<dyn Dependent>> {
        self.current.lock().clone()
    }
}

/// Guard that restores the previous slot occupant when dropped.
pub(crate) struct TrackerGuard<'a> {
    tracker: &'a Tracker,
    previous: Option<Weak<dyn Dependent>>,
}

impl Drop for TrackerGuard<'_> {
    fn drop(&mut self) {
        *self.tracker.current.lock() = self.previous.take();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
