//! Optimistic local mutation with compensating rollback.
//!
//! The pattern is: snapshot the state, apply the change locally, await the
//! remote write, then either keep the change or restore the snapshot. The
//! restore is a full replacement, never a partial patch, so a failed write
//! leaves the state exactly as it was before the tentative apply.

use std::future::Future;

/// A tentative change to `T` that can be committed or reverted.
#[derive(Debug)]
#[must_use = "an optimistic action must be committed or reverted"]
pub struct OptimisticAction<T: Clone> {
    snapshot: T,
}

impl<T: Clone> OptimisticAction<T> {
    /// Snapshot `state`, then apply `change` to it.
    pub fn begin(state: &mut T, change: impl FnOnce(&mut T)) -> Self {
        let snapshot = state.clone();
        change(state);
        Self { snapshot }
    }

    /// Keep the applied change.
    pub fn commit(self) {}

    /// Restore the state captured by [`OptimisticAction::begin`].
    pub fn revert(self, state: &mut T) {
        *state = self.snapshot;
    }

    /// Apply `change`, await `persist`, and revert if it fails.
    ///
    /// `persist` must not borrow `state`; it is created before the change is
    /// applied and only awaited afterwards.
    ///
    /// # Errors
    ///
    /// Returns the error from `persist`, after `state` has been restored.
    pub async fn run<R, E, F>(
        state: &mut T,
        change: impl FnOnce(&mut T),
        persist: F,
    ) -> Result<R, E>
    where
        F: Future<Output = Result<R, E>>,
    {
        let action = Self::begin(state, change);
        match persist.await {
            Ok(value) => {
                action.commit();
                Ok(value)
            }
            Err(err) => {
                action.revert(state);
                Err(err)
            }
        }
    }
}
