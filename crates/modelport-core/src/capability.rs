use std::sync::OnceLock;

/// Observable state of the first-dimension batching answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchingState {
    Unresolved,
    Resolved(bool),
}

/// Memoized answer to "does this model batch along its first dimension".
///
/// The host can only answer after the model finishes loading, so the value is
/// resolved on first use. Concurrent first callers may each query the host;
/// the first stored answer wins and is never replaced.
#[derive(Debug, Default)]
pub struct BatchingCapability {
    resolved: OnceLock<bool>,
}

impl BatchingCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BatchingState {
        match self.resolved.get() {
            Some(value) => BatchingState::Resolved(*value),
            None => BatchingState::Unresolved,
        }
    }

    /// Returns the cached answer, or runs `query` and caches its answer.
    /// A failed query leaves the capability unresolved.
    pub fn resolve_with<E>(&self, query: impl FnOnce() -> Result<bool, E>) -> Result<bool, E> {
        if let Some(value) = self.resolved.get() {
            return Ok(*value);
        }
        let value = query()?;
        Ok(*self.resolved.get_or_init(|| value))
    }
}
