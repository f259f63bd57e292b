use bytes::Bytes;
use tracing::warn;

use crate::{HostError, HostModel};

/// Owns a host configuration message until it is deleted.
///
/// `release` deletes it and reports the host's answer; a guard dropped on an
/// early return deletes it too, logging a failed delete instead.
pub struct MessageGuard<'a, M: HostModel> {
    model: &'a M,
    /// `Some` for as long as the guard is reachable; only `release` and
    /// `drop` take it, and both consume the guard.
    message: Option<M::Message>,
}

impl<'a, M: HostModel> MessageGuard<'a, M> {
    pub fn new(model: &'a M, message: M::Message) -> Self {
        Self {
            model,
            message: Some(message),
        }
    }

    pub fn serialize(&self) -> Result<Bytes, HostError> {
        match &self.message {
            Some(message) => self.model.serialize_message(message),
            None => Err(HostError::new("serialize_message", "message already released")),
        }
    }

    pub fn release(mut self) -> Result<(), HostError> {
        match self.message.take() {
            Some(message) => self.model.delete_message(message),
            None => Ok(()),
        }
    }
}

impl<M: HostModel> Drop for MessageGuard<'_, M> {
    fn drop(&mut self) {
        if let Some(message) = self.message.take() {
            if let Err(err) = self.model.delete_message(message) {
                warn!(error = %err, "failed to release model configuration message");
            }
        }
    }
}
