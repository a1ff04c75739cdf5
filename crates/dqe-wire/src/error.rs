//! Errors surfaced by the transport facade.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("cast error: {0}")]
    Cast(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Core(#[from] dqe_core::CoreError),
}

impl WireError {
    /// Flatten to the single status string the coordinator/node RPC
    /// surface speaks (§6, §7): empty means success, non-empty is the
    /// error.
    pub fn status_string(&self) -> String {
        self.to_string()
    }
}
