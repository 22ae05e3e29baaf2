//! Error types for the native bridge

use thiserror::Error;

/// Failure reported by the native agent for a single boundary call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("native call `{call}` failed: {reason}")]
pub struct NativeCallError {
    /// Name of the boundary call that failed (e.g. "setTag")
    pub call: &'static str,
    pub reason: String,
}

impl NativeCallError {
    pub fn new(call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            call,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by bridge operations.
///
/// A disabled native agent is never an error: gated operations return their
/// documented empty or skipped result instead.
#[derive(Error, Debug)]
pub enum NativeBridgeError {
    /// Native delivery is enabled but the module handle was never resolved
    #[error("Native client is not available, can't start on native.")]
    NativeUnavailable,

    #[error("Native call error: {0}")]
    NativeCall(#[from] NativeCallError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
