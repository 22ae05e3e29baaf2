//! Availability gate shared by every bridge service

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::NativeModule;
use crate::error::NativeBridgeError;

/// Tracks whether native delivery is enabled, whether the native handle was
/// resolved, and whether the native agent reported ready.
///
/// `enabled` starts out `true` and only ever moves to `false`.
pub struct AvailabilityGate {
    module: Option<Arc<dyn NativeModule>>,
    enabled: AtomicBool,
    ready: AtomicBool,
}

impl AvailabilityGate {
    /// `module` is the handle resolved at process start, `None` when the
    /// native agent is not linked into the process.
    pub fn new(module: Option<Arc<dyn NativeModule>>) -> Self {
        Self {
            module,
            enabled: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn module_loaded(&self) -> bool {
        self.module.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub(crate) fn disable(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            debug!("Native delivery disabled");
        }
    }

    /// Resolve the native handle for a gated operation.
    ///
    /// * `Ok(None)` - native is disabled, the caller takes its no-op path
    /// * `Err(NativeUnavailable)` - enabled but the handle is missing
    /// * `Ok(Some(module))` - proceed with the native call
    pub fn acquire(&self) -> Result<Option<Arc<dyn NativeModule>>, NativeBridgeError> {
        if !self.is_enabled() {
            return Ok(None);
        }
        match &self.module {
            Some(module) => Ok(Some(module.clone())),
            None => Err(NativeBridgeError::NativeUnavailable),
        }
    }

    /// Handle used by lifecycle operations, which run regardless of `enabled`
    pub(crate) fn module(&self) -> Option<Arc<dyn NativeModule>> {
        self.module.clone()
    }
}
