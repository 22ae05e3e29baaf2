//! Lifecycle Controller: native agent startup and shutdown

use std::sync::Arc;

use tracing::{debug, warn};

use super::config::BridgeOptions;
use crate::error::NativeBridgeError;
use crate::native::AvailabilityGate;

pub struct LifecycleService {
    gate: Arc<AvailabilityGate>,
}

impl LifecycleService {
    pub fn new(gate: Arc<AvailabilityGate>) -> Self {
        Self { gate }
    }

    /// Start the native agent.
    ///
    /// Returns `Ok(false)` without touching the native side when no DSN is
    /// configured, native delivery is disabled, auto-initialization is off,
    /// or the bridge was already closed. Only a missing native handle is an
    /// error.
    ///
    /// Re-initialization is refused once the bridge has been disabled by
    /// `enable_native: false` or by [`LifecycleService::close`]: `enabled`
    /// never returns to true, so no second native init is attempted.
    pub async fn initialize(&self, options: &BridgeOptions) -> Result<bool, NativeBridgeError> {
        if options.dsn.as_deref().map_or(true, str::is_empty) {
            warn!("No DSN was provided. Native SDK will not be initialized.");
            return Ok(false);
        }

        if !options.enable_native {
            if options.enable_native_nagger {
                warn!("Native SDK is disabled.");
            }
            self.gate.disable();
            return Ok(false);
        }

        if !options.auto_initialize_native_sdk {
            if options.enable_native_nagger {
                warn!(
                    "Native SDK was not initialized automatically, you will need to initialize it manually. \
                     If you wish to disable the native SDK and get rid of this warning, set enable_native to false."
                );
            }
            return Ok(false);
        }

        if !self.gate.is_enabled() {
            debug!("Native delivery already closed, skipping native initialization");
            return Ok(false);
        }

        let module = self.gate.module().ok_or(NativeBridgeError::NativeUnavailable)?;

        let ready = module.init_native_sdk(options.native_options()).await?;
        self.gate.set_ready(ready);
        debug!("Native SDK initialized, ready: {}", ready);

        Ok(ready)
    }

    /// Shut the native agent down.
    ///
    /// `enabled` flips to false only once the native call has resolved, so
    /// operations started before that point are still forwarded.
    pub async fn close(&self) -> Result<(), NativeBridgeError> {
        if !self.gate.is_enabled() {
            return Ok(());
        }
        let Some(module) = self.gate.module() else {
            return Ok(());
        };

        module.close_native_sdk().await?;
        self.gate.disable();
        debug!("Native SDK closed");

        Ok(())
    }
}
