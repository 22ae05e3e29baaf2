//! # Native Bridge
//!
//! Entry point the host application talks to. Owns the availability gate and
//! hands it to the services that need it.
//!
//! ```text
//! Host application
//!     ↓
//! NativeBridge
//!     ├── LifecycleService   (initialize / close)
//!     ├── ScopeService       (user, tags, extras, contexts, breadcrumbs)
//!     └── EnvelopeBuilder    (send_event)
//!           ↓
//!     AvailabilityGate → NativeModule
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::envelope::{DeliveryResponse, EnvelopeBuilder, Platform};
use crate::error::NativeBridgeError;
use crate::native::{
    AvailabilityGate, NativeAppStart, NativeDeviceContexts, NativeFrames, NativeModule,
    NativeRelease,
};
use crate::protocol::{Breadcrumb, Event, SdkPackage};
use crate::services::{BridgeOptions, LifecycleService, ScopeService};

/// Reason attached to events dropped by the `before_send` hook
pub const DROPPED_BY_BEFORE_SEND: &str = "Event was dropped by before_send.";

pub struct NativeBridge {
    gate: Arc<AvailabilityGate>,
    platform: Platform,
    envelopes: EnvelopeBuilder,
    scope: ScopeService,
    lifecycle: LifecycleService,
}

impl NativeBridge {
    /// `module` is the native handle resolved at process start, if any
    pub fn new(module: Option<Arc<dyn NativeModule>>, platform: Platform) -> Self {
        let gate = Arc::new(AvailabilityGate::new(module));
        Self {
            envelopes: EnvelopeBuilder::new(gate.clone(), platform),
            scope: ScopeService::new(gate.clone()),
            lifecycle: LifecycleService::new(gate.clone()),
            gate,
            platform,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub fn module_loaded(&self) -> bool {
        self.gate.module_loaded()
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// True when events handed to [`NativeBridge::send_event`] can reach the
    /// native agent
    pub fn is_native_transport_available(&self) -> bool {
        self.gate.is_enabled() && self.gate.module_loaded()
    }

    pub fn scope(&self) -> &ScopeService {
        &self.scope
    }

    /// Start the native agent. Refused (`Ok(false)`) after the bridge was
    /// disabled or closed.
    pub async fn initialize(&self, options: &BridgeOptions) -> Result<bool, NativeBridgeError> {
        self.lifecycle.initialize(options).await
    }

    pub async fn close(&self) -> Result<(), NativeBridgeError> {
        self.lifecycle.close().await
    }

    pub async fn send_event(&self, event: &Event) -> Result<DeliveryResponse, NativeBridgeError> {
        self.envelopes.send_event(event).await
    }

    /// Run an event through the configured pipeline and deliver it.
    ///
    /// Option defaults are applied first, then every integration in order,
    /// then `before_send`. Delivery goes through the configured transport,
    /// or straight to the native agent when none is set.
    pub async fn capture_event(
        &self,
        mut event: Event,
        options: &BridgeOptions,
    ) -> Result<DeliveryResponse, NativeBridgeError> {
        if event.release.is_none() {
            event.release = options.release.clone();
        }
        if event.dist.is_none() {
            event.dist = options.dist.clone();
        }
        if let Some(environment) = &options.environment {
            event
                .other
                .entry("environment")
                .or_insert_with(|| Value::String(environment.clone()));
        }

        for integration in &options.integrations {
            event = integration.process_event(event, self).await?;
        }

        let event = match &options.before_send {
            Some(hook) => match hook(event) {
                Some(event) => event,
                None => {
                    debug!("Event dropped by before_send");
                    return Ok(DeliveryResponse::skipped(DROPPED_BY_BEFORE_SEND));
                }
            },
            None => event,
        };

        match &options.transport {
            Some(transport) => transport.send_event(event).await,
            None => self.send_event(&event).await,
        }
    }

    /// Apply `before_breadcrumb` and forward the breadcrumb to native scope
    pub async fn record_breadcrumb(
        &self,
        breadcrumb: Breadcrumb,
        options: &BridgeOptions,
    ) -> Result<(), NativeBridgeError> {
        let breadcrumb = match &options.before_breadcrumb {
            Some(hook) => match hook(breadcrumb) {
                Some(breadcrumb) => breadcrumb,
                None => return Ok(()),
            },
            None => breadcrumb,
        };

        self.scope.add_breadcrumb(&breadcrumb).await
    }

    /// Crash the native side. Only meant for verifying crash reporting.
    pub fn native_crash(&self) -> Result<(), NativeBridgeError> {
        if let Some(module) = self.gate.acquire()? {
            module.crash();
        }
        Ok(())
    }

    pub async fn fetch_native_release(&self) -> Result<Option<NativeRelease>, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(None);
        };
        Ok(Some(module.fetch_native_release().await?))
    }

    /// Native device contexts; empty when disabled or not on iOS
    pub async fn fetch_native_device_contexts(
        &self,
    ) -> Result<NativeDeviceContexts, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(NativeDeviceContexts::default());
        };
        if self.platform != Platform::Ios {
            return Ok(NativeDeviceContexts::default());
        }
        Ok(module.fetch_native_device_contexts().await?)
    }

    pub async fn fetch_native_app_start(&self) -> Result<Option<NativeAppStart>, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(None);
        };
        Ok(module.fetch_native_app_start().await?)
    }

    pub async fn fetch_native_frames(&self) -> Result<Option<NativeFrames>, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(None);
        };
        Ok(module.fetch_native_frames().await?)
    }

    /// Native SDK descriptor; `None` when disabled or not on iOS
    pub async fn fetch_native_sdk_info(&self) -> Result<Option<SdkPackage>, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(None);
        };
        if self.platform != Platform::Ios {
            return Ok(None);
        }
        Ok(module.fetch_native_sdk_info().await?)
    }
}
