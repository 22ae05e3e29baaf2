//! Native Agent Boundary
//!
//! Defines the call contract of the separately implemented native telemetry
//! agent. The bridge never sees the agent's internals; it only holds an
//! optional handle to something implementing [`NativeModule`].
//!
//! ## Architecture
//!
//! ```text
//! Scope / Envelope / Lifecycle services
//!     ↓
//! AvailabilityGate::acquire()
//!     ↓
//! NativeModule (injected handle)
//!     ↓
//! Native agent
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::NativeEnvelope;
use crate::error::NativeCallError;
use crate::protocol::{Level, SdkPackage, StringMap, User};
use crate::services::NativeSdkOptions;

pub mod gate;

pub use gate::AvailabilityGate;

/// Breadcrumb in the shape the native scope accepts: string-only data and a
/// level from the native vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NativeBreadcrumb {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Release information of the host application as known by the native agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeRelease {
    pub id: String,
    pub version: String,
    pub build: String,
}

/// Device contexts and scope data collected natively (iOS only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeDeviceContexts {
    #[serde(default)]
    pub contexts: Map<String, Value>,
    #[serde(default)]
    pub user: Option<User>,
}

impl NativeDeviceContexts {
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty() && self.user.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeAppStart {
    /// Milliseconds since the Unix epoch
    pub app_start_time: f64,
    pub is_cold_start: bool,
    pub did_fetch_app_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeFrames {
    pub total_frames: u64,
    pub slow_frames: u64,
    pub frozen_frames: u64,
}

/// Call contract of the native agent.
///
/// Every method is one boundary crossing. Implementations own any
/// serialization of concurrent calls; the bridge neither queues nor retries.
#[async_trait]
pub trait NativeModule: Send + Sync {
    /// Start the native agent; returns whether it is ready
    async fn init_native_sdk(&self, options: NativeSdkOptions) -> Result<bool, NativeCallError>;

    /// Single entry point for event delivery; returns whether it was accepted
    async fn capture_envelope(&self, envelope: NativeEnvelope) -> Result<bool, NativeCallError>;

    /// Exact UTF-8 byte length of `payload` as computed natively
    async fn get_string_bytes_length(&self, payload: String) -> Result<usize, NativeCallError>;

    async fn set_user(
        &self,
        default_keys: Option<StringMap>,
        other_keys: Option<StringMap>,
    ) -> Result<(), NativeCallError>;

    async fn set_tag(&self, key: String, value: String) -> Result<(), NativeCallError>;

    async fn set_extra(&self, key: String, value: String) -> Result<(), NativeCallError>;

    async fn add_breadcrumb(&self, breadcrumb: NativeBreadcrumb) -> Result<(), NativeCallError>;

    async fn clear_breadcrumbs(&self) -> Result<(), NativeCallError>;

    async fn set_context(
        &self,
        key: String,
        context: Option<StringMap>,
    ) -> Result<(), NativeCallError>;

    async fn close_native_sdk(&self) -> Result<(), NativeCallError>;

    /// Crash the native side on purpose. Test-only, fire-and-forget.
    fn crash(&self);

    async fn fetch_native_release(&self) -> Result<NativeRelease, NativeCallError>;

    async fn fetch_native_device_contexts(&self) -> Result<NativeDeviceContexts, NativeCallError>;

    async fn fetch_native_app_start(&self) -> Result<Option<NativeAppStart>, NativeCallError>;

    async fn fetch_native_frames(&self) -> Result<Option<NativeFrames>, NativeCallError>;

    async fn fetch_native_sdk_info(&self) -> Result<Option<SdkPackage>, NativeCallError>;
}
