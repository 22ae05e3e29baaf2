//! Event processors that enrich events with data read from the native agent

use async_trait::async_trait;
use tracing::warn;

use crate::bridge::NativeBridge;
use crate::error::NativeBridgeError;
use crate::native::NativeRelease;
use crate::protocol::Event;

/// In-process event processor run by [`NativeBridge::capture_event`].
///
/// Integrations are never forwarded to the native agent.
#[async_trait]
pub trait Integration: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process_event(
        &self,
        event: Event,
        bridge: &NativeBridge,
    ) -> Result<Event, NativeBridgeError>;
}

/// Merges device contexts collected by the native agent into the event.
///
/// Contexts already on the event win; the native user is only used when the
/// event has none.
#[derive(Debug, Default)]
pub struct DeviceContextIntegration;

#[async_trait]
impl Integration for DeviceContextIntegration {
    fn name(&self) -> &'static str {
        "DeviceContext"
    }

    async fn process_event(
        &self,
        mut event: Event,
        bridge: &NativeBridge,
    ) -> Result<Event, NativeBridgeError> {
        let native = match bridge.fetch_native_device_contexts().await {
            Ok(native) => native,
            Err(e) => {
                warn!("Failed to get device context from native: {}", e);
                return Ok(event);
            }
        };

        for (key, value) in native.contexts {
            event.contexts.entry(key).or_insert(value);
        }
        if event.user.is_none() {
            event.user = native.user;
        }

        Ok(event)
    }
}

/// Fills `release` and `dist` from the native app bundle
#[derive(Debug, Default)]
pub struct ReleaseIntegration;

impl ReleaseIntegration {
    /// Release name in `{id}@{version}+{build}` form
    pub fn release_name(release: &NativeRelease) -> String {
        format!("{}@{}+{}", release.id, release.version, release.build)
    }
}

#[async_trait]
impl Integration for ReleaseIntegration {
    fn name(&self) -> &'static str {
        "Release"
    }

    async fn process_event(
        &self,
        mut event: Event,
        bridge: &NativeBridge,
    ) -> Result<Event, NativeBridgeError> {
        if event.release.is_some() && event.dist.is_some() {
            return Ok(event);
        }

        let release = match bridge.fetch_native_release().await {
            Ok(Some(release)) => release,
            Ok(None) => return Ok(event),
            Err(e) => {
                warn!("Failed to get release from native: {}", e);
                return Ok(event);
            }
        };

        if event.release.is_none() {
            event.release = Some(Self::release_name(&release));
        }
        if event.dist.is_none() {
            event.dist = Some(release.build);
        }

        Ok(event)
    }
}
