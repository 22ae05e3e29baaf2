//! Envelope construction for the native capture entry point
//!
//! Every event goes through one preparation pipeline (level normalization,
//! metadata stripping, breadcrumb de-duplication, message wrapping) and is
//! then framed for the target platform.
//!
//! Android receives the text envelope format:
//! ```text
//! {envelope_header}\n
//! {item_header}\n
//! {item_payload}
//! ```
//!
//! iOS receives `{header, payload}` as a structured value and computes the
//! item length itself.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::NativeBridgeError;
use crate::native::{AvailabilityGate, NativeModule};
use crate::protocol::{Event, SdkInfo};

/// Content type of the event item
pub const EVENT_CONTENT_TYPE: &str = "application/json";
/// Item type used when the event does not declare one
pub const DEFAULT_ITEM_TYPE: &str = "event";
/// Reason attached to events not sent because native delivery is disabled
pub const SKIPPED_REASON: &str = "Event was skipped as native SDK is not enabled.";

/// Platform of the native agent, selects the envelope framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(with = "uuid::serde::simple")]
    pub event_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHeader {
    pub content_type: String,
    pub length: usize,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Envelope as handed to `capture_envelope`
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeEnvelope {
    /// Newline separated header, item header and payload
    Text(String),
    /// Header and payload as structured values
    Structured { header: EnvelopeHeader, payload: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
    Skipped,
}

/// Outcome of handing one event to the native agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub status: DeliveryStatus,
    pub reason: Option<String>,
}

impl DeliveryResponse {
    pub fn success() -> Self {
        Self {
            status: DeliveryStatus::Success,
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Skipped,
            reason: Some(reason.into()),
        }
    }
}

/// Event after the platform independent part of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEvent {
    pub header: EnvelopeHeader,
    pub payload: Value,
    pub item_type: String,
}

impl PreparedEvent {
    /// Run the shared pipeline on a copy of `event`.
    ///
    /// Breadcrumbs are dropped for events whose exception was explicitly
    /// handled: the native agent attaches its own persisted trail to every
    /// envelope. Crash-causing events keep theirs since the native trail does
    /// not survive until the next launch.
    pub fn from_event(event: &Event) -> Result<Self, serde_json::Error> {
        let mut event = event.clone();
        event.normalize_levels();
        event.sdk_processing_metadata = None;

        if event.is_handled() && !event.breadcrumbs.is_empty() {
            event.breadcrumbs.clear();
        }

        let header = EnvelopeHeader {
            event_id: event.event_id,
            sdk: event.sdk.clone(),
        };
        let item_type = event
            .ty
            .clone()
            .unwrap_or_else(|| DEFAULT_ITEM_TYPE.to_string());

        // Converting to a generic value also drops anything that cannot
        // cross the boundary.
        let mut payload = serde_json::to_value(&event)?;
        wrap_message(&mut payload);

        Ok(Self {
            header,
            payload,
            item_type,
        })
    }
}

/// The native schema expects `message` as `{ "message": ... }`.
fn wrap_message(payload: &mut Value) {
    if let Some(object) = payload.as_object_mut() {
        let mut wrapper = Map::new();
        if let Some(message) = object.remove("message") {
            wrapper.insert("message".to_string(), message);
        }
        object.insert("message".to_string(), Value::Object(wrapper));
    }
}

/// Builds platform envelopes and delivers them through the gate
pub struct EnvelopeBuilder {
    gate: Arc<AvailabilityGate>,
    platform: Platform,
}

impl EnvelopeBuilder {
    pub fn new(gate: Arc<AvailabilityGate>, platform: Platform) -> Self {
        Self { gate, platform }
    }

    /// Build the envelope for `event` without delivering it.
    ///
    /// On Android this asks `module` for the payload's byte length and falls
    /// back to the UTF-16 code unit count when that call fails.
    pub async fn build(
        &self,
        module: &dyn NativeModule,
        event: &Event,
    ) -> Result<NativeEnvelope, NativeBridgeError> {
        let prepared = PreparedEvent::from_event(event)?;

        match self.platform {
            Platform::Android => {
                let header = serde_json::to_string(&prepared.header)?;
                let payload = serde_json::to_string(&prepared.payload)?;

                let length = match module.get_string_bytes_length(payload.clone()).await {
                    Ok(length) => length,
                    Err(e) => {
                        let fallback = payload.encode_utf16().count();
                        debug!(
                            "Native byte length unavailable ({}), using UTF-16 length {}",
                            e, fallback
                        );
                        fallback
                    }
                };

                let item = serde_json::to_string(&ItemHeader {
                    content_type: EVENT_CONTENT_TYPE.to_string(),
                    length,
                    ty: prepared.item_type,
                })?;

                Ok(NativeEnvelope::Text(format!("{}\n{}\n{}", header, item, payload)))
            }
            Platform::Ios => Ok(NativeEnvelope::Structured {
                header: prepared.header,
                payload: prepared.payload,
            }),
        }
    }

    /// Send `event` to the native agent.
    ///
    /// Returns `Skipped` when native delivery is disabled. Delivery failures
    /// are reported as `Failed`, never as errors.
    pub async fn send_event(&self, event: &Event) -> Result<DeliveryResponse, NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            debug!("Skipping event {}: native delivery disabled", event.event_id);
            return Ok(DeliveryResponse::skipped(SKIPPED_REASON));
        };

        let envelope = self.build(module.as_ref(), event).await?;

        match module.capture_envelope(envelope).await {
            Ok(true) => Ok(DeliveryResponse::success()),
            Ok(false) => Ok(DeliveryResponse::failed(
                "Native agent did not accept the envelope",
            )),
            Err(e) => {
                warn!("Failed to hand event {} to native agent: {}", event.event_id, e);
                Ok(DeliveryResponse::failed(e.to_string()))
            }
        }
    }
}
