//! Delivery strategy used by [`NativeBridge::capture_event`]

use std::sync::Arc;

use async_trait::async_trait;

use crate::bridge::NativeBridge;
use crate::envelope::DeliveryResponse;
use crate::error::NativeBridgeError;
use crate::protocol::Event;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_event(&self, event: Event) -> Result<DeliveryResponse, NativeBridgeError>;
}

/// Delivers events through the native agent
pub struct NativeTransport {
    bridge: Arc<NativeBridge>,
}

impl NativeTransport {
    pub fn new(bridge: Arc<NativeBridge>) -> Self {
        Self { bridge }
    }

    /// Whether events can currently reach the native agent
    pub fn is_available(&self) -> bool {
        self.bridge.is_native_transport_available()
    }
}

#[async_trait]
impl Transport for NativeTransport {
    async fn send_event(&self, event: Event) -> Result<DeliveryResponse, NativeBridgeError> {
        self.bridge.send_event(&event).await
    }
}
