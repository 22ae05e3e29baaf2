//! temps-native-bridge: relays in-process telemetry to a native agent
//!
//! Scope updates are forwarded call-by-call, events are wrapped in a
//! platform specific envelope and handed to the agent's capture entry point.
//! Availability of the native side is tracked by a gate shared by every
//! operation.

pub mod bridge;
pub mod envelope;
pub mod error;
pub mod integrations;
pub mod native;
pub mod protocol;
pub mod services;
pub mod transport;

pub use bridge::NativeBridge;
pub use envelope::{DeliveryResponse, DeliveryStatus, EnvelopeBuilder, NativeEnvelope, Platform};
pub use error::{NativeBridgeError, NativeCallError};
pub use integrations::{DeviceContextIntegration, Integration, ReleaseIntegration};
pub use native::{AvailabilityGate, NativeModule};
pub use protocol::{Breadcrumb, Event, Level, User};
pub use services::{BridgeOptions, NativeSdkOptions};
pub use transport::{NativeTransport, Transport};
