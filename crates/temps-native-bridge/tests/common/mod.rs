//! Recording native module shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use temps_native_bridge::native::{
    NativeAppStart, NativeBreadcrumb, NativeDeviceContexts, NativeFrames, NativeRelease,
};
use temps_native_bridge::protocol::{SdkPackage, StringMap};
use temps_native_bridge::{NativeCallError, NativeEnvelope, NativeModule, NativeSdkOptions};
use tokio::sync::Notify;

pub const DSN: &str = "https://public@o1.ingest.example.com/42";

/// One boundary call as observed by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Init(NativeSdkOptions),
    CaptureEnvelope(NativeEnvelope),
    GetStringBytesLength,
    SetUser(Option<StringMap>, Option<StringMap>),
    SetTag(String, String),
    SetExtra(String, String),
    AddBreadcrumb(NativeBreadcrumb),
    ClearBreadcrumbs,
    SetContext(String, Option<StringMap>),
    Close,
    Crash,
    FetchRelease,
    FetchDeviceContexts,
    FetchAppStart,
    FetchFrames,
    FetchSdkInfo,
}

/// Native module that records every call and answers with canned values
pub struct RecordingNativeModule {
    calls: Mutex<Vec<NativeCall>>,
    init_ready: bool,
    accept_envelopes: bool,
    byte_length_fails: bool,
    close_gate: Option<Arc<Notify>>,
}

impl RecordingNativeModule {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            init_ready: true,
            accept_envelopes: true,
            byte_length_fails: false,
            close_gate: None,
        }
    }

    pub fn rejecting_envelopes(mut self) -> Self {
        self.accept_envelopes = false;
        self
    }

    pub fn failing_byte_length(mut self) -> Self {
        self.byte_length_fails = true;
        self
    }

    /// Hold `close_native_sdk` until `gate` is notified
    pub fn with_close_gate(mut self, gate: Arc<Notify>) -> Self {
        self.close_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn envelopes(&self) -> Vec<NativeEnvelope> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NativeCall::CaptureEnvelope(envelope) => Some(envelope),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: NativeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NativeModule for RecordingNativeModule {
    async fn init_native_sdk(&self, options: NativeSdkOptions) -> Result<bool, NativeCallError> {
        self.record(NativeCall::Init(options));
        Ok(self.init_ready)
    }

    async fn capture_envelope(&self, envelope: NativeEnvelope) -> Result<bool, NativeCallError> {
        self.record(NativeCall::CaptureEnvelope(envelope));
        Ok(self.accept_envelopes)
    }

    async fn get_string_bytes_length(&self, payload: String) -> Result<usize, NativeCallError> {
        self.record(NativeCall::GetStringBytesLength);
        if self.byte_length_fails {
            return Err(NativeCallError::new("getStringBytesLength", "not supported"));
        }
        Ok(payload.len())
    }

    async fn set_user(
        &self,
        default_keys: Option<StringMap>,
        other_keys: Option<StringMap>,
    ) -> Result<(), NativeCallError> {
        self.record(NativeCall::SetUser(default_keys, other_keys));
        Ok(())
    }

    async fn set_tag(&self, key: String, value: String) -> Result<(), NativeCallError> {
        self.record(NativeCall::SetTag(key, value));
        Ok(())
    }

    async fn set_extra(&self, key: String, value: String) -> Result<(), NativeCallError> {
        self.record(NativeCall::SetExtra(key, value));
        Ok(())
    }

    async fn add_breadcrumb(&self, breadcrumb: NativeBreadcrumb) -> Result<(), NativeCallError> {
        self.record(NativeCall::AddBreadcrumb(breadcrumb));
        Ok(())
    }

    async fn clear_breadcrumbs(&self) -> Result<(), NativeCallError> {
        self.record(NativeCall::ClearBreadcrumbs);
        Ok(())
    }

    async fn set_context(
        &self,
        key: String,
        context: Option<StringMap>,
    ) -> Result<(), NativeCallError> {
        self.record(NativeCall::SetContext(key, context));
        Ok(())
    }

    async fn close_native_sdk(&self) -> Result<(), NativeCallError> {
        self.record(NativeCall::Close);
        if let Some(gate) = &self.close_gate {
            gate.notified().await;
        }
        Ok(())
    }

    fn crash(&self) {
        self.record(NativeCall::Crash);
    }

    async fn fetch_native_release(&self) -> Result<NativeRelease, NativeCallError> {
        self.record(NativeCall::FetchRelease);
        Ok(NativeRelease {
            id: "com.example.app".to_string(),
            version: "2.1.0".to_string(),
            build: "310".to_string(),
        })
    }

    async fn fetch_native_device_contexts(&self) -> Result<NativeDeviceContexts, NativeCallError> {
        self.record(NativeCall::FetchDeviceContexts);
        Ok(NativeDeviceContexts {
            contexts: json!({"device": {"family": "iOS"}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
            user: None,
        })
    }

    async fn fetch_native_app_start(&self) -> Result<Option<NativeAppStart>, NativeCallError> {
        self.record(NativeCall::FetchAppStart);
        Ok(Some(NativeAppStart {
            app_start_time: 1_700_000_000_000.0,
            is_cold_start: true,
            did_fetch_app_start: false,
        }))
    }

    async fn fetch_native_frames(&self) -> Result<Option<NativeFrames>, NativeCallError> {
        self.record(NativeCall::FetchFrames);
        Ok(Some(NativeFrames {
            total_frames: 600,
            slow_frames: 12,
            frozen_frames: 1,
        }))
    }

    async fn fetch_native_sdk_info(&self) -> Result<Option<SdkPackage>, NativeCallError> {
        self.record(NativeCall::FetchSdkInfo);
        Ok(Some(SdkPackage {
            name: "sentry-cocoa".to_string(),
            version: "8.0.0".to_string(),
        }))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("temps_native_bridge=debug")),
        )
        .with_test_writer()
        .try_init();
}
