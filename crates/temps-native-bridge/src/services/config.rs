//! Bridge options and the subset that is handed to the native agent

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::integrations::Integration;
use crate::protocol::{Breadcrumb, Event};
use crate::transport::Transport;

/// Hook applied to every event before delivery; `None` drops the event
pub type BeforeSendHook = Arc<dyn Fn(Event) -> Option<Event> + Send + Sync>;
/// Hook applied to every breadcrumb before it is recorded; `None` drops it
pub type BeforeBreadcrumbHook = Arc<dyn Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync>;

// Helper functions for serde defaults
fn default_true() -> bool {
    true
}

/// Options the host application configures the bridge with.
///
/// Field names follow the camelCase keys the native agent uses. Unknown keys
/// are kept and forwarded to native init as-is. Hooks, integrations and the
/// transport only exist in-process and are never forwarded.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOptions {
    /// Delivery destination. Without it the native agent is not started.
    #[serde(default)]
    pub dsn: Option<String>,

    #[serde(default = "default_true")]
    pub enable_native: bool,

    #[serde(default = "default_true")]
    pub auto_initialize_native_sdk: bool,

    /// Log a warning when native delivery is turned off by configuration
    #[serde(default = "default_true")]
    pub enable_native_nagger: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub release: Option<String>,

    #[serde(default)]
    pub dist: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(flatten)]
    pub native_extras: Map<String, Value>,

    #[serde(skip)]
    pub before_send: Option<BeforeSendHook>,

    #[serde(skip)]
    pub before_breadcrumb: Option<BeforeBreadcrumbHook>,

    #[serde(skip)]
    pub integrations: Vec<Arc<dyn Integration>>,

    #[serde(skip)]
    pub transport: Option<Arc<dyn Transport>>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            dsn: None,
            enable_native: default_true(),
            auto_initialize_native_sdk: default_true(),
            enable_native_nagger: default_true(),
            debug: false,
            release: None,
            dist: None,
            environment: None,
            native_extras: Map::new(),
            before_send: None,
            before_breadcrumb: None,
            integrations: Vec::new(),
            transport: None,
        }
    }
}

impl fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integrations: Vec<&str> = self.integrations.iter().map(|i| i.name()).collect();
        f.debug_struct("BridgeOptions")
            .field("dsn", &self.dsn)
            .field("enable_native", &self.enable_native)
            .field("auto_initialize_native_sdk", &self.auto_initialize_native_sdk)
            .field("enable_native_nagger", &self.enable_native_nagger)
            .field("debug", &self.debug)
            .field("release", &self.release)
            .field("dist", &self.dist)
            .field("environment", &self.environment)
            .field("native_extras", &self.native_extras)
            .field("before_send", &self.before_send.is_some())
            .field("before_breadcrumb", &self.before_breadcrumb.is_some())
            .field("integrations", &integrations)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl BridgeOptions {
    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    pub fn with_before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(Event) -> Option<Event> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    pub fn with_before_breadcrumb<F>(mut self, hook: F) -> Self
    where
        F: Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync + 'static,
    {
        self.before_breadcrumb = Some(Arc::new(hook));
        self
    }

    pub fn with_integration(mut self, integration: Arc<dyn Integration>) -> Self {
        self.integrations.push(integration);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Options safe to hand to the native initializer
    pub fn native_options(&self) -> NativeSdkOptions {
        NativeSdkOptions {
            dsn: self.dsn.clone(),
            enable_native: self.enable_native,
            auto_initialize_native_sdk: self.auto_initialize_native_sdk,
            enable_native_nagger: self.enable_native_nagger,
            debug: self.debug,
            release: self.release.clone(),
            dist: self.dist.clone(),
            environment: self.environment.clone(),
            extras: self.native_extras.clone(),
        }
    }
}

/// Transportable options passed to `init_native_sdk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSdkOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    pub enable_native: bool,
    pub auto_initialize_native_sdk: bool,
    pub enable_native_nagger: bool,
    pub debug: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}
