pub mod config;
pub mod lifecycle_service;
pub mod scope_service;

pub use config::{BeforeBreadcrumbHook, BeforeSendHook, BridgeOptions, NativeSdkOptions};
pub use lifecycle_service::LifecycleService;
pub use scope_service::ScopeService;
