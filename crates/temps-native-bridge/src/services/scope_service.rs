//! Scope Bridge
//!
//! Forwards scope mutations to the native agent one call at a time. Nothing
//! is cached, batched or read back: N calls here are N native calls, in
//! invocation order.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::NativeBridgeError;
use crate::native::{AvailabilityGate, NativeBreadcrumb};
use crate::protocol::{serialize_object, serialize_value, Breadcrumb, Level, StringMap, User};

pub struct ScopeService {
    gate: Arc<AvailabilityGate>,
}

impl ScopeService {
    pub fn new(gate: Arc<AvailabilityGate>) -> Self {
        Self { gate }
    }

    /// Set or clear (`None`) the native user.
    ///
    /// The well-known keys and the remaining keys travel as two separate
    /// maps; clearing sends two `None` maps.
    pub async fn set_user(&self, user: Option<&User>) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        let (default_keys, other_keys) = match user {
            Some(user) => {
                let (default_keys, other_keys) = split_user(user);
                (Some(default_keys), Some(other_keys))
            }
            None => (None, None),
        };

        module.set_user(default_keys, other_keys).await?;
        Ok(())
    }

    pub async fn set_tag(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        module
            .set_tag(key.to_string(), serialize_value(&value.into()))
            .await?;
        Ok(())
    }

    pub async fn set_extra(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        module
            .set_extra(key.to_string(), serialize_value(&value.into()))
            .await?;
        Ok(())
    }

    pub async fn add_breadcrumb(&self, breadcrumb: &Breadcrumb) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        module.add_breadcrumb(to_native_breadcrumb(breadcrumb)).await?;
        Ok(())
    }

    pub async fn clear_breadcrumbs(&self) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        module.clear_breadcrumbs().await?;
        Ok(())
    }

    /// Set or clear (`None`) a named context
    pub async fn set_context(
        &self,
        key: &str,
        context: Option<&Map<String, Value>>,
    ) -> Result<(), NativeBridgeError> {
        let Some(module) = self.gate.acquire()? else {
            return Ok(());
        };

        module
            .set_context(key.to_string(), context.map(serialize_object))
            .await?;
        Ok(())
    }
}

/// Split a user into its well-known keys and everything else
fn split_user(user: &User) -> (StringMap, StringMap) {
    let mut default_keys = StringMap::new();
    let known = [
        ("id", &user.id),
        ("email", &user.email),
        ("ip_address", &user.ip_address),
        ("username", &user.username),
    ];
    for (key, value) in known {
        if let Some(value) = value {
            default_keys.insert(key.to_string(), serialize_value(value));
        }
    }

    (default_keys, serialize_object(&user.other))
}

fn to_native_breadcrumb(breadcrumb: &Breadcrumb) -> NativeBreadcrumb {
    NativeBreadcrumb {
        ty: breadcrumb.ty.clone(),
        category: breadcrumb.category.clone(),
        message: breadcrumb.message.clone(),
        data: breadcrumb.data.as_ref().map(serialize_object),
        level: breadcrumb.level.map(Level::normalize),
        timestamp: breadcrumb.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NativeCallError;
    use crate::native::mock::MockNativeModule;
    use mockall::predicate::eq;
    use serde_json::json;

    fn service(module: MockNativeModule) -> ScopeService {
        ScopeService::new(Arc::new(AvailabilityGate::new(Some(Arc::new(module)))))
    }

    fn string_map(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_user_splits_default_and_other_keys() {
        let user: User = serde_json::from_value(json!({
            "id": "1",
            "email": "e@x.com",
            "ip_address": "1.2.3.4",
            "username": "u",
            "plan": "pro"
        }))
        .unwrap();

        let mut module = MockNativeModule::new();
        module
            .expect_set_user()
            .with(
                eq(Some(string_map(&[
                    ("id", "1"),
                    ("email", "e@x.com"),
                    ("ip_address", "1.2.3.4"),
                    ("username", "u"),
                ]))),
                eq(Some(string_map(&[("plan", "pro")]))),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        service(module).set_user(Some(&user)).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_user_stringifies_non_string_default_keys() {
        let user: User = serde_json::from_value(json!({
            "id": 42,
            "username": {"first": "ada"},
            "teams": [1, 2]
        }))
        .unwrap();

        let mut module = MockNativeModule::new();
        module
            .expect_set_user()
            .with(
                eq(Some(string_map(&[
                    ("id", "42"),
                    ("username", "{\"first\":\"ada\"}"),
                ]))),
                eq(Some(string_map(&[("teams", "[1,2]")]))),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        service(module).set_user(Some(&user)).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_user_none_clears_both_maps() {
        let mut module = MockNativeModule::new();
        module
            .expect_set_user()
            .with(eq(None::<StringMap>), eq(None::<StringMap>))
            .times(1)
            .returning(|_, _| Ok(()));

        service(module).set_user(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_tag_and_extra_stringify_values() {
        let mut module = MockNativeModule::new();
        module
            .expect_set_tag()
            .with(eq("build".to_string()), eq("42".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));
        module
            .expect_set_tag()
            .with(eq("screen".to_string()), eq("home".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));
        module
            .expect_set_extra()
            .with(eq("cart".to_string()), eq("{\"items\":[1,2]}".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(module);
        service.set_tag("build", 42).await.unwrap();
        service.set_tag("screen", "home").await.unwrap();
        service
            .set_extra("cart", json!({"items": [1, 2]}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_breadcrumb_serializes_data_and_normalizes_level() {
        let breadcrumb = Breadcrumb {
            category: Some("http".to_string()),
            data: Some(
                json!({"status_code": 500, "url": "/api"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
            level: Some(Level::Critical),
            ..Default::default()
        };

        let mut module = MockNativeModule::new();
        module
            .expect_add_breadcrumb()
            .withf(|crumb| {
                crumb.level == Some(Level::Fatal)
                    && crumb.category.as_deref() == Some("http")
                    && crumb.data.as_ref().map(|d| d["status_code"].as_str()) == Some("500")
                    && crumb.data.as_ref().map(|d| d["url"].as_str()) == Some("/api")
            })
            .times(1)
            .returning(|_| Ok(()));

        service(module).add_breadcrumb(&breadcrumb).await.unwrap();
    }

    #[tokio::test]
    async fn test_breadcrumb_without_data_or_level_forwards_none() {
        let mut module = MockNativeModule::new();
        module
            .expect_add_breadcrumb()
            .withf(|crumb| crumb.data.is_none() && crumb.level.is_none())
            .times(1)
            .returning(|_| Ok(()));

        service(module)
            .add_breadcrumb(&Breadcrumb::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clear_breadcrumbs_is_forwarded_every_time() {
        let mut module = MockNativeModule::new();
        module
            .expect_clear_breadcrumbs()
            .times(2)
            .returning(|| Ok(()));

        let service = service(module);
        service.clear_breadcrumbs().await.unwrap();
        service.clear_breadcrumbs().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_context_serializes_or_clears() {
        let mut module = MockNativeModule::new();
        module
            .expect_set_context()
            .with(
                eq("device".to_string()),
                eq(Some(string_map(&[("model", "Pixel"), ("memory", "4096")]))),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        module
            .expect_set_context()
            .with(eq("device".to_string()), eq(None::<StringMap>))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(module);
        let context = json!({"model": "Pixel", "memory": 4096});
        service
            .set_context("device", context.as_object())
            .await
            .unwrap();
        service.set_context("device", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_native_call_failure_propagates() {
        let mut module = MockNativeModule::new();
        module
            .expect_set_tag()
            .returning(|_, _| Err(NativeCallError::new("setTag", "scope locked")));

        let result = service(module).set_tag("key", "value").await;
        assert!(matches!(result, Err(NativeBridgeError::NativeCall(_))));
    }

    #[tokio::test]
    async fn test_disabled_gate_makes_no_native_calls() {
        let gate = Arc::new(AvailabilityGate::new(Some(Arc::new(MockNativeModule::new()))));
        gate.disable();
        let service = ScopeService::new(gate);

        service.set_user(Some(&User::default())).await.unwrap();
        service.set_tag("k", "v").await.unwrap();
        service.set_extra("k", 1).await.unwrap();
        service.add_breadcrumb(&Breadcrumb::default()).await.unwrap();
        service.clear_breadcrumbs().await.unwrap();
        service.set_context("k", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_module_is_unavailable() {
        let service = ScopeService::new(Arc::new(AvailabilityGate::new(None)));

        assert!(matches!(
            service.set_user(None).await,
            Err(NativeBridgeError::NativeUnavailable)
        ));
        assert!(matches!(
            service.clear_breadcrumbs().await,
            Err(NativeBridgeError::NativeUnavailable)
        ));
        assert!(matches!(
            service.set_context("k", None).await,
            Err(NativeBridgeError::NativeUnavailable)
        ));
    }
}
