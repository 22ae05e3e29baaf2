//! Event, breadcrumb and user types as they exist in-process

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::level::Level;

/// A diagnostic event ready to be reported.
///
/// Attributes the bridge never inspects (tags, extra, request, ...) are kept
/// in `other` and travel to the native agent untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "uuid::serde::simple")]
    pub event_id: Uuid,

    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionValues>,

    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,

    /// Item type of the event ("event", "transaction", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub contexts: Map<String, Value>,

    /// Bookkeeping used by in-process event processors. Must never be sent.
    #[serde(
        rename = "sdkProcessingMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdk_processing_metadata: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Some(Utc::now()),
            level: None,
            message: None,
            exception: None,
            breadcrumbs: Vec::new(),
            sdk: None,
            ty: None,
            user: None,
            release: None,
            dist: None,
            contexts: Map::new(),
            sdk_processing_metadata: None,
            other: Map::new(),
        }
    }

    /// True only when the first exception's mechanism explicitly reports
    /// `handled: true`. Absent mechanism or flag counts as not handled.
    pub fn is_handled(&self) -> bool {
        self.exception
            .as_ref()
            .and_then(|exceptions| exceptions.values.first())
            .and_then(|exception| exception.mechanism.as_ref())
            .and_then(|mechanism| mechanism.handled)
            .unwrap_or(false)
    }

    /// Normalize the event level and every breadcrumb level in place
    pub fn normalize_levels(&mut self) {
        self.level = self.level.map(Level::normalize);
        for breadcrumb in &mut self.breadcrumbs {
            breadcrumb.level = breadcrumb.level.map(Level::normalize);
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionValues {
    #[serde(default)]
    pub values: Vec<Exception>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<Mechanism>,

    /// Stacktrace, module, thread id and anything else the exception carries
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// How an exception was captured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mechanism {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    /// `false` marks a crash-causing exception
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled: Option<bool>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkInfo {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<SdkPackage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkPackage {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// User attached to the scope.
///
/// The four named fields are the well-known keys the native schema stores
/// separately; everything else lands in `other`. Values are kept as given
/// (ids are often numeric) and stringified when forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<Value>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Accepts either float epoch seconds or an RFC 3339 string
fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EpochOrRfc3339 {
        Epoch(f64),
        Rfc3339(DateTime<Utc>),
    }

    match Option::<EpochOrRfc3339>::deserialize(deserializer)? {
        None => Ok(None),
        Some(EpochOrRfc3339::Rfc3339(timestamp)) => Ok(Some(timestamp)),
        Some(EpochOrRfc3339::Epoch(seconds)) => Utc
            .timestamp_millis_opt((seconds * 1000.0).round() as i64)
            .single()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", seconds))),
    }
}
