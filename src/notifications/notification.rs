//! Notification Records
//!
//! The data carried by the store: an immutable identifier, the open flag and
//! an opaque display payload. The store moves these records around but never
//! looks inside the payload.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque, unique notification identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Visual variant of a toast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Variant::Default),
            "destructive" => Ok(Variant::Destructive),
            _ => Err(format!("Invalid variant: {}. Valid options: default, destructive", s)),
        }
    }
}

/// Action affordance rendered alongside a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastAction {
    pub label: String,
    /// Text read out by assistive technology in place of the label
    pub alt_text: String,
}

impl ToastAction {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            alt_text: label.clone(),
            label,
        }
    }
}

/// Display payload supplied by the caller of `enqueue`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ToastAction>,
    #[serde(default)]
    pub variant: Variant,
}

impl ToastPayload {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }
}

/// A transient message record held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    pub open: bool,
    #[serde(flatten)]
    pub payload: ToastPayload,
}

impl Notification {
    /// Create an open notification
    pub fn new(id: NotificationId, payload: ToastPayload) -> Self {
        Self {
            id,
            open: true,
            payload,
        }
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.payload.title.as_deref()
    }

    /// Shallow-merge the fields present in `update`; the id never changes
    pub(crate) fn merge(&mut self, update: &NotificationUpdate) {
        if let Some(title) = &update.title {
            self.payload.title = Some(title.clone());
        }
        if let Some(description) = &update.description {
            self.payload.description = Some(description.clone());
        }
        if let Some(action) = &update.action {
            self.payload.action = Some(action.clone());
        }
        if let Some(variant) = update.variant {
            self.payload.variant = variant;
        }
        if let Some(open) = update.open {
            self.open = open;
        }
    }
}

/// Partial notification used by `update`
///
/// Only fields set to `Some` are merged. `open` is left alone unless the
/// caller includes it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUpdate {
    pub id: NotificationId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub action: Option<ToastAction>,
    pub variant: Option<Variant>,
    pub open: Option<bool>,
}

impl NotificationUpdate {
    pub fn new(id: NotificationId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }
}
