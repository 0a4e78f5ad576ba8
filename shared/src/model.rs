use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::capabilities::{validate_key_segment, PathError};
use crate::config::ClientConfig;
use crate::event::SubscriptionId;
use crate::form::ContactForm;
use crate::reducer::ContactStore;
use crate::route::Route;
use crate::{AppError, ToastKind, ToastMessage, MAX_QUEUED_TOASTS};

/// Opaque record key of a contact in the database.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactKey(String);

impl ContactKey {
    pub fn new(key: impl Into<String>) -> Result<Self, PathError> {
        let key = key.into();
        validate_key_segment(&key)?;
        Ok(Self(key))
    }

    /// Fresh random key for a record that does not exist yet.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContactKey {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContactKey> for String {
    fn from(key: ContactKey) -> Self {
        key.0
    }
}

/// A stored contact. Every field is optional on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub picture: Option<String>,
    pub star: bool,
}

pub type Collection = BTreeMap<ContactKey, Contact>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot is a {found}, expected an object, an array or null")]
    NotACollection { found: &'static str },
}

/// Decodes the value delivered by the contacts subscription.
///
/// `null` means the store holds no records and decodes to `None`. Children
/// with integer keys arrive as an array, so array indices become record keys
/// and the holes the database leaves for missing indices are skipped. Records
/// whose key or body cannot be decoded are skipped so one bad entry does not
/// hide the rest of the collection.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Option<Collection>, SnapshotError> {
    let entries: Vec<(String, serde_json::Value)> = match serde_json::from_slice(bytes)? {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(map) => map.into_iter().collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        serde_json::Value::Bool(_) => return Err(SnapshotError::NotACollection { found: "bool" }),
        serde_json::Value::Number(_) => {
            return Err(SnapshotError::NotACollection { found: "number" })
        }
        serde_json::Value::String(_) => {
            return Err(SnapshotError::NotACollection { found: "string" })
        }
    };

    let mut collection = Collection::new();
    for (key, value) in entries {
        let key = match ContactKey::new(key.as_str()) {
            Ok(key) => key,
            Err(e) => {
                warn!(key = %key, error = %e, "skipping record with invalid key");
                continue;
            }
        };

        match serde_json::from_value::<Contact>(value) {
            Ok(contact) => {
                collection.insert(key, contact);
            }
            Err(e) => warn!(key = %key, error = %e, "skipping undecodable record"),
        }
    }

    Ok(Some(collection))
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ClientConfig,
    pub route: Route,
    pub store: ContactStore,
    pub form: Option<ContactForm>,
    pub subscription: Option<SubscriptionId>,
    pub toasts: VecDeque<ToastMessage>,
}

impl Model {
    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.enqueue_toast(ToastMessage::new(message, kind));
    }

    pub fn report(&mut self, error: &AppError) {
        warn!(
            code = error.code(),
            message = %error.message,
            internal = ?error.internal_message,
            "reporting error to user"
        );
        self.enqueue_toast(ToastMessage::from(error));
    }

    /// Repeats of the newest error collapse into it; past the limit the oldest toast is dropped.
    fn enqueue_toast(&mut self, toast: ToastMessage) {
        if toast.kind == ToastKind::Error && self.toasts.back() == Some(&toast) {
            debug!(message = %toast.message, "collapsing repeated error toast");
            return;
        }

        if self.toasts.len() >= MAX_QUEUED_TOASTS {
            if let Some(dropped) = self.toasts.pop_front() {
                debug!(message = %dropped.message, "toast queue full, dropping oldest");
            }
        }

        self.toasts.push_back(toast);
    }

    #[must_use]
    pub fn active_toast(&self) -> Option<&ToastMessage> {
        self.toasts.front()
    }

    pub fn dismiss_toast(&mut self) {
        self.toasts.pop_front();
    }
}
