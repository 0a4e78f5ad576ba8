use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::event::SubscriptionId;

pub const MAX_SEGMENT_LENGTH: usize = 768;
pub const MAX_PATH_DEPTH: usize = 32;

/// Characters the realtime database refuses inside a key.
pub const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']', '/'];

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PathError {
    #[error("path segment cannot be empty")]
    Empty,

    #[error("path segment '{segment}' exceeds maximum length of {max} bytes")]
    TooLong { segment: String, max: usize },

    #[error("path segment '{segment}' contains forbidden character '{ch}'")]
    ForbiddenCharacter { segment: String, ch: char },

    #[error("path segment '{segment}' contains control characters")]
    ControlCharacter { segment: String },

    #[error("path segment '{segment}' is a traversal sequence")]
    Traversal { segment: String },

    #[error("path is deeper than {max} segments")]
    TooDeep { max: usize },
}

/// Checks a single database key. Shared by record keys and path segments.
pub fn validate_key_segment(segment: &str) -> Result<(), PathError> {
    check_segment(segment, FORBIDDEN_KEY_CHARS)
}

pub(crate) fn check_segment(segment: &str, forbidden: &[char]) -> Result<(), PathError> {
    if segment.trim().is_empty() {
        return Err(PathError::Empty);
    }

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(PathError::TooLong {
            segment: segment.chars().take(50).collect::<String>() + "...",
            max: MAX_SEGMENT_LENGTH,
        });
    }

    if segment == "." || segment == ".." {
        return Err(PathError::Traversal {
            segment: segment.to_string(),
        });
    }

    if segment.chars().any(char::is_control) {
        return Err(PathError::ControlCharacter {
            segment: segment.escape_default().to_string(),
        });
    }

    if let Some(ch) = segment.chars().find(|c| forbidden.contains(c)) {
        return Err(PathError::ForbiddenCharacter {
            segment: segment.to_string(),
            ch,
        });
    }

    Ok(())
}

/// Slash-separated location in the realtime database, e.g. `contacts/k1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabasePath {
    segments: Vec<String>,
}

impl DatabasePath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = path
            .trim_matches('/')
            .split('/')
            .map(str::to_string)
            .collect::<Vec<_>>();

        if segments.len() > MAX_PATH_DEPTH {
            return Err(PathError::TooDeep {
                max: MAX_PATH_DEPTH,
            });
        }

        for segment in &segments {
            validate_key_segment(segment)?;
        }

        Ok(Self { segments })
    }

    pub fn child(&self, segment: &str) -> Result<Self, PathError> {
        validate_key_segment(segment)?;

        if self.segments.len() >= MAX_PATH_DEPTH {
            return Err(PathError::TooDeep {
                max: MAX_PATH_DEPTH,
            });
        }

        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl TryFrom<String> for DatabasePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatabasePath> for String {
    fn from(path: DatabasePath) -> Self {
        path.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseOperation {
    /// Stream the full value at `path`, once now and again after every change.
    Subscribe { id: SubscriptionId, path: DatabasePath },
    /// Overwrite the whole record at `path` with the JSON in `value`.
    Set {
        path: DatabasePath,
        #[serde(with = "serde_bytes")]
        value: Vec<u8>,
    },
    Unsubscribe { id: SubscriptionId },
}

impl Operation for DatabaseOperation {
    type Output = DatabaseResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseOutput {
    /// JSON document found at the subscribed path; `null` when nothing is stored.
    Value(#[serde(with = "serde_bytes")] Vec<u8>),
    Written,
    Unsubscribed,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("permission denied at '{path}'")]
    PermissionDenied { path: String },

    #[error("disconnected from database: {message}")]
    Disconnected { message: String },

    #[error("write rejected: {message}")]
    Rejected { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("database error: {message}")]
    Other { message: String },
}

pub type DatabaseResult = Result<DatabaseOutput, DatabaseError>;

#[derive(Capability)]
pub struct Database<Ev> {
    context: CapabilityContext<DatabaseOperation, Ev>,
}

impl<Ev> Database<Ev> {
    pub fn new(context: CapabilityContext<DatabaseOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Database<Ev>
where
    Ev: Send + 'static,
{
    /// Every value the shell pushes on this subscription becomes an app event.
    pub fn subscribe<F>(&self, id: SubscriptionId, path: DatabasePath, make_event: F)
    where
        F: Fn(DatabaseResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let mut values = context.stream_from_shell(DatabaseOperation::Subscribe { id, path });
            while let Some(result) = values.next().await {
                context.update_app(make_event(result));
            }
        });
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(DatabaseOperation::Unsubscribe { id })
                .await;
        });
    }

    pub fn set<F>(&self, path: DatabasePath, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(DatabaseResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(DatabaseOperation::Set { path, value })
                .await;
            context.update_app(make_event(result));
        });
    }

    pub fn set_json<T, F>(
        &self,
        path: DatabasePath,
        value: &T,
        make_event: F,
    ) -> Result<(), DatabaseError>
    where
        T: Serialize,
        F: FnOnce(DatabaseResult) -> Ev + Send + 'static,
    {
        let data = serde_json::to_vec(value).map_err(|e| DatabaseError::Serialization {
            message: e.to_string(),
        })?;
        self.set(path, data, make_event);
        Ok(())
    }
}
