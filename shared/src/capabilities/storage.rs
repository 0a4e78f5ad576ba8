use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::database::{check_segment, PathError};
use crate::event::UploadId;
use crate::UPLOAD_COMPLETE_PERCENT;

/// Object names may carry extensions, so `.` is allowed here.
pub const FORBIDDEN_OBJECT_CHARS: &[char] = &['#', '[', ']', '*', '?', '/', '\\'];

/// `prefix/name` location of an object in the bucket, e.g. `images/me.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoragePath {
    prefix: String,
    name: String,
}

impl StoragePath {
    pub fn new(prefix: &str, name: &str) -> Result<Self, PathError> {
        let prefix = prefix.trim_matches('/');
        for segment in prefix.split('/') {
            check_segment(segment, FORBIDDEN_OBJECT_CHARS)?;
        }
        check_segment(name, FORBIDDEN_OBJECT_CHARS)?;

        Ok(Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOperation {
    Upload {
        id: UploadId,
        path: StoragePath,
        content_type: String,
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    },
    Cancel {
        id: UploadId,
    },
}

impl Operation for StorageOperation {
    type Output = StorageResult;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Paused,
    Running,
    Success,
    Canceled,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub state: TaskState,
}

impl UploadProgress {
    /// Share of the transfer done, in `[0, 100]`. An empty transfer reports 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let ratio = self.bytes_transferred as f64 / self.total_bytes as f64;
        (ratio * UPLOAD_COMPLETE_PERCENT).clamp(0.0, UPLOAD_COMPLETE_PERCENT)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_bytes > 0 && self.bytes_transferred >= self.total_bytes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(UploadProgress),
    Completed { download_url: String },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageError {
    #[error("not authorized to write '{path}'")]
    Unauthorized { path: String },

    #[error("upload canceled")]
    Canceled,

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("upload failed: {message}")]
    Transfer { message: String },
}

pub type StorageResult = Result<UploadEvent, StorageError>;

#[derive(Capability)]
pub struct Storage<Ev> {
    context: CapabilityContext<StorageOperation, Ev>,
}

impl<Ev> Storage<Ev> {
    pub fn new(context: CapabilityContext<StorageOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Storage<Ev>
where
    Ev: Send + 'static,
{
    /// Progress reports, the final URL and any error all arrive through `make_event`.
    pub fn upload<F>(
        &self,
        id: UploadId,
        path: StoragePath,
        content_type: String,
        data: Vec<u8>,
        make_event: F,
    ) where
        F: Fn(StorageResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let mut reports = context.stream_from_shell(StorageOperation::Upload {
                id,
                path,
                content_type,
                data,
            });
            while let Some(report) = reports.next().await {
                context.update_app(make_event(report));
            }
        });
    }

    pub fn cancel(&self, id: UploadId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(StorageOperation::Cancel { id }).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(bytes_transferred: u64, total_bytes: u64) -> UploadProgress {
        UploadProgress {
            bytes_transferred,
            total_bytes,
            state: TaskState::Running,
        }
    }

    #[test]
    fn test_percent() {
        assert!((progress(50, 200).percent() - 25.0).abs() < f64::EPSILON);
        assert!((progress(200, 200).percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_is_clamped() {
        assert!((progress(300, 200).percent() - 100.0).abs() < f64::EPSILON);
        assert!(progress(0, 0).percent().abs() < f64::EPSILON);
    }

    #[test]
    fn test_complete_requires_bytes() {
        assert!(progress(10, 10).is_complete());
        assert!(!progress(9, 10).is_complete());
        assert!(!progress(0, 0).is_complete());
    }

    #[test]
    fn test_storage_path() {
        let path = StoragePath::new("images", "me.png").unwrap();
        assert_eq!(path.to_string(), "images/me.png");
        assert_eq!(path.name(), "me.png");

        let nested = StoragePath::new("/users/avatars/", "me.png").unwrap();
        assert_eq!(nested.to_string(), "users/avatars/me.png");
    }

    #[test]
    fn test_storage_path_rejects_bad_names() {
        assert!(StoragePath::new("images", "..").is_err());
        assert!(StoragePath::new("images", "a/b.png").is_err());
        assert!(StoragePath::new("images", "").is_err());
        assert!(StoragePath::new("", "me.png").is_err());
    }

    #[test]
    fn test_task_state_wire_names() {
        let json = serde_json::to_string(&TaskState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }
}
