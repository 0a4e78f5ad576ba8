use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::capabilities::{DatabaseResult, StorageResult};
use crate::config::ClientConfig;
use crate::form::FormField;
use crate::model::ContactKey;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(SubscriptionId);
typed_id!(UploadId);

/// Which user flow produced a contact write.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    Create,
    Update,
    Star,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Star => "star",
        })
    }
}

// --- Event enum: large capability results boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    SessionStarted(ClientConfig),
    SessionEnded,
    SnapshotReceived {
        subscription: SubscriptionId,
        result: Box<DatabaseResult>,
    },

    Navigate {
        path: String,
    },

    AddContactRequested,
    EditContactRequested {
        key: ContactKey,
    },
    ViewContactRequested {
        key: ContactKey,
    },
    ToggleStarRequested {
        key: ContactKey,
    },

    FieldEdited {
        field: FormField,
        value: String,
    },
    StarToggled,
    ImageSelected {
        file_name: String,
        content_type: Option<String>,
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    },
    UploadProgressed {
        upload: UploadId,
        result: Box<StorageResult>,
    },
    SubmitRequested,
    ContactWritten {
        key: ContactKey,
        kind: WriteKind,
        result: Box<DatabaseResult>,
    },

    DismissToast,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::SessionStarted(_) => "session_started",
            Self::SessionEnded => "session_ended",
            Self::SnapshotReceived { .. } => "snapshot_received",
            Self::Navigate { .. } => "navigate",
            Self::AddContactRequested => "add_contact_requested",
            Self::EditContactRequested { .. } => "edit_contact_requested",
            Self::ViewContactRequested { .. } => "view_contact_requested",
            Self::ToggleStarRequested { .. } => "toggle_star_requested",
            Self::FieldEdited { .. } => "field_edited",
            Self::StarToggled => "star_toggled",
            Self::ImageSelected { .. } => "image_selected",
            Self::UploadProgressed { .. } => "upload_progressed",
            Self::SubmitRequested => "submit_requested",
            Self::ContactWritten { .. } => "contact_written",
            Self::DismissToast => "dismiss_toast",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::Navigate { .. }
                | Self::AddContactRequested
                | Self::EditContactRequested { .. }
                | Self::ViewContactRequested { .. }
                | Self::ToggleStarRequested { .. }
                | Self::FieldEdited { .. }
                | Self::StarToggled
                | Self::ImageSelected { .. }
                | Self::SubmitRequested
                | Self::DismissToast
        )
    }
}
