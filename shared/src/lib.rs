// lib.rs - Contact book core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod form;
pub mod list;
pub mod model;
pub mod picture;
pub mod reducer;
pub mod route;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::ClientConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::{Collection, Contact, ContactKey, Model};
pub use reducer::{reduce, Action, ContactState, ContactStore};
pub use route::Route;
pub use view::ViewModel;

pub const DEFAULT_CONTACTS_PATH: &str = "contacts";
pub const DEFAULT_IMAGES_PREFIX: &str = "images";
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const UPLOAD_COMPLETE_PERCENT: f64 = 100.0;
pub const MAX_QUEUED_TOASTS: usize = 5;

pub const SUBMIT_SUCCESS_MESSAGE: &str = "success";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Uploaded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Subscription,
    Write,
    Upload,
    InvalidImage,
    InvalidPath,
    NotFound,
    Configuration,
    Decode,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Subscription => "SUBSCRIPTION_ERROR",
            Self::Write => "WRITE_ERROR",
            Self::Upload => "UPLOAD_ERROR",
            Self::InvalidImage => "INVALID_IMAGE",
            Self::InvalidPath => "INVALID_PATH",
            Self::NotFound => "NOT_FOUND",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Decode => "DECODE_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{}: {message}", .kind.code())]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Subscription => {
                "Unable to load contacts. Changes will appear once the connection recovers.".into()
            }
            ErrorKind::Write => "Oppss.. the contact could not be saved.".into(),
            ErrorKind::Upload => "Something went wrong while uploading the picture.".into(),
            ErrorKind::InvalidImage => "Please pick a valid image file.".into(),
            ErrorKind::InvalidPath | ErrorKind::Decode => {
                "Something went wrong. Please try again.".into()
            }
            ErrorKind::NotFound => "That contact no longer exists.".into(),
            ErrorKind::Configuration => "The app is misconfigured.".into(),
        }
    }
}

impl From<capabilities::PathError> for AppError {
    fn from(e: capabilities::PathError) -> Self {
        AppError::new(ErrorKind::InvalidPath, e.to_string())
    }
}

impl From<picture::PictureError> for AppError {
    fn from(e: picture::PictureError) -> Self {
        AppError::new(ErrorKind::InvalidImage, e.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

impl From<model::SnapshotError> for AppError {
    fn from(e: model::SnapshotError) -> Self {
        AppError::new(ErrorKind::Decode, "Snapshot could not be decoded")
            .with_internal(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

impl From<&AppError> for ToastMessage {
    fn from(e: &AppError) -> Self {
        Self::new(e.user_facing_message(), ToastKind::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}
