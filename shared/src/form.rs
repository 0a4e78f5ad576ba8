//! Local state of the add/edit screen and the picture upload it drives.

use serde::{Deserialize, Serialize};

use crate::capabilities::{StorageError, StorageResult, TaskState, UploadEvent};
use crate::event::{UploadId, WriteKind};
use crate::model::{Collection, Contact, ContactKey};
use crate::picture::validate_download_url;
use crate::reducer::ContactState;
use crate::{AppError, ErrorKind};

/// Fixed when the form mounts and never re-derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(ContactKey),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    PhoneNumber,
    Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ActiveUpload {
    id: UploadId,
    transfer_notified: bool,
}

/// What one storage report did to the form.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadOutcome {
    /// The report belongs to an upload this form no longer tracks.
    Stale,
    InFlight { percent: f64, state: TaskState },
    Paused { percent: f64 },
    /// First report at 100%. Later ones come back as `Repeated`.
    Transferred,
    Repeated,
    PictureResolved { url: String, first_notice: bool },
    Canceled,
    Failed(AppError),
}

/// A contact write produced by submitting the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub key: ContactKey,
    pub contact: Contact,
    pub kind: WriteKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactForm {
    mode: FormMode,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub star: bool,
    pub picture: Option<String>,
    is_uploading: bool,
    upload: Option<ActiveUpload>,
}

impl ContactForm {
    #[must_use]
    pub fn mount(state: &ContactState) -> Self {
        match state.pending_edit() {
            Some((key, contact)) => Self {
                mode: FormMode::Update(key.clone()),
                name: contact.name.clone(),
                email: contact.email.clone(),
                phone_number: contact.phone_number.clone(),
                address: contact.address.clone(),
                star: contact.star,
                picture: contact.picture.clone(),
                is_uploading: false,
                upload: None,
            },
            None => Self {
                mode: FormMode::Create,
                name: String::new(),
                email: String::new(),
                phone_number: String::new(),
                address: String::new(),
                star: false,
                picture: None,
                is_uploading: false,
                upload: None,
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self.mode, FormMode::Update(_))
    }

    pub fn set_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::PhoneNumber => self.phone_number = value,
            FormField::Address => self.address = value,
        }
    }

    pub fn toggle_star(&mut self) {
        self.star = !self.star;
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    #[must_use]
    pub fn upload_id(&self) -> Option<&UploadId> {
        self.upload.as_ref().map(|u| &u.id)
    }

    /// Tracks a new upload and returns the one it replaces, which the caller cancels.
    pub fn begin_upload(&mut self, id: UploadId) -> Option<UploadId> {
        let replaced = self.upload.replace(ActiveUpload {
            id,
            transfer_notified: false,
        });
        self.is_uploading = false;
        replaced.map(|u| u.id)
    }

    /// Stops tracking the current upload, if any.
    pub fn take_upload(&mut self) -> Option<UploadId> {
        self.is_uploading = false;
        self.upload.take().map(|u| u.id)
    }

    pub fn apply_upload_event(&mut self, id: &UploadId, result: StorageResult) -> UploadOutcome {
        let Some(active) = self.upload.as_mut().filter(|u| &u.id == id) else {
            return UploadOutcome::Stale;
        };

        match result {
            Ok(UploadEvent::Progress(progress)) => match progress.state {
                TaskState::Error => self.fail(
                    AppError::new(ErrorKind::Upload, "upload reported an error state")
                        .with_context("upload", id.as_str()),
                ),
                TaskState::Canceled => {
                    self.take_upload();
                    UploadOutcome::Canceled
                }
                state => {
                    let percent = progress.percent();
                    self.is_uploading = true;

                    if progress.is_complete() {
                        self.is_uploading = false;
                        if active.transfer_notified {
                            return UploadOutcome::Repeated;
                        }
                        active.transfer_notified = true;
                        return UploadOutcome::Transferred;
                    }

                    if state == TaskState::Paused {
                        self.is_uploading = false;
                        return UploadOutcome::Paused { percent };
                    }

                    UploadOutcome::InFlight { percent, state }
                }
            },
            Ok(UploadEvent::Completed { download_url }) => {
                match validate_download_url(&download_url) {
                    Ok(url) => {
                        let first_notice = !active.transfer_notified;
                        let url = String::from(url);
                        self.picture = Some(url.clone());
                        self.take_upload();
                        UploadOutcome::PictureResolved { url, first_notice }
                    }
                    Err(e) => self.fail(
                        AppError::new(ErrorKind::Upload, "storage returned an unusable URL")
                            .with_internal(e.to_string()),
                    ),
                }
            }
            Err(StorageError::Canceled) => {
                self.take_upload();
                UploadOutcome::Canceled
            }
            Err(e) => self.fail(
                AppError::new(ErrorKind::Upload, e.to_string()).with_context("upload", id.as_str()),
            ),
        }
    }

    fn fail(&mut self, error: AppError) -> UploadOutcome {
        self.take_upload();
        UploadOutcome::Failed(error)
    }

    #[must_use]
    pub fn to_contact(&self) -> Contact {
        Contact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            picture: self.picture.clone(),
            star: self.star,
        }
    }

    /// Update mode writes back to its own key; create mode picks a key unused in `existing`.
    #[must_use]
    pub fn submission(&self, existing: &Collection) -> Submission {
        let (key, kind) = match &self.mode {
            FormMode::Update(key) => (key.clone(), WriteKind::Update),
            FormMode::Create => {
                let mut key = ContactKey::generate();
                while existing.contains_key(&key) {
                    key = ContactKey::generate();
                }
                (key, WriteKind::Create)
            }
        };

        Submission {
            key,
            contact: self.to_contact(),
            kind,
        }
    }
}
