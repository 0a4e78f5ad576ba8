use serde::{Deserialize, Serialize};

use crate::form::ContactForm;
use crate::list::ListView;
use crate::model::Contact;
use crate::{ToastKind, ToastMessage};

pub const ADD_LABEL: &str = "Add Contact";
pub const UPDATE_LABEL: &str = "Update Contact";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FormView {
    pub is_update: bool,
    pub submit_label: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub star: bool,
    pub picture: Option<String>,
    pub is_uploading: bool,
}

impl From<&ContactForm> for FormView {
    fn from(form: &ContactForm) -> Self {
        let is_update = form.is_update();
        Self {
            is_update,
            submit_label: if is_update { UPDATE_LABEL } else { ADD_LABEL }.to_string(),
            name: form.name.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone(),
            address: form.address.clone(),
            star: form.star,
            picture: form.picture.clone(),
            is_uploading: form.is_uploading(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Screen {
    ContactList(ListView),
    ContactForm(FormView),
    ContactDetail { contact: Option<Contact> },
    NotFound { path: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub path: String,
    pub screen: Screen,
    pub toast: Option<ToastView>,
    pub pending_toasts: usize,
}
