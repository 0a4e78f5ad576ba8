use serde::{Deserialize, Serialize};

use crate::model::{Contact, ContactKey};
use crate::reducer::{Action, ContactStore};
use crate::route::Route;
use crate::{AppError, ErrorKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub key: ContactKey,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub picture: Option<String>,
    pub star: bool,
}

impl ContactRow {
    fn new(key: &ContactKey, contact: &Contact) -> Self {
        Self {
            key: key.clone(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            address: contact.address.clone(),
            picture: contact.picture.clone(),
            star: contact.star,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListView {
    Loading,
    Empty,
    Rows(Vec<ContactRow>),
}

/// What a list affordance asks for: one reducer action, then a route change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    pub action: Action,
    pub route: Route,
}

pub struct ListController<'a> {
    store: &'a ContactStore,
}

impl<'a> ListController<'a> {
    #[must_use]
    pub fn new(store: &'a ContactStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn view(&self) -> ListView {
        let state = self.store.state();

        if state.is_loading {
            return ListView::Loading;
        }

        if state.contacts.is_empty() {
            return ListView::Empty;
        }

        ListView::Rows(
            state
                .contacts
                .iter()
                .map(|(key, contact)| ContactRow::new(key, contact))
                .collect(),
        )
    }

    /// Clears any stale edit target before the form opens.
    #[must_use]
    pub fn add_new(&self) -> Intent {
        Intent {
            action: Action::clear_pending_edit(),
            route: Route::ContactForm,
        }
    }

    pub fn edit(&self, key: &ContactKey) -> Result<Intent, AppError> {
        let contact = self.lookup(key)?;
        Ok(Intent {
            action: Action::ContactToUpdate {
                payload: Some(contact.clone()),
                key: Some(key.clone()),
            },
            route: Route::ContactForm,
        })
    }

    pub fn view_contact(&self, key: &ContactKey) -> Result<Intent, AppError> {
        let contact = self.lookup(key)?;
        Ok(Intent {
            action: Action::SetSingleContact {
                payload: contact.clone(),
            },
            route: Route::ContactDetail,
        })
    }

    /// The whole record with its star flipped, ready to be written back.
    pub fn toggle_star(&self, key: &ContactKey) -> Result<(ContactKey, Contact), AppError> {
        let mut contact = self.lookup(key)?.clone();
        contact.star = !contact.star;
        Ok((key.clone(), contact))
    }

    fn lookup(&self, key: &ContactKey) -> Result<&'a Contact, AppError> {
        self.store.state().contacts.get(key).ok_or_else(|| {
            AppError::new(ErrorKind::NotFound, format!("no contact with key '{key}'"))
                .with_context("key", key.as_str())
        })
    }
}
