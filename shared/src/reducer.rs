//! View-state container and the pure transition function that drives it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Collection, Contact, ContactKey};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactState {
    /// Last snapshot received from the store, never merged.
    pub contacts: Collection,
    /// Detail-view slot, independent of `contacts`.
    pub contact: Option<Contact>,
    pub contact_to_update: Option<Contact>,
    pub contact_to_update_key: Option<ContactKey>,
    pub is_loading: bool,
}

impl ContactState {
    /// The staged edit, present only when both the record and its key are set.
    #[must_use]
    pub fn pending_edit(&self) -> Option<(&ContactKey, &Contact)> {
        match (&self.contact_to_update_key, &self.contact_to_update) {
            (Some(key), Some(contact)) => Some((key, contact)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetContact {
        payload: Option<Collection>,
    },
    SetLoading {
        payload: bool,
    },
    ContactToUpdate {
        payload: Option<Contact>,
        key: Option<ContactKey>,
    },
    SetSingleContact {
        payload: Contact,
    },
    #[serde(other)]
    Unrecognized,
}

impl Action {
    #[must_use]
    pub const fn clear_pending_edit() -> Self {
        Self::ContactToUpdate {
            payload: None,
            key: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetContact { .. } => "SET_CONTACT",
            Self::SetLoading { .. } => "SET_LOADING",
            Self::ContactToUpdate { .. } => "CONTACT_TO_UPDATE",
            Self::SetSingleContact { .. } => "SET_SINGLE_CONTACT",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

#[must_use]
pub fn reduce(state: ContactState, action: Action) -> ContactState {
    match action {
        Action::SetContact { payload } => ContactState {
            contacts: payload.unwrap_or_default(),
            ..state
        },
        Action::SetLoading { payload } => ContactState {
            is_loading: payload,
            ..state
        },
        Action::ContactToUpdate { payload, key } => ContactState {
            contact_to_update: payload,
            contact_to_update_key: key,
            ..state
        },
        Action::SetSingleContact { payload } => ContactState {
            contact: Some(payload),
            ..state
        },
        Action::Unrecognized => state,
    }
}

/// Owns the current [`ContactState`]; the only way to change it is `dispatch`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactStore {
    state: ContactState,
}

impl ContactStore {
    #[must_use]
    pub fn new(state: ContactState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &ContactState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.kind(), "dispatch");
        self.state = reduce(std::mem::take(&mut self.state), action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_contact() -> impl Strategy<Value = Contact> {
        (
            "[A-Za-z ]{0,12}",
            "[a-z]{1,6}@[a-z]{1,6}\\.com",
            "[0-9]{0,10}",
            "[A-Za-z0-9 ,]{0,24}",
            proptest::option::of("https://cdn\\.example\\.com/[a-z]{1,8}\\.png"),
            any::<bool>(),
        )
            .prop_map(|(name, email, phone_number, address, picture, star)| Contact {
                name,
                email,
                phone_number,
                address,
                picture,
                star,
            })
    }

    fn arb_key() -> impl Strategy<Value = ContactKey> {
        "[a-z0-9-]{1,16}".prop_map(|k| ContactKey::new(k).unwrap())
    }

    fn arb_collection() -> impl Strategy<Value = Collection> {
        proptest::collection::btree_map(arb_key(), arb_contact(), 0..5)
    }

    fn arb_state() -> impl Strategy<Value = ContactState> {
        (
            arb_collection(),
            proptest::option::of(arb_contact()),
            proptest::option::of(arb_contact()),
            proptest::option::of(arb_key()),
            any::<bool>(),
        )
            .prop_map(
                |(contacts, contact, contact_to_update, contact_to_update_key, is_loading)| {
                    ContactState {
                        contacts,
                        contact,
                        contact_to_update,
                        contact_to_update_key,
                        is_loading,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn unrecognized_action_is_identity(state in arb_state()) {
            prop_assert_eq!(reduce(state.clone(), Action::Unrecognized), state);
        }

        #[test]
        fn set_contact_replaces_instead_of_merging(state in arb_state(), next in arb_collection()) {
            let after = reduce(state.clone(), Action::SetContact { payload: Some(next.clone()) });
            prop_assert_eq!(&after.contacts, &next);
            prop_assert_eq!(after.is_loading, state.is_loading);
            prop_assert_eq!(after.contact_to_update, state.contact_to_update);
        }

        #[test]
        fn set_contact_null_empties_collection(state in arb_state()) {
            let after = reduce(state, Action::SetContact { payload: None });
            prop_assert!(after.contacts.is_empty());
        }

        #[test]
        fn clearing_pending_edit_always_clears_both(state in arb_state()) {
            let after = reduce(state, Action::clear_pending_edit());
            prop_assert!(after.contact_to_update.is_none());
            prop_assert!(after.contact_to_update_key.is_none());
            prop_assert!(after.pending_edit().is_none());
        }

        #[test]
        fn set_loading_is_idempotent(state in arb_state(), flag in any::<bool>()) {
            let once = reduce(state, Action::SetLoading { payload: flag });
            let twice = reduce(once.clone(), Action::SetLoading { payload: flag });
            prop_assert_eq!(twice.is_loading, flag);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn single_contact_leaves_collection_alone(state in arb_state(), contact in arb_contact()) {
            let action = Action::SetSingleContact { payload: contact.clone() };
            let after = reduce(state.clone(), action);
            prop_assert_eq!(after.contact, Some(contact));
            prop_assert_eq!(after.contacts, state.contacts);
        }
    }

    #[test]
    fn test_contact_to_update_sets_pending_edit() {
        let key = ContactKey::new("k1").unwrap();
        let contact = Contact {
            name: "A".into(),
            email: "a@x.com".into(),
            ..Contact::default()
        };

        let state = reduce(
            ContactState::default(),
            Action::ContactToUpdate {
                payload: Some(contact.clone()),
                key: Some(key.clone()),
            },
        );

        assert_eq!(state.pending_edit(), Some((&key, &contact)));
    }

    #[test]
    fn test_action_json_form() {
        let action: Action =
            serde_json::from_str(r#"{"type":"SET_LOADING","payload":true}"#).unwrap();
        assert_eq!(action, Action::SetLoading { payload: true });

        let action: Action =
            serde_json::from_str(r#"{"type":"SET_CONTACT","payload":null}"#).unwrap();
        assert_eq!(action, Action::SetContact { payload: None });

        let action: Action = serde_json::from_str(r#"{"type":"CONTACT_TO_UPDATE"}"#).unwrap();
        assert_eq!(action, Action::clear_pending_edit());
    }

    #[test]
    fn test_unknown_action_type_decodes_to_unrecognized() {
        let action: Action = serde_json::from_str(r#"{"type":"DELETE_CONTACT"}"#).unwrap();
        assert_eq!(action, Action::Unrecognized);

        let state = ContactState {
            is_loading: true,
            ..ContactState::default()
        };
        assert_eq!(reduce(state.clone(), action), state);
    }

    #[test]
    fn test_store_dispatch() {
        let mut store = ContactStore::default();
        store.dispatch(Action::SetLoading { payload: true });
        store.dispatch(Action::SetLoading { payload: true });
        assert!(store.state().is_loading);

        store.dispatch(Action::SetContact { payload: None });
        assert!(store.state().contacts.is_empty());
    }
}
