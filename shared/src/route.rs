use serde::{Deserialize, Serialize};

pub const LIST_PATH: &str = "/";
pub const FORM_PATH: &str = "/contact/add";
pub const DETAIL_PATH: &str = "/contact/view";

/// Client-side screen selected by the current path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    #[default]
    ContactList,
    ContactForm,
    ContactDetail,
    NotFound { path: String },
}

impl Route {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => LIST_PATH,
            rest => rest,
        };

        match normalized {
            LIST_PATH => Self::ContactList,
            FORM_PATH => Self::ContactForm,
            DETAIL_PATH => Self::ContactDetail,
            _ => Self::NotFound {
                path: path.to_string(),
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::ContactList => LIST_PATH,
            Self::ContactForm => FORM_PATH,
            Self::ContactDetail => DETAIL_PATH,
            Self::NotFound { path } => path,
        }
    }
}
