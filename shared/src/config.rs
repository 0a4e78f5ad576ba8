use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{DatabasePath, PathError, StoragePath};
use crate::{DEFAULT_CONTACTS_PATH, DEFAULT_IMAGES_PREFIX, MAX_IMAGE_BYTES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: {source}")]
    InvalidPath {
        field: &'static str,
        #[source]
        source: PathError,
    },

    #[error("max_image_bytes must be greater than zero")]
    ZeroImageLimit,
}

/// Backend locations and limits handed over by the shell at session start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub contacts_path: String,
    pub images_prefix: String,
    pub max_image_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contacts_path: DEFAULT_CONTACTS_PATH.to_string(),
            images_prefix: DEFAULT_IMAGES_PREFIX.to_string(),
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.contacts_path()?;

        // A placeholder file name checks the prefix segments on their own.
        StoragePath::new(&self.images_prefix, "placeholder.png").map_err(|source| {
            ConfigError::InvalidPath {
                field: "images_prefix",
                source,
            }
        })?;

        if self.max_image_bytes == 0 {
            return Err(ConfigError::ZeroImageLimit);
        }

        Ok(())
    }

    pub fn contacts_path(&self) -> Result<DatabasePath, ConfigError> {
        DatabasePath::parse(&self.contacts_path).map_err(|source| ConfigError::InvalidPath {
            field: "contacts_path",
            source,
        })
    }
}
