mod database;
mod storage;

pub use self::database::{
    validate_key_segment, Database, DatabaseError, DatabaseOperation, DatabaseOutput,
    DatabasePath, DatabaseResult, PathError,
};
pub use self::storage::{
    Storage, StorageError, StorageOperation, StoragePath, StorageResult, TaskState, UploadEvent,
    UploadProgress,
};

pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub database: Database<Event>,
    pub storage: Storage<Event>,
}
