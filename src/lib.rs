// taskdeck - three-stage task tracking over local key-value persistence

pub mod codec;
pub mod config;
pub mod error;
pub mod kv;
pub mod model;
pub mod store;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use kv::{FileKv, KvStore, MemoryKv, SqliteKv};
pub use model::{Completion, Task, TaskStatus};
pub use store::{STORE_KEY, TaskStore};
