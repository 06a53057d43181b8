pub mod db;
pub mod io;
pub mod storage;

pub use db::JustposDb;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
