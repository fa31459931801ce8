mod kv;

pub use kv::{FileStorage, KeyValueStorage, MemoryStorage, default_store_dir};
