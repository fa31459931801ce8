pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod storage;
pub mod store;
