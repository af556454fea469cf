//! Object storage abstraction for audio masters and transcoded assets.
//!
//! The pipeline reads incoming masters from one bucket and publishes
//! transcoded files to another. [`ObjectStore`] keeps that surface small
//! enough to back with the local filesystem in development and tests.

mod config;
mod error;
mod fs_store;
mod traits;
mod types;

pub use config::StoreConfig;
pub use error::StoreError;
pub use fs_store::FsObjectStore;
pub use traits::ObjectStore;
pub use types::PutResult;
