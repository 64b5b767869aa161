//! Wayfarer Storage Library
//!
//! This crate provides the object-storage abstraction used for applicant
//! travel documents: the [`Storage`] trait plus S3 and local-filesystem
//! implementations.
//!
//! # Storage key format
//!
//! Keys are folder-scoped: `{folder}/{filename}`, where the folder names the
//! owning record (e.g. `bookings/{id}` or `dependants/{id}`). Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
pub use wayfarer_core::StorageBackend;
