//! Storage module
//!
//! Provides the string-keyed persistent map, the typed collection
//! repository built on it, and file storage for attachment bytes.

pub mod collections;
pub mod files;
pub mod kv;

pub use collections::Collection;
pub use files::{AttachmentFileStore, StoredFile};
pub use kv::KvStore;
