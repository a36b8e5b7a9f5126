//! DigiWallet Storage
//!
//! The key/value contract the engines persist through, plus two backends:
//! - `MemoryStore`: concurrent in-process map
//! - `FileStore`: the same map mirrored to a JSON-lines file
//!
//! Keys are plain strings. The store is prefix-agnostic; callers impose
//! their own conventions (`did:`, `vc:`, `vp:`, `privatekey:`).

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use backend::{open_store, StorageBackend, StorageConfig, DEFAULT_FILE_PATH};
pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{Store, StoreExt};
