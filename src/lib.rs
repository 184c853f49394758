//! Pluggable file storage over the Vercel Blob HTTP API.
//!
//! The [`storage::Storage`] trait is the contract a host application codes
//! against; [`backend::VercelStorage`] implements it on top of the
//! [`adapters::Blob`] client seam.

pub mod adapters;
pub mod backend;
pub mod error;
pub mod file;
pub mod model;
pub mod storage;
pub mod util;

pub use backend::VercelStorage;
pub use error::{StorageError, StorageResult};
pub use file::BlobFile;
pub use storage::Storage;
