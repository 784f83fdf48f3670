//! Dataset deserialization.
//!
//! - [`metadata`] - Top-level field resolution (`version`, `type`, `is_batch`, `attributes`)
//! - [`sizing`] - Row counting per component and scenario
//! - [`deserializer`] - Buffer binding and the writing pass
//! - [`error`] - Errors with document positions

mod cell;
mod walk;

pub mod deserializer;
pub mod error;
pub mod metadata;
pub mod sizing;

pub use deserializer::Deserializer;
pub use error::{ErrorKind, ErrorPath, PathSegment, SerializationError, SerializationResult};
pub use metadata::{
    resolve_metadata, DatasetHeader, DeclaredAttributes, ATTRIBUTES_KEY, DATA_KEY, IS_BATCH_KEY,
    SUPPORTED_VERSIONS, TYPE_KEY, VERSION_KEY,
};
pub use sizing::{size_data, DatasetSize};
