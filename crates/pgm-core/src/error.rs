//! Error types for building and querying the attribute registry.
//!
//! Registry errors are programming or configuration mistakes (a component
//! declared twice, an attribute written with the wrong type). They are kept
//! separate from document errors, which carry a position in the input and
//! live in `pgm-io`.

use thiserror::Error;

use crate::ctype::CType;

/// Errors raised while constructing or using a [`MetaData`](crate::MetaData) registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaDataError {
    /// The same attribute name was declared twice for a component
    #[error("Duplicate attribute '{attribute}' in component '{component}'")]
    DuplicateAttribute { component: String, attribute: String },

    /// The same component name was declared twice for a dataset
    #[error("Duplicate component '{component}' in dataset '{dataset}'")]
    DuplicateComponent { dataset: String, component: String },

    /// The same dataset name was declared twice in a registry
    #[error("Duplicate dataset '{0}'")]
    DuplicateDataset(String),

    /// A component without attributes has no record layout
    #[error("Component '{0}' has no attributes")]
    EmptyComponent(String),

    /// Lookup of a dataset that the registry does not define
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    /// A value of one storage type was written to an attribute of another
    #[error("Attribute '{attribute}' stores {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: CType,
        actual: CType,
    },

    /// The record slice is shorter than the component layout
    #[error("Record of {actual} bytes is too short for component '{component}' ({required} bytes)")]
    RecordSize {
        component: String,
        required: usize,
        actual: usize,
    },

    /// The record slice ends before an attribute slot
    #[error("Record of {actual} bytes is too short for attribute '{attribute}' ({required} bytes)")]
    SlotOutOfRecord {
        attribute: String,
        required: usize,
        actual: usize,
    },
}

/// Convenience type alias for registry results.
pub type MetaDataResult<T> = Result<T, MetaDataError>;
