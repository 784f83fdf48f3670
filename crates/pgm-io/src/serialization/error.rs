//! Structured deserialization errors and the error-path accumulator.
//!
//! Every walk over a document carries an [`ErrorPath`]: a stack of node
//! identifiers pushed on the way down and popped on the way back up. When a
//! rule is violated the walk snapshots the stack into a
//! [`SerializationError`], so the reported position is exactly the node being
//! visited, independent of how deep the failure happened.
//!
//! ```
//! use pgm_io::serialization::{ErrorKind, ErrorPath};
//!
//! let mut path = ErrorPath::new();
//! path.push_key("data");
//! path.push_index(0);
//! path.push_key("node");
//! let err = path.error(ErrorKind::UnknownComponent("node".into()));
//! assert!(err.to_string().ends_with("Position of error: data/0/node"));
//! ```

use std::fmt;

use pgm_core::{CType, MetaDataError};
use thiserror::Error;

/// One step of a path into the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object key: field, component or attribute name
    Key(String),
    /// Array position: scenario, row, cell or phase index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Stack of [`PathSegment`]s tracking the node currently visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ErrorPath {
    segments: Vec<PathSegment>,
}

impl ErrorPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Snapshot the current position into an error.
    pub fn error(&self, kind: ErrorKind) -> SerializationError {
        SerializationError {
            kind,
            path: self.clone(),
        }
    }

    fn position_suffix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("\nPosition of error: {self}")
        }
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for ErrorPath {
    /// Build a path of keys; purely numeric keys become indices.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let segments = iter
            .into_iter()
            .map(|s| {
                let s = s.into();
                match s.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(s),
                }
            })
            .collect();
        Self { segments }
    }
}

/// What went wrong, independent of where.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// The document is not valid JSON
    #[error("Invalid JSON document: {0}")]
    Json(String),

    /// A required top-level field is absent
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// A node has the wrong JSON kind for its position
    #[error("Expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported format version '{0}'")]
    UnsupportedVersion(String),

    #[error("Unknown dataset type '{0}'")]
    UnknownDataset(String),

    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    #[error("Unknown attribute '{attribute}' for component '{component}'")]
    UnknownAttribute { component: String, attribute: String },

    /// A positional row does not match the attribute list in effect
    #[error("Row has {found} values, but {expected} attributes are expected")]
    RowLength { expected: usize, found: usize },

    /// A cell's JSON kind cannot be stored in the attribute's type
    #[error("Cannot convert {found} to {ctype}")]
    CellType { ctype: CType, found: &'static str },

    #[error("Value {value} is out of range for {ctype}")]
    OutOfRange { value: String, ctype: CType },

    /// A variable-size component was bound without an offset index
    #[error("Component '{0}' has a variable number of elements per scenario and needs an offset index buffer")]
    MissingIndptr(String),

    #[error("Buffer for component '{component}' holds {actual} bytes, {required} are required")]
    BufferSize {
        component: String,
        required: usize,
        actual: usize,
    },

    #[error("Offset index for component '{component}' has {actual} entries, {expected} are required")]
    IndptrSize {
        component: String,
        expected: usize,
        actual: usize,
    },

    #[error("Component '{0}' is already bound to a buffer")]
    DuplicateBinding(String),

    #[error(transparent)]
    Registry(#[from] MetaDataError),
}

/// A deserialization failure with the exact position of the offending node.
///
/// Displays as the error message followed by `Position of error: <path>`; the
/// position line is omitted for errors not tied to a document node (buffer
/// binding, JSON syntax).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}{}", .path.position_suffix())]
pub struct SerializationError {
    kind: ErrorKind,
    path: ErrorPath,
}

impl SerializationError {
    /// An error not attached to any document node.
    pub fn unpositioned(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: ErrorPath::new(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &ErrorPath {
        &self.path
    }

    /// The path joined with `/`, e.g. `data/0/node/0/id`.
    pub fn position(&self) -> String {
        self.path.to_string()
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::unpositioned(ErrorKind::Json(err.to_string()))
    }
}

/// Convenience type alias for deserialization results.
pub type SerializationResult<T> = Result<T, SerializationError>;
