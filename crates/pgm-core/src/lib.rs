//! # pgm-core: Power Grid Component Registry
//!
//! Describes the fixed memory layout of every power-grid component record and
//! the datasets those components appear in. The deserializer in `pgm-io`
//! resolves document fields against this registry and writes decoded values
//! straight into caller-owned record buffers.
//!
//! ## Design Philosophy
//!
//! Components are data, not types:
//! - A [`MetaData`] registry maps dataset names to [`DatasetMeta`]
//! - A dataset maps component names to [`ComponentMeta`] record layouts
//! - A layout is an ordered list of [`AttributeMeta`] slots, each with a
//!   closed storage type [`CType`] and a byte offset
//!
//! This keeps the component set open (new components are table entries)
//! while the set of value kinds stays closed and exhaustively matched.
//!
//! ## Quick Start
//!
//! ```rust
//! use pgm_core::{meta_data, AttributeValue};
//!
//! let node = meta_data()
//!     .dataset("input")
//!     .and_then(|d| d.component("node"))
//!     .expect("node is a built-in input component");
//!
//! let mut record = vec![0u8; node.size()];
//! node.set_na(&mut record)?;
//! node.attribute("u_rated")
//!     .expect("node has u_rated")
//!     .write(&mut record, &AttributeValue::Double(10.5e3))?;
//!
//! assert!(node.read(&record, "id").unwrap().is_na());
//! assert_eq!(node.read(&record, "u_rated").unwrap().as_f64(), Some(10.5e3));
//! # Ok::<(), pgm_core::MetaDataError>(())
//! ```
//!
//! ## Sentinels
//!
//! Every attribute has a "not available" value: `i32::MIN` / `i8::MIN` for
//! integers, NaN for reals (per phase for `double[3]`). Missing or `null`
//! document values are written as sentinels.
//!
//! ## Modules
//!
//! - [`ctype`] - Storage types, sentinels, decoded values
//! - [`meta_data`] - Registry structures and layout builder
//! - [`builtin`] - The built-in power-grid registry
//! - [`error`] - Registry errors

pub mod builtin;
pub mod ctype;
pub mod error;
pub mod meta_data;

pub use builtin::{build_meta_data, meta_data};
pub use ctype::{AttributeValue, CType, NA_DOUBLE, NA_INT32, NA_INT8};
pub use error::{MetaDataError, MetaDataResult};
pub use meta_data::{AttributeMeta, ComponentBuilder, ComponentMeta, DatasetMeta, MetaData};

/// Index type of offset-index buffers.
pub type Idx = i64;
