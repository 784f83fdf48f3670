//! # pgm-io: Power Grid Dataset Deserialization
//!
//! Reads power-grid dataset documents (input, update and result datasets,
//! single or batch) into caller-owned fixed-layout record buffers described
//! by the [`pgm_core`] registry.
//!
//! ## Design Philosophy
//!
//! **Two passes, one walk order**: a sizing pass reports how many records
//! every component needs before any memory is touched; the writing pass then
//! fills exactly the buffers the caller bound, in the same document order.
//!
//! **Exact error positions**: every structural or value violation is reported
//! with the path of the offending node, e.g.
//! `Position of error: data/0/sym_load/1/p_specified`.
//!
//! **Caller owns memory**: buffers are plain `&mut [u8]` slices. The crate
//! never allocates record storage unless asked to via
//! [`buffer::OwnedBuffers`].
//!
//! ## Quick Start
//!
//! ```rust
//! use pgm_core::meta_data;
//! use pgm_io::Deserializer;
//!
//! let text = r#"{
//!     "version": "1.0",
//!     "type": "input",
//!     "is_batch": false,
//!     "attributes": {"node": ["id", "u_rated"]},
//!     "data": {"node": [[1, 10.5e3], [2, 10.5e3]]}
//! }"#;
//!
//! let mut deserializer = Deserializer::from_json(text, meta_data())?;
//! let node = deserializer.find_buffer_descriptor("node").unwrap().clone();
//! assert_eq!(node.total_elements, 2);
//!
//! let mut data = vec![0u8; node.data_size()];
//! deserializer.set_buffer("node", &mut data, None)?;
//! deserializer.parse()?;
//!
//! let view = pgm_io::ComponentBuffer::new(node.component, &data);
//! assert_eq!(view.get(1, "id").and_then(|v| v.as_i64()), Some(2));
//! # Ok::<(), pgm_io::SerializationError>(())
//! ```
//!
//! ## Document Shape
//!
//! | Field | Kind | Notes |
//! |-------|------|-------|
//! | `version` | string | Must be one of [`serialization::SUPPORTED_VERSIONS`] |
//! | `type` | string | Dataset name in the registry |
//! | `is_batch` | boolean | Selects object (`false`) or array of objects (`true`) for `data` |
//! | `attributes` | object | Optional; component to ordered attribute names for positional rows |
//! | `data` | object / array | Component to rows; rows are arrays (positional) or objects (keyed) |
//!
//! ## Modules
//!
//! - [`serialization`] - Metadata resolution, sizing, writing, errors
//! - [`buffer`] - Buffer descriptors, record views, owned buffer sets
//! - [`helpers`] - Numeric conversion helpers

pub mod buffer;
pub mod helpers;
pub mod serialization;

pub use buffer::{
    scenario_range, BufferDescriptor, ComponentBuffer, ElementsPerScenario, OwnedBuffer,
    OwnedBuffers,
};
pub use serialization::{Deserializer, ErrorKind, ErrorPath, SerializationError, SerializationResult};
