//! The dataset deserializer: buffer binding and the writing pass.
//!
//! ```text
//! Deserializer::new        resolve metadata, size every component
//!   buffer_descriptors()   caller allocates from the reported sizes
//!   set_buffer()           caller binds a subset of components
//!   parse()                write every bound row into its buffer
//! ```
//!
//! The writing pass re-walks `data` in the same order as the sizing pass and
//! writes rows contiguously per component, so a component's slot order is its
//! document order across all scenarios. Every record is first filled with
//! sentinels and then overwritten by the values the row provides, which makes
//! the result independent of what the caller's buffer held before.

use std::path::Path;

use anyhow::Context;
use pgm_core::{AttributeMeta, ComponentMeta, DatasetMeta, Idx, MetaData};
use serde_json::{Map, Value};
use tracing::debug;

use super::cell::decode_cell;
use super::error::{ErrorKind, ErrorPath, SerializationError, SerializationResult};
use super::metadata::{resolve_metadata, DatasetHeader, DATA_KEY};
use super::sizing::size_data;
use super::walk::{self, Row};
use crate::buffer::BufferDescriptor;

/// A caller-owned destination bound to one component.
#[derive(Debug)]
struct Binding<'m, 'b> {
    component: &'m ComponentMeta,
    positional: Vec<&'m AttributeMeta>,
    variable: bool,
    data: &'b mut [u8],
    indptr: Option<&'b mut [Idx]>,
}

/// Deserializer for one dataset document.
///
/// `'m` is the lifetime of the attribute registry, `'b` the lifetime of the
/// bound buffers.
#[derive(Debug)]
pub struct Deserializer<'m, 'b> {
    header: DatasetHeader<'m>,
    data: Value,
    batch_size: usize,
    descriptors: Vec<BufferDescriptor<'m>>,
    bindings: Vec<Binding<'m, 'b>>,
}

impl<'m, 'b> Deserializer<'m, 'b> {
    /// Resolve the metadata of `document` and run the sizing pass.
    pub fn new(mut document: Value, meta: &'m MetaData) -> SerializationResult<Self> {
        let mut path = ErrorPath::new();
        let header = resolve_metadata(&document, meta, &mut path)?;

        path.push_key(DATA_KEY);
        let data = document
            .get_mut(DATA_KEY)
            .map(Value::take)
            .ok_or_else(|| path.error(ErrorKind::MissingField(DATA_KEY)))?;
        let sized = size_data(&data, &header, &mut path)?;
        path.pop();

        debug!(
            dataset = header.dataset.name(),
            is_batch = header.is_batch,
            batch_size = sized.batch_size,
            components = sized.descriptors.len(),
            "sized dataset"
        );

        Ok(Self {
            header,
            data,
            batch_size: sized.batch_size,
            descriptors: sized.descriptors,
            bindings: Vec::new(),
        })
    }

    /// Parse JSON text, then behave like [`Deserializer::new`].
    pub fn from_json(text: &str, meta: &'m MetaData) -> SerializationResult<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::new(document, meta)
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>, meta: &'m MetaData) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset file '{}'", path.display()))?;
        Self::from_json(&text, meta)
            .with_context(|| format!("deserializing dataset '{}'", path.display()))
    }

    pub fn version(&self) -> &str {
        &self.header.version
    }

    pub fn dataset(&self) -> &'m DatasetMeta {
        self.header.dataset
    }

    pub fn dataset_name(&self) -> &'m str {
        self.header.dataset.name()
    }

    pub fn is_batch(&self) -> bool {
        self.header.is_batch
    }

    /// Number of scenarios; 1 for a single dataset.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of components present in `data`.
    pub fn n_components(&self) -> usize {
        self.descriptors.len()
    }

    pub fn buffer_descriptor(&self, index: usize) -> Option<&BufferDescriptor<'m>> {
        self.descriptors.get(index)
    }

    pub fn buffer_descriptors(&self) -> &[BufferDescriptor<'m>] {
        &self.descriptors
    }

    pub fn find_buffer_descriptor(&self, component: &str) -> Option<&BufferDescriptor<'m>> {
        self.descriptors.iter().find(|d| d.name() == component)
    }

    /// Attribute order the document declared for `component`'s positional rows.
    pub fn declared_attributes(&self, component: &str) -> Option<&[&'m AttributeMeta]> {
        self.header.declared_attributes(component)
    }

    /// Bind a destination buffer (and optionally an offset index) to a
    /// component.
    ///
    /// `data` must hold at least `total_elements` records; `indptr`, when
    /// given, must have `batch_size + 1` entries. A component of the dataset
    /// that does not occur in `data` may be bound; nothing is written to it.
    pub fn set_buffer(
        &mut self,
        component: &str,
        data: &'b mut [u8],
        indptr: Option<&'b mut [Idx]>,
    ) -> SerializationResult<()> {
        let meta = self.header.dataset.component(component).ok_or_else(|| {
            SerializationError::unpositioned(ErrorKind::UnknownComponent(component.to_string()))
        })?;
        if self.bindings.iter().any(|b| b.component.name() == component) {
            return Err(SerializationError::unpositioned(
                ErrorKind::DuplicateBinding(component.to_string()),
            ));
        }

        let descriptor = self.find_buffer_descriptor(component);
        let total_elements = descriptor.map_or(0, |d| d.total_elements);
        let variable = descriptor.is_some_and(BufferDescriptor::needs_indptr);
        let required = total_elements * meta.size();
        if data.len() < required {
            return Err(SerializationError::unpositioned(ErrorKind::BufferSize {
                component: component.to_string(),
                required,
                actual: data.len(),
            }));
        }
        if let Some(indptr) = &indptr {
            if indptr.len() != self.batch_size + 1 {
                return Err(SerializationError::unpositioned(ErrorKind::IndptrSize {
                    component: component.to_string(),
                    expected: self.batch_size + 1,
                    actual: indptr.len(),
                }));
            }
        }

        debug!(
            component,
            total_elements,
            variable,
            with_indptr = indptr.is_some(),
            "bound buffer"
        );
        self.bindings.push(Binding {
            component: meta,
            positional: self.header.positional_attributes(meta),
            variable,
            data,
            indptr,
        });
        Ok(())
    }

    /// Run the writing pass over every bound component.
    ///
    /// The first violation aborts the pass and is returned with the position
    /// of the offending node.
    pub fn parse(&mut self) -> SerializationResult<()> {
        if let Some(binding) = self
            .bindings
            .iter()
            .find(|b| b.variable && b.indptr.is_none())
        {
            return Err(SerializationError::unpositioned(ErrorKind::MissingIndptr(
                binding.component.name().to_string(),
            )));
        }

        let mut pass = WritingPass {
            bindings: &mut self.bindings,
            cursors: Vec::new(),
            path: ErrorPath::new(),
        };
        pass.run(&self.data, self.header.is_batch)?;

        debug!(
            dataset = self.header.dataset.name(),
            batch_size = self.batch_size,
            components = self.bindings.len(),
            "parsed dataset"
        );
        Ok(())
    }
}

/// State of one writing pass: bound buffers, write cursors and the path.
struct WritingPass<'p, 'm, 'b> {
    bindings: &'p mut [Binding<'m, 'b>],
    cursors: Vec<usize>,
    path: ErrorPath,
}

impl WritingPass<'_, '_, '_> {
    fn run(&mut self, data: &Value, is_batch: bool) -> SerializationResult<()> {
        self.cursors = vec![0; self.bindings.len()];
        for binding in self.bindings.iter_mut() {
            if let Some(first) = binding.indptr.as_deref_mut().and_then(|p| p.first_mut()) {
                *first = 0;
            }
        }

        self.path.push_key(DATA_KEY);
        let scenarios = walk::scenarios(data, is_batch, &mut self.path)?;
        for (scenario_index, scenario) in scenarios.into_iter().enumerate() {
            if is_batch {
                self.path.push_index(scenario_index);
            }
            self.write_scenario(scenario)?;
            if is_batch {
                self.path.pop();
            }
            self.close_scenario(scenario_index);
        }
        self.path.pop();
        Ok(())
    }

    fn write_scenario(&mut self, scenario: &Map<String, Value>) -> SerializationResult<()> {
        for (name, entry) in scenario {
            let Some(slot) = self
                .bindings
                .iter()
                .position(|b| b.component.name() == name.as_str())
            else {
                continue;
            };
            self.path.push_key(name.as_str());
            let rows = walk::component_rows(entry, &self.path)?;
            for (row_index, row) in rows.iter().enumerate() {
                self.path.push_index(row_index);
                let cursor = self.cursors[slot];
                write_row(&mut self.bindings[slot], cursor, row, &mut self.path)?;
                self.cursors[slot] = cursor + 1;
                self.path.pop();
            }
            self.path.pop();
        }
        Ok(())
    }

    /// Record the cumulative row count after `scenario` in each offset index.
    fn close_scenario(&mut self, scenario: usize) {
        for (binding, cursor) in self.bindings.iter_mut().zip(&self.cursors) {
            if let Some(entry) = binding
                .indptr
                .as_deref_mut()
                .and_then(|p| p.get_mut(scenario + 1))
            {
                *entry = *cursor as Idx;
            }
        }
    }
}

/// Write one row into record `slot` of `binding`. `path` points at the row.
fn write_row(
    binding: &mut Binding<'_, '_>,
    slot: usize,
    row: &Value,
    path: &mut ErrorPath,
) -> SerializationResult<()> {
    let component = binding.component;
    let size = component.size();
    let record = &mut binding.data[slot * size..(slot + 1) * size];

    match walk::row(row, path)? {
        Row::Positional(cells) => {
            if cells.len() != binding.positional.len() {
                return Err(path.error(ErrorKind::RowLength {
                    expected: binding.positional.len(),
                    found: cells.len(),
                }));
            }
            component.set_na(record).map_err(|e| path.error(e.into()))?;
            for (position, (cell, attribute)) in cells.iter().zip(&binding.positional).enumerate() {
                path.push_index(position);
                write_cell(attribute, cell, record, path)?;
                path.pop();
            }
        }
        Row::Keyed(fields) => {
            component.set_na(record).map_err(|e| path.error(e.into()))?;
            for (key, cell) in fields {
                path.push_key(key.as_str());
                let attribute = component.attribute(key).ok_or_else(|| {
                    path.error(ErrorKind::UnknownAttribute {
                        component: component.name().to_string(),
                        attribute: key.clone(),
                    })
                })?;
                write_cell(attribute, cell, record, path)?;
                path.pop();
            }
        }
    }
    Ok(())
}

fn write_cell(
    attribute: &AttributeMeta,
    cell: &Value,
    record: &mut [u8],
    path: &mut ErrorPath,
) -> SerializationResult<()> {
    let value = decode_cell(attribute.ctype(), cell, path)?;
    attribute
        .write(record, &value)
        .map_err(|e| path.error(e.into()))
}
