//! Buffer descriptors, read-only buffer views and owned buffer sets.
//!
//! The sizing pass reports a [`BufferDescriptor`] per component; the caller
//! allocates `data_size()` bytes (plus an offset index of `batch_size + 1`
//! entries when the count varies per scenario) and binds them. After parsing,
//! [`ComponentBuffer`] reads records back as [`AttributeValue`]s.

use std::ops::Range;

use pgm_core::{AttributeValue, ComponentMeta, Idx};
use serde::Serialize;

use crate::serialization::{Deserializer, SerializationResult};

/// Rows per scenario of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementsPerScenario {
    /// Every scenario has the same number of rows
    Uniform(usize),
    /// Row counts differ between scenarios; an offset index is required
    Variable,
}

impl ElementsPerScenario {
    /// C-style count: `-1` for [`ElementsPerScenario::Variable`].
    pub fn as_idx(self) -> Idx {
        match self {
            ElementsPerScenario::Uniform(n) => n as Idx,
            ElementsPerScenario::Variable => -1,
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, ElementsPerScenario::Variable)
    }
}

impl Serialize for ElementsPerScenario {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_idx())
    }
}

/// Buffer requirements of one component, as found by the sizing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferDescriptor<'m> {
    #[serde(serialize_with = "component_name")]
    pub component: &'m ComponentMeta,
    pub elements_per_scenario: ElementsPerScenario,
    pub total_elements: usize,
}

fn component_name<S: serde::Serializer>(
    component: &&ComponentMeta,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(component.name())
}

impl BufferDescriptor<'_> {
    pub fn name(&self) -> &str {
        self.component.name()
    }

    /// Bytes needed for the data buffer.
    pub fn data_size(&self) -> usize {
        self.total_elements * self.component.size()
    }

    /// Whether binding requires an offset index buffer.
    pub fn needs_indptr(&self) -> bool {
        self.elements_per_scenario.is_variable()
    }
}

/// Read-only view over a filled component buffer.
#[derive(Debug, Clone, Copy)]
pub struct ComponentBuffer<'a> {
    component: &'a ComponentMeta,
    data: &'a [u8],
}

impl<'a> ComponentBuffer<'a> {
    /// View `data` as records of `component`. Trailing bytes that do not
    /// form a whole record are ignored.
    pub fn new(component: &'a ComponentMeta, data: &'a [u8]) -> Self {
        Self { component, data }
    }

    pub fn component(&self) -> &'a ComponentMeta {
        self.component
    }

    /// Number of whole records in the buffer.
    pub fn len(&self) -> usize {
        self.data.len() / self.component.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes of record `index`.
    pub fn record(&self, index: usize) -> Option<&'a [u8]> {
        let size = self.component.size();
        self.data.get(index * size..(index + 1) * size)
    }

    /// Value of `attribute` in record `index`.
    pub fn get(&self, index: usize, attribute: &str) -> Option<AttributeValue> {
        self.component.read(self.record(index)?, attribute)
    }

    /// Every attribute of record `index`, in natural order.
    pub fn values(&self, index: usize) -> Option<Vec<(&'a str, AttributeValue)>> {
        let record = self.record(index)?;
        self.component
            .attributes()
            .iter()
            .map(|a| a.read(record).ok().map(|v| (a.name(), v)))
            .collect()
    }
}

/// Record range of `scenario` within a flat buffer, from its offset index.
pub fn scenario_range(indptr: &[Idx], scenario: usize) -> Option<Range<usize>> {
    let begin = usize::try_from(*indptr.get(scenario)?).ok()?;
    let end = usize::try_from(*indptr.get(scenario + 1)?).ok()?;
    (begin <= end).then_some(begin..end)
}

/// An owned data buffer and optional offset index for one component.
#[derive(Debug, Clone)]
pub struct OwnedBuffer<'m> {
    pub descriptor: BufferDescriptor<'m>,
    pub data: Vec<u8>,
    pub indptr: Option<Vec<Idx>>,
}

impl<'m> OwnedBuffer<'m> {
    pub fn view(&self) -> ComponentBuffer<'_> {
        ComponentBuffer::new(self.descriptor.component, &self.data)
    }

    /// Record range of `scenario`, for both uniform and variable components.
    pub fn scenario_range(&self, scenario: usize) -> Option<Range<usize>> {
        match (&self.indptr, self.descriptor.elements_per_scenario) {
            (Some(indptr), _) => scenario_range(indptr, scenario),
            (None, ElementsPerScenario::Uniform(n)) => {
                let range = scenario * n..(scenario + 1) * n;
                (range.end <= self.descriptor.total_elements).then_some(range)
            }
            (None, ElementsPerScenario::Variable) => None,
        }
    }
}

/// Correctly sized buffers for a selection of a deserializer's components.
///
/// Offset indices are allocated only for variable-size components.
#[derive(Debug, Clone, Default)]
pub struct OwnedBuffers<'m> {
    buffers: Vec<OwnedBuffer<'m>>,
}

impl<'m> OwnedBuffers<'m> {
    /// Allocate buffers for every discovered component, or only those named
    /// in `components` (names not present in the data are skipped).
    pub fn allocate(deserializer: &Deserializer<'m, '_>, components: Option<&[&str]>) -> Self {
        let batch_size = deserializer.batch_size();
        let buffers = deserializer
            .buffer_descriptors()
            .iter()
            .filter(|d| components.map_or(true, |names| names.contains(&d.name())))
            .map(|descriptor| OwnedBuffer {
                data: vec![0; descriptor.data_size()],
                indptr: descriptor
                    .needs_indptr()
                    .then(|| vec![0; batch_size + 1]),
                descriptor: descriptor.clone(),
            })
            .collect();
        Self { buffers }
    }

    /// Bind every buffer to `deserializer`.
    pub fn bind<'b>(&'b mut self, deserializer: &mut Deserializer<'m, 'b>) -> SerializationResult<()> {
        for buffer in &mut self.buffers {
            deserializer.set_buffer(
                buffer.descriptor.name(),
                &mut buffer.data,
                buffer.indptr.as_deref_mut(),
            )?;
        }
        Ok(())
    }

    pub fn get(&self, component: &str) -> Option<&OwnedBuffer<'m>> {
        self.buffers.iter().find(|b| b.descriptor.name() == component)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnedBuffer<'m>> {
        self.buffers.iter()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
