//! Attribute registry: datasets, components and their record layouts.
//!
//! A [`MetaData`] registry holds one [`DatasetMeta`] per dataset type
//! (`input`, `update`, ...). Each dataset lists the [`ComponentMeta`]s it
//! accepts, and each component describes a fixed-size record made of
//! [`AttributeMeta`] slots laid out like a C struct.
//!
//! Lookups are linear scans: component and attribute sets are small and
//! declaration order is significant, so a `Vec` is both the storage and the
//! index.

use serde::Serialize;

use crate::ctype::{AttributeValue, CType};
use crate::error::{MetaDataError, MetaDataResult};

/// One attribute slot of a component record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeMeta {
    name: String,
    ctype: CType,
    offset: usize,
}

impl AttributeMeta {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ctype(&self) -> CType {
        self.ctype
    }

    /// Byte offset of the slot within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.ctype.size()
    }

    pub fn sentinel(&self) -> AttributeValue {
        self.ctype.sentinel()
    }

    fn slot<'r>(&self, record: &'r [u8]) -> MetaDataResult<&'r [u8]> {
        record
            .get(self.offset..self.offset + self.size())
            .ok_or_else(|| self.short_record(record.len()))
    }

    fn slot_mut<'r>(&self, record: &'r mut [u8]) -> MetaDataResult<&'r mut [u8]> {
        let len = record.len();
        record
            .get_mut(self.offset..self.offset + self.size())
            .ok_or_else(|| self.short_record(len))
    }

    fn short_record(&self, actual: usize) -> MetaDataError {
        MetaDataError::SlotOutOfRecord {
            attribute: self.name.clone(),
            required: self.offset + self.size(),
            actual,
        }
    }

    /// Read this attribute from a record.
    pub fn read(&self, record: &[u8]) -> MetaDataResult<AttributeValue> {
        Ok(self.ctype.decode(self.slot(record)?))
    }

    /// Write a value of the attribute's own type into a record.
    pub fn write(&self, record: &mut [u8], value: &AttributeValue) -> MetaDataResult<()> {
        if value.ctype() != self.ctype {
            return Err(MetaDataError::TypeMismatch {
                attribute: self.name.clone(),
                expected: self.ctype,
                actual: value.ctype(),
            });
        }
        value.encode(self.slot_mut(record)?);
        Ok(())
    }

    /// Write the sentinel of this attribute into a record.
    pub fn write_na(&self, record: &mut [u8]) -> MetaDataResult<()> {
        self.sentinel().encode(self.slot_mut(record)?);
        Ok(())
    }
}

/// Fixed layout of one component record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentMeta {
    name: String,
    attributes: Vec<AttributeMeta>,
    size: usize,
    alignment: usize,
}

impl ComponentMeta {
    /// Start a component layout.
    pub fn builder(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder {
            name: name.into(),
            attributes: Vec::new(),
            offset: 0,
            alignment: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record size in bytes, including trailing padding.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Attributes in their natural (declaration) order.
    pub fn attributes(&self) -> &[AttributeMeta] {
        &self.attributes
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeMeta> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_index(name).is_some()
    }

    fn check_record(&self, record: &[u8]) -> MetaDataResult<()> {
        if record.len() < self.size {
            return Err(MetaDataError::RecordSize {
                component: self.name.clone(),
                required: self.size,
                actual: record.len(),
            });
        }
        Ok(())
    }

    /// Fill every attribute of a record with its sentinel.
    ///
    /// Padding bytes are zeroed, so the record no longer depends on what the
    /// slice held before.
    pub fn set_na(&self, record: &mut [u8]) -> MetaDataResult<()> {
        self.check_record(record)?;
        record[..self.size].fill(0);
        for attribute in &self.attributes {
            attribute.write_na(record)?;
        }
        Ok(())
    }

    /// Read a named attribute from a record.
    pub fn read(&self, record: &[u8], attribute: &str) -> Option<AttributeValue> {
        self.attribute(attribute)?.read(record).ok()
    }
}

/// Builder computing C struct offsets as attributes are appended.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    name: String,
    attributes: Vec<AttributeMeta>,
    offset: usize,
    alignment: usize,
}

impl ComponentBuilder {
    /// Append an attribute at the next suitably aligned offset.
    pub fn attribute(mut self, name: impl Into<String>, ctype: CType) -> Self {
        let offset = align_up(self.offset, ctype.alignment());
        self.attributes.push(AttributeMeta {
            name: name.into(),
            ctype,
            offset,
        });
        self.offset = offset + ctype.size();
        self.alignment = self.alignment.max(ctype.alignment());
        self
    }

    /// Append several attributes of the same type.
    pub fn attributes(self, names: &[&str], ctype: CType) -> Self {
        names
            .iter()
            .fold(self, |builder, name| builder.attribute(*name, ctype))
    }

    pub fn build(self) -> MetaDataResult<ComponentMeta> {
        if self.attributes.is_empty() {
            return Err(MetaDataError::EmptyComponent(self.name));
        }
        for (i, attribute) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attribute.name) {
                return Err(MetaDataError::DuplicateAttribute {
                    component: self.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }
        Ok(ComponentMeta {
            size: align_up(self.offset, self.alignment),
            name: self.name,
            attributes: self.attributes,
            alignment: self.alignment,
        })
    }
}

fn align_up(offset: usize, alignment: usize) -> usize {
    offset.div_ceil(alignment) * alignment
}

/// Components accepted by one dataset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetMeta {
    name: String,
    components: Vec<ComponentMeta>,
}

impl DatasetMeta {
    pub fn new(name: impl Into<String>, components: Vec<ComponentMeta>) -> MetaDataResult<Self> {
        let name = name.into();
        for (i, component) in components.iter().enumerate() {
            if components[..i].iter().any(|c| c.name == component.name) {
                return Err(MetaDataError::DuplicateComponent {
                    dataset: name,
                    component: component.name.clone(),
                });
            }
        }
        Ok(Self { name, components })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[ComponentMeta] {
        &self.components
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.component(name).is_some()
    }

    pub fn component(&self, name: &str) -> Option<&ComponentMeta> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }
}

/// The complete registry of dataset types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaData {
    datasets: Vec<DatasetMeta>,
}

impl MetaData {
    pub fn new(datasets: Vec<DatasetMeta>) -> MetaDataResult<Self> {
        for (i, dataset) in datasets.iter().enumerate() {
            if datasets[..i].iter().any(|d| d.name == dataset.name) {
                return Err(MetaDataError::DuplicateDataset(dataset.name.clone()));
            }
        }
        Ok(Self { datasets })
    }

    pub fn datasets(&self) -> &[DatasetMeta] {
        &self.datasets
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetMeta> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Like [`MetaData::dataset`], but an unknown name is an error.
    pub fn get_dataset(&self, name: &str) -> MetaDataResult<&DatasetMeta> {
        self.dataset(name)
            .ok_or_else(|| MetaDataError::UnknownDataset(name.to_string()))
    }
}
