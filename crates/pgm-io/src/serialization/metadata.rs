//! Metadata resolution: the top-level fields of a dataset document.
//!
//! Fields are checked in a fixed order, each a precondition for the next:
//! `version`, `type`, `is_batch`, then the optional `attributes` map.

use pgm_core::{AttributeMeta, ComponentMeta, DatasetMeta, MetaData};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::{ErrorKind, ErrorPath, SerializationResult};
use super::walk::wrong_kind;

pub const VERSION_KEY: &str = "version";
pub const TYPE_KEY: &str = "type";
pub const IS_BATCH_KEY: &str = "is_batch";
pub const ATTRIBUTES_KEY: &str = "attributes";
pub const DATA_KEY: &str = "data";

/// Format versions this deserializer understands.
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Attribute order declared for positional rows of one component.
#[derive(Debug, Clone)]
pub struct DeclaredAttributes<'m> {
    pub component: &'m ComponentMeta,
    pub attributes: Vec<&'m AttributeMeta>,
}

/// Resolved top-level metadata of a document.
#[derive(Debug, Clone)]
pub struct DatasetHeader<'m> {
    pub version: String,
    pub dataset: &'m DatasetMeta,
    pub is_batch: bool,
    pub declared: Vec<DeclaredAttributes<'m>>,
}

impl<'m> DatasetHeader<'m> {
    /// Declared attribute order for a component, if the document gave one.
    pub fn declared_attributes(&self, component: &str) -> Option<&[&'m AttributeMeta]> {
        self.declared
            .iter()
            .find(|d| d.component.name() == component)
            .map(|d| d.attributes.as_slice())
    }

    /// Attributes addressed by positional rows of `component`: the declared
    /// order, or the registry's natural order when nothing was declared.
    ///
    /// Keyed rows never consult this; they resolve names against the full
    /// component schema.
    pub fn positional_attributes(&self, component: &'m ComponentMeta) -> Vec<&'m AttributeMeta> {
        match self.declared_attributes(component.name()) {
            Some(declared) => declared.to_vec(),
            None => component.attributes().iter().collect(),
        }
    }

    pub fn positional_len(&self, component: &ComponentMeta) -> usize {
        self.declared_attributes(component.name())
            .map_or(component.attribute_count(), <[_]>::len)
    }
}

/// Resolve the metadata fields of `root` against `meta`.
pub fn resolve_metadata<'m>(
    root: &Value,
    meta: &'m MetaData,
    path: &mut ErrorPath,
) -> SerializationResult<DatasetHeader<'m>> {
    let root = root
        .as_object()
        .ok_or_else(|| wrong_kind(path, "object", root))?;

    path.push_key(VERSION_KEY);
    let version = required_str(root, VERSION_KEY, path)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(path.error(ErrorKind::UnsupportedVersion(version.to_string())));
    }
    path.pop();

    path.push_key(TYPE_KEY);
    let dataset_name = required_str(root, TYPE_KEY, path)?;
    let dataset = meta
        .dataset(dataset_name)
        .ok_or_else(|| path.error(ErrorKind::UnknownDataset(dataset_name.to_string())))?;
    path.pop();

    path.push_key(IS_BATCH_KEY);
    let is_batch = match root.get(IS_BATCH_KEY) {
        Some(Value::Bool(flag)) => *flag,
        Some(other) => return Err(wrong_kind(path, "boolean", other)),
        None => return Err(path.error(ErrorKind::MissingField(IS_BATCH_KEY))),
    };
    path.pop();

    path.push_key(ATTRIBUTES_KEY);
    let declared = match root.get(ATTRIBUTES_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => resolve_declared(map, dataset, path)?,
        Some(other) => return Err(wrong_kind(path, "object", other)),
    };
    path.pop();

    debug!(
        version,
        dataset = dataset.name(),
        is_batch,
        declared = declared.len(),
        "resolved dataset metadata"
    );

    Ok(DatasetHeader {
        version: version.to_string(),
        dataset,
        is_batch,
        declared,
    })
}

fn required_str<'v>(
    root: &'v Map<String, Value>,
    key: &'static str,
    path: &ErrorPath,
) -> SerializationResult<&'v str> {
    match root.get(key) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(wrong_kind(path, "string", other)),
        None => Err(path.error(ErrorKind::MissingField(key))),
    }
}

fn resolve_declared<'m>(
    map: &Map<String, Value>,
    dataset: &'m DatasetMeta,
    path: &mut ErrorPath,
) -> SerializationResult<Vec<DeclaredAttributes<'m>>> {
    let mut declared = Vec::with_capacity(map.len());
    for (component_name, names) in map {
        path.push_key(component_name.as_str());
        let component = dataset
            .component(component_name)
            .ok_or_else(|| path.error(ErrorKind::UnknownComponent(component_name.clone())))?;
        let names = names
            .as_array()
            .ok_or_else(|| wrong_kind(path, "array", names))?;

        let mut attributes = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            path.push_index(index);
            let name = name
                .as_str()
                .ok_or_else(|| wrong_kind(path, "string", name))?;
            let attribute = component.attribute(name).ok_or_else(|| {
                path.error(ErrorKind::UnknownAttribute {
                    component: component_name.clone(),
                    attribute: name.to_string(),
                })
            })?;
            attributes.push(attribute);
            path.pop();
        }
        declared.push(DeclaredAttributes {
            component,
            attributes,
        });
        path.pop();
    }
    Ok(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgm_core::meta_data;
    use serde_json::json;

    fn resolve(root: Value) -> SerializationResult<DatasetHeader<'static>> {
        resolve_metadata(&root, meta_data(), &mut ErrorPath::new())
    }

    #[test]
    fn minimal_header() {
        let header = resolve(json!({"version": "1.0", "type": "update", "is_batch": true})).unwrap();
        assert_eq!(header.version, "1.0");
        assert_eq!(header.dataset.name(), "update");
        assert!(header.is_batch);
        assert!(header.declared.is_empty());
    }

    #[test]
    fn fields_checked_in_order() {
        // Both version and type are wrong; version is reported.
        let err = resolve(json!({"version": "2.0", "type": "nope"})).unwrap_err();
        assert_eq!(err.position(), "version");
        assert_eq!(err.kind(), &ErrorKind::UnsupportedVersion("2.0".into()));

        let err = resolve(json!({"version": "1.0", "type": 3})).unwrap_err();
        assert_eq!(err.position(), "type");
    }

    #[test]
    fn missing_is_batch() {
        let err = resolve(json!({"version": "1.0", "type": "input"})).unwrap_err();
        assert_eq!(err.position(), "is_batch");
        assert_eq!(err.kind(), &ErrorKind::MissingField("is_batch"));
    }

    #[test]
    fn root_must_be_object() {
        let err = resolve(json!([])).unwrap_err();
        assert!(err.path().is_empty());
    }

    #[test]
    fn declared_attributes_resolved_in_order() {
        let header = resolve(json!({
            "version": "1.0",
            "type": "input",
            "is_batch": false,
            "attributes": {"source": ["u_ref", "id"]}
        }))
        .unwrap();
        let declared = header.declared_attributes("source").unwrap();
        let names: Vec<_> = declared.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["u_ref", "id"]);
    }

    #[test]
    fn positional_falls_back_to_natural_order() {
        let header = resolve(json!({
            "version": "1.0",
            "type": "input",
            "is_batch": false,
            "attributes": {"node": ["id"]}
        }))
        .unwrap();
        let line = header.dataset.component("line").unwrap();
        assert_eq!(header.positional_len(line), line.attribute_count());
        let node = header.dataset.component("node").unwrap();
        assert_eq!(header.positional_len(node), 1);
        assert_eq!(header.positional_attributes(node)[0].name(), "id");
    }

    #[test]
    fn declared_attribute_entry_must_be_string() {
        let err = resolve(json!({
            "version": "1.0",
            "type": "input",
            "is_batch": false,
            "attributes": {"node": ["id", 7]}
        }))
        .unwrap_err();
        assert_eq!(err.position(), "attributes/node/1");
    }

    #[test]
    fn declared_list_must_be_array() {
        let err = resolve(json!({
            "version": "1.0",
            "type": "input",
            "is_batch": false,
            "attributes": {"node": "id"}
        }))
        .unwrap_err();
        assert_eq!(err.position(), "attributes/node");
    }
}
