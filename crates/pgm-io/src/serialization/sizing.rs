//! Sizing pass: count rows per component and scenario without writing.
//!
//! Produces one [`BufferDescriptor`] per component mentioned anywhere in
//! `data`, in first-seen order. Besides component names and row shapes
//! (positional row length) no cell is inspected here.

use std::collections::HashMap;

use pgm_core::ComponentMeta;
use serde_json::Value;
use tracing::{debug, trace};

use super::error::{ErrorKind, ErrorPath, SerializationResult};
use super::metadata::DatasetHeader;
use super::walk::{self, Row};
use crate::buffer::{BufferDescriptor, ElementsPerScenario};

/// Result of the sizing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSize<'m> {
    pub batch_size: usize,
    pub descriptors: Vec<BufferDescriptor<'m>>,
}

/// Walk `data` and size every component buffer. `path` must point at `data`.
pub fn size_data<'m>(
    data: &Value,
    header: &DatasetHeader<'m>,
    path: &mut ErrorPath,
) -> SerializationResult<DatasetSize<'m>> {
    let scenarios = walk::scenarios(data, header.is_batch, path)?;
    let batch_size = scenarios.len();

    // first-seen order; rows per scenario
    let mut counts: Vec<(&'m ComponentMeta, Vec<usize>)> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for (scenario_index, scenario) in scenarios.into_iter().enumerate() {
        if header.is_batch {
            path.push_index(scenario_index);
        }
        for (name, entry) in scenario {
            path.push_key(name.as_str());
            let component = header
                .dataset
                .component(name)
                .ok_or_else(|| path.error(ErrorKind::UnknownComponent(name.clone())))?;
            let rows = walk::component_rows(entry, path)?;
            check_rows(rows, header.positional_len(component), path)?;

            let slot = *index_of.entry(component.name()).or_insert_with(|| {
                counts.push((component, vec![0; batch_size]));
                counts.len() - 1
            });
            counts[slot].1[scenario_index] = rows.len();
            trace!(
                component = component.name(),
                scenario = scenario_index,
                rows = rows.len(),
                "counted rows"
            );
            path.pop();
        }
        if header.is_batch {
            path.pop();
        }
    }

    let descriptors = counts
        .into_iter()
        .map(|(component, per_scenario)| {
            let descriptor = describe(component, &per_scenario);
            debug!(
                component = component.name(),
                elements_per_scenario = descriptor.elements_per_scenario.as_idx(),
                total_elements = descriptor.total_elements,
                "sized component buffer"
            );
            descriptor
        })
        .collect();

    Ok(DatasetSize {
        batch_size,
        descriptors,
    })
}

fn check_rows(
    rows: &[Value],
    positional_len: usize,
    path: &mut ErrorPath,
) -> SerializationResult<()> {
    for (index, value) in rows.iter().enumerate() {
        path.push_index(index);
        if let Row::Positional(cells) = walk::row(value, path)? {
            if cells.len() != positional_len {
                return Err(path.error(ErrorKind::RowLength {
                    expected: positional_len,
                    found: cells.len(),
                }));
            }
        }
        path.pop();
    }
    Ok(())
}

fn describe<'m>(component: &'m ComponentMeta, per_scenario: &[usize]) -> BufferDescriptor<'m> {
    let total_elements = per_scenario.iter().sum();
    let elements_per_scenario = match per_scenario.split_first() {
        Some((first, rest)) if rest.iter().any(|n| n != first) => ElementsPerScenario::Variable,
        Some((first, _)) => ElementsPerScenario::Uniform(*first),
        None => ElementsPerScenario::Uniform(0),
    };
    BufferDescriptor {
        component,
        elements_per_scenario,
        total_elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::metadata::resolve_metadata;
    use pgm_core::meta_data;
    use serde_json::json;

    fn size(document: Value) -> SerializationResult<DatasetSize<'static>> {
        let mut path = ErrorPath::new();
        let header = resolve_metadata(&document, meta_data(), &mut path)?;
        path.push_key("data");
        size_data(&document["data"], &header, &mut path)
    }

    #[test]
    fn sparse_batch_is_variable() {
        let sized = size(json!({
            "version": "1.0", "type": "update", "is_batch": true,
            "data": [
                {"sym_load": [{"id": 1}]},
                {},
                {"sym_load": [{"id": 1}, {"id": 2}]}
            ]
        }))
        .unwrap();
        assert_eq!(sized.batch_size, 3);
        let sym_load = &sized.descriptors[0];
        assert_eq!(sym_load.elements_per_scenario, ElementsPerScenario::Variable);
        assert_eq!(sym_load.elements_per_scenario.as_idx(), -1);
        assert_eq!(sym_load.total_elements, 3);
    }

    #[test]
    fn uniform_batch() {
        let sized = size(json!({
            "version": "1.0", "type": "update", "is_batch": true,
            "data": [{"shunt": [{"id": 1}]}, {"shunt": [{"id": 1}]}]
        }))
        .unwrap();
        assert_eq!(
            sized.descriptors[0].elements_per_scenario,
            ElementsPerScenario::Uniform(1)
        );
        assert_eq!(sized.descriptors[0].total_elements, 2);
    }

    #[test]
    fn components_in_first_seen_order() {
        let sized = size(json!({
            "version": "1.0", "type": "update", "is_batch": true,
            "data": [{"shunt": []}, {"source": [], "shunt": []}, {"line": []}]
        }))
        .unwrap();
        let names: Vec<_> = sized.descriptors.iter().map(|d| d.component.name()).collect();
        assert_eq!(names, ["shunt", "source", "line"]);
    }

    #[test]
    fn empty_batch_has_no_components() {
        let sized = size(json!({
            "version": "1.0", "type": "update", "is_batch": true, "data": []
        }))
        .unwrap();
        assert_eq!(sized.batch_size, 0);
        assert!(sized.descriptors.is_empty());
    }

    #[test]
    fn row_length_checked_while_sizing() {
        let err = size(json!({
            "version": "1.0", "type": "input", "is_batch": true,
            "attributes": {"node": ["id"]},
            "data": [{"node": [[1]]}, {"node": [[2], [3, 4]]}]
        }))
        .unwrap_err();
        assert_eq!(err.position(), "data/1/node/1");
        assert_eq!(
            err.kind(),
            &ErrorKind::RowLength {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn keyed_rows_not_validated_while_sizing() {
        let sized = size(json!({
            "version": "1.0", "type": "input", "is_batch": false,
            "data": {"node": [{"not_an_attribute": true}]}
        }))
        .unwrap();
        assert_eq!(sized.descriptors[0].total_elements, 1);
    }

    #[test]
    fn sizing_is_idempotent() {
        let document = json!({
            "version": "1.0", "type": "update", "is_batch": true,
            "data": [{"sym_load": [[1, 2.0, 3.0, 4]]}, {}]
        });
        assert_eq!(size(document.clone()).unwrap(), size(document).unwrap());
    }
}
