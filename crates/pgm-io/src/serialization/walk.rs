//! Structural accessors shared by the sizing and writing passes.
//!
//! Both passes visit the payload in the same order and must reject the same
//! malformed nodes with the same positions, so the shape checks live here.
//! Callers push the segment of the node they hand in; these helpers only push
//! segments for children they inspect themselves.

use serde_json::{Map, Value};

use super::error::{ErrorKind, ErrorPath, SerializationError, SerializationResult};

/// Human-readable JSON kind of a node.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn wrong_kind(
    path: &ErrorPath,
    expected: &'static str,
    found: &Value,
) -> SerializationError {
    path.error(ErrorKind::WrongKind {
        expected,
        found: json_kind(found),
    })
}

/// Scenario maps of the `data` payload, in document order.
///
/// A single dataset is one implicit scenario (an object); a batch is an
/// array of objects. `path` must point at `data`.
pub(crate) fn scenarios<'d>(
    data: &'d Value,
    is_batch: bool,
    path: &mut ErrorPath,
) -> SerializationResult<Vec<&'d Map<String, Value>>> {
    if !is_batch {
        return data
            .as_object()
            .map(|scenario| vec![scenario])
            .ok_or_else(|| wrong_kind(path, "object", data));
    }
    let items = data
        .as_array()
        .ok_or_else(|| wrong_kind(path, "array", data))?;
    let mut maps = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        path.push_index(index);
        let scenario = item
            .as_object()
            .ok_or_else(|| wrong_kind(path, "object", item))?;
        path.pop();
        maps.push(scenario);
    }
    Ok(maps)
}

/// Rows of one component entry. `path` must point at the component.
pub(crate) fn component_rows<'d>(
    value: &'d Value,
    path: &ErrorPath,
) -> SerializationResult<&'d [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| wrong_kind(path, "array", value))
}

/// The two row encodings.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Row<'d> {
    /// Values in declared (or natural) attribute order
    Positional(&'d [Value]),
    /// Attribute name to value
    Keyed(&'d Map<String, Value>),
}

/// Classify a row. `path` must point at the row.
pub(crate) fn row<'d>(value: &'d Value, path: &ErrorPath) -> SerializationResult<Row<'d>> {
    match value {
        Value::Array(cells) => Ok(Row::Positional(cells)),
        Value::Object(fields) => Ok(Row::Keyed(fields)),
        other => Err(wrong_kind(path, "array or object", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_data_is_one_scenario() {
        let data = json!({"node": []});
        let mut path = ErrorPath::new();
        path.push_key("data");
        assert_eq!(scenarios(&data, false, &mut path).unwrap().len(), 1);
    }

    #[test]
    fn batch_item_must_be_object() {
        let data = json!([{}, [], {}]);
        let mut path = ErrorPath::new();
        path.push_key("data");
        let err = scenarios(&data, true, &mut path).unwrap_err();
        assert_eq!(err.position(), "data/1");
    }

    #[test]
    fn single_data_rejects_array() {
        let data = json!([{}]);
        let mut path = ErrorPath::new();
        path.push_key("data");
        let err = scenarios(&data, false, &mut path).unwrap_err();
        assert_eq!(err.position(), "data");
        assert!(err.to_string().contains("Expected object, found array"));
    }

    #[test]
    fn scalar_row_rejected() {
        let path: ErrorPath = ["data", "node", "2"].into_iter().collect();
        let err = row(&json!(5), &path).unwrap_err();
        assert_eq!(err.position(), "data/node/2");
    }

    #[test]
    fn component_entry_must_be_array() {
        let path: ErrorPath = ["data", "node"].into_iter().collect();
        assert!(component_rows(&json!({}), &path).is_err());
        assert_eq!(component_rows(&json!([[1], [2]]), &path).unwrap().len(), 2);
    }
}
