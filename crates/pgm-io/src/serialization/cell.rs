//! Decoding of a single cell into an attribute value.
//!
//! `null` always decodes to the attribute's sentinel. Otherwise the JSON kind
//! must be compatible with the storage type:
//!
//! | Storage     | Accepted                                           |
//! |-------------|----------------------------------------------------|
//! | `int32_t`   | integral number in range                           |
//! | `int8_t`    | integral number in range                           |
//! | `bool`      | `true`, `false`, `0`, `1`                          |
//! | `double`    | any number, `"inf"`, `"+inf"`, `"-inf"`            |
//! | `double[3]` | array of three `double` cells (each may be `null`) |

use pgm_core::{AttributeValue, CType, NA_DOUBLE};
use serde_json::{Number, Value};

use super::error::{ErrorKind, ErrorPath, SerializationError, SerializationResult};
use super::walk::json_kind;
use crate::helpers::{parse_infinity, safe_i64_to_i32, safe_i64_to_i8};

/// Decode `cell` for an attribute of type `ctype`. `path` must point at the cell.
pub(crate) fn decode_cell(
    ctype: CType,
    cell: &Value,
    path: &mut ErrorPath,
) -> SerializationResult<AttributeValue> {
    if cell.is_null() {
        return Ok(ctype.sentinel());
    }
    match ctype {
        CType::Int32 => {
            let value = integer(ctype, cell, path)?;
            safe_i64_to_i32(value)
                .map(AttributeValue::Int32)
                .ok_or_else(|| out_of_range(ctype, value, path))
        }
        CType::Int8 => {
            let value = integer(ctype, cell, path)?;
            safe_i64_to_i8(value)
                .map(AttributeValue::Int8)
                .ok_or_else(|| out_of_range(ctype, value, path))
        }
        CType::Bool => match cell {
            Value::Bool(flag) => Ok(AttributeValue::Bool(Some(*flag))),
            Value::Number(number) => match number.as_i64() {
                Some(0) => Ok(AttributeValue::Bool(Some(false))),
                Some(1) => Ok(AttributeValue::Bool(Some(true))),
                _ => Err(out_of_range(ctype, number, path)),
            },
            other => Err(cell_type(ctype, other, path)),
        },
        CType::Double => real(cell, path).map(AttributeValue::Double),
        CType::Double3 => {
            let phases = match cell {
                Value::Array(items) if items.len() == 3 => items,
                other => return Err(cell_type(ctype, other, path)),
            };
            let mut values = [NA_DOUBLE; 3];
            for (phase, (slot, item)) in values.iter_mut().zip(phases).enumerate() {
                if item.is_null() {
                    continue;
                }
                path.push_index(phase);
                *slot = real(item, path)?;
                path.pop();
            }
            Ok(AttributeValue::Double3(values))
        }
    }
}

fn integer(ctype: CType, cell: &Value, path: &ErrorPath) -> SerializationResult<i64> {
    match cell {
        Value::Number(number) => {
            number.as_i64().ok_or_else(|| not_integral(ctype, number, path))
        }
        other => Err(cell_type(ctype, other, path)),
    }
}

fn real(cell: &Value, path: &ErrorPath) -> SerializationResult<f64> {
    let value = match cell {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_infinity(text),
        _ => None,
    };
    value.ok_or_else(|| cell_type(CType::Double, cell, path))
}

fn cell_type(ctype: CType, cell: &Value, path: &ErrorPath) -> SerializationError {
    path.error(ErrorKind::CellType {
        ctype,
        found: json_kind(cell),
    })
}

fn not_integral(ctype: CType, number: &Number, path: &ErrorPath) -> SerializationError {
    if number.is_f64() {
        path.error(ErrorKind::CellType {
            ctype,
            found: "non-integral number",
        })
    } else {
        out_of_range(ctype, number, path)
    }
}

fn out_of_range(ctype: CType, value: impl ToString, path: &ErrorPath) -> SerializationError {
    path.error(ErrorKind::OutOfRange {
        value: value.to_string(),
        ctype,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(ctype: CType, cell: Value) -> SerializationResult<AttributeValue> {
        let mut path: ErrorPath = ["data", "node", "0", "0"].into_iter().collect();
        decode_cell(ctype, &cell, &mut path)
    }

    #[test]
    fn null_is_sentinel_for_every_type() {
        for ctype in [
            CType::Int32,
            CType::Int8,
            CType::Bool,
            CType::Double,
            CType::Double3,
        ] {
            assert!(decode(ctype, Value::Null).unwrap().is_na());
        }
    }

    #[test]
    fn boolean_for_int_is_cell_type_error() {
        let err = decode(CType::Int32, json!(true)).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::CellType {
                ctype: CType::Int32,
                found: "boolean"
            }
        );
        assert_eq!(err.position(), "data/node/0/0");
    }

    #[test]
    fn fractional_for_int_rejected() {
        let err = decode(CType::Int32, json!(1.5)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::CellType { .. }));
    }

    #[test]
    fn int8_out_of_range() {
        let err = decode(CType::Int8, json!(300)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfRange { .. }));
        assert_eq!(decode(CType::Int8, json!(-5)).unwrap(), AttributeValue::Int8(-5));
    }

    #[test]
    fn unsigned_beyond_i64_is_out_of_range() {
        let err = decode(CType::Int32, json!(u64::MAX)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfRange { .. }));
        assert_eq!(
            decode(CType::Double, json!(u64::MAX)).unwrap(),
            AttributeValue::Double(u64::MAX as f64)
        );
    }

    #[test]
    fn integer_number_is_a_valid_double() {
        assert_eq!(
            decode(CType::Double, json!(10500)).unwrap(),
            AttributeValue::Double(10500.0)
        );
    }

    #[test]
    fn infinity_strings_for_double() {
        assert_eq!(
            decode(CType::Double, json!("-inf")).unwrap(),
            AttributeValue::Double(f64::NEG_INFINITY)
        );
        assert!(decode(CType::Double, json!("abc")).is_err());
    }

    #[test]
    fn bool_accepts_flags_and_zero_one() {
        assert_eq!(
            decode(CType::Bool, json!(true)).unwrap(),
            AttributeValue::Bool(Some(true))
        );
        assert_eq!(
            decode(CType::Bool, json!(0)).unwrap(),
            AttributeValue::Bool(Some(false))
        );
        assert!(decode(CType::Bool, json!(2)).is_err());
        assert!(decode(CType::Bool, json!("true")).is_err());
    }

    #[test]
    fn per_phase_with_null_phase() {
        let value = decode(CType::Double3, json!([100.0, null, 200.0])).unwrap();
        let phases = value.as_f64x3().unwrap();
        assert_eq!(phases[0], 100.0);
        assert!(phases[1].is_nan());
        assert_eq!(phases[2], 200.0);
    }

    #[test]
    fn per_phase_rejects_scalar_and_wrong_length() {
        assert!(decode(CType::Double3, json!(1.0)).is_err());
        assert!(decode(CType::Double3, json!([1.0, 2.0])).is_err());
    }

    #[test]
    fn per_phase_error_addresses_the_phase() {
        let err = decode(CType::Double3, json!([1.0, 2.0, false])).unwrap_err();
        assert_eq!(err.position(), "data/node/0/0/2");
    }
}
