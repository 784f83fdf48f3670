//! Storage types of component attributes.
//!
//! Every attribute is stored in a fixed-size slot of a component record. The
//! closed set of storage types mirrors the C layout consumed by calculation
//! engines:
//!
//! | [`CType`]  | Size | Alignment | Sentinel ("not available") |
//! |------------|------|-----------|----------------------------|
//! | `Int32`    | 4    | 4         | `i32::MIN`                 |
//! | `Int8`     | 1    | 1         | `i8::MIN`                  |
//! | `Bool`     | 1    | 1         | `i8::MIN` as raw byte      |
//! | `Double`   | 8    | 8         | NaN                        |
//! | `Double3`  | 24   | 8         | NaN in every phase         |
//!
//! Values are encoded in native byte order.

use std::fmt;

use byteorder::{ByteOrder, NativeEndian};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Sentinel for 32-bit integer attributes (ids, node references).
pub const NA_INT32: i32 = i32::MIN;
/// Sentinel for 8-bit integer attributes (status, enums).
pub const NA_INT8: i8 = i8::MIN;
/// Sentinel for real attributes.
pub const NA_DOUBLE: f64 = f64::NAN;

/// Storage type of a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CType {
    Int32,
    Int8,
    Bool,
    Double,
    /// Per-phase real value (three phases)
    Double3,
}

impl CType {
    /// Number of bytes occupied in a record.
    pub const fn size(self) -> usize {
        match self {
            CType::Int32 => 4,
            CType::Int8 | CType::Bool => 1,
            CType::Double => 8,
            CType::Double3 => 24,
        }
    }

    /// Required alignment of the slot within a record.
    pub const fn alignment(self) -> usize {
        match self {
            CType::Int32 => 4,
            CType::Int8 | CType::Bool => 1,
            CType::Double | CType::Double3 => 8,
        }
    }

    /// C spelling of the type, used in messages and schema listings.
    pub const fn as_str(self) -> &'static str {
        match self {
            CType::Int32 => "int32_t",
            CType::Int8 => "int8_t",
            CType::Bool => "bool",
            CType::Double => "double",
            CType::Double3 => "double[3]",
        }
    }

    pub const fn is_per_phase(self) -> bool {
        matches!(self, CType::Double3)
    }

    /// The "not available" value of this type.
    pub fn sentinel(self) -> AttributeValue {
        match self {
            CType::Int32 => AttributeValue::Int32(NA_INT32),
            CType::Int8 => AttributeValue::Int8(NA_INT8),
            CType::Bool => AttributeValue::Bool(None),
            CType::Double => AttributeValue::Double(NA_DOUBLE),
            CType::Double3 => AttributeValue::Double3([NA_DOUBLE; 3]),
        }
    }

    /// Decode a value of this type from the start of `bytes`.
    ///
    /// `bytes` must hold at least [`CType::size`] bytes.
    pub(crate) fn decode(self, bytes: &[u8]) -> AttributeValue {
        match self {
            CType::Int32 => AttributeValue::Int32(NativeEndian::read_i32(bytes)),
            CType::Int8 => AttributeValue::Int8(bytes[0] as i8),
            CType::Bool => AttributeValue::Bool(match bytes[0] as i8 {
                NA_INT8 => None,
                0 => Some(false),
                _ => Some(true),
            }),
            CType::Double => AttributeValue::Double(NativeEndian::read_f64(bytes)),
            CType::Double3 => AttributeValue::Double3([
                NativeEndian::read_f64(&bytes[0..8]),
                NativeEndian::read_f64(&bytes[8..16]),
                NativeEndian::read_f64(&bytes[16..24]),
            ]),
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded attribute value.
///
/// Serializes sentinel values (and NaN phases) as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Int32(i32),
    Int8(i8),
    Bool(Option<bool>),
    Double(f64),
    Double3([f64; 3]),
}

impl AttributeValue {
    pub fn ctype(&self) -> CType {
        match self {
            AttributeValue::Int32(_) => CType::Int32,
            AttributeValue::Int8(_) => CType::Int8,
            AttributeValue::Bool(_) => CType::Bool,
            AttributeValue::Double(_) => CType::Double,
            AttributeValue::Double3(_) => CType::Double3,
        }
    }

    /// True if the value is the sentinel of its type.
    ///
    /// A per-phase value is only "not available" when all three phases are.
    pub fn is_na(&self) -> bool {
        match self {
            AttributeValue::Int32(v) => *v == NA_INT32,
            AttributeValue::Int8(v) => *v == NA_INT8,
            AttributeValue::Bool(v) => v.is_none(),
            AttributeValue::Double(v) => v.is_nan(),
            AttributeValue::Double3(v) => v.iter().all(|x| x.is_nan()),
        }
    }

    /// Integer view of `Int32`/`Int8` values, `None` for sentinels.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int32(v) if *v != NA_INT32 => Some(i64::from(*v)),
            AttributeValue::Int8(v) if *v != NA_INT8 => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Real view of `Double` values (NaN included).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64x3(&self) -> Option<[f64; 3]> {
        match self {
            AttributeValue::Double3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => *v,
            _ => None,
        }
    }

    /// Encode into the start of `bytes`, which must hold the value's size.
    pub(crate) fn encode(&self, bytes: &mut [u8]) {
        match self {
            AttributeValue::Int32(v) => NativeEndian::write_i32(bytes, *v),
            AttributeValue::Int8(v) => bytes[0] = *v as u8,
            AttributeValue::Bool(v) => {
                bytes[0] = match v {
                    None => NA_INT8 as u8,
                    Some(false) => 0,
                    Some(true) => 1,
                }
            }
            AttributeValue::Double(v) => NativeEndian::write_f64(bytes, *v),
            AttributeValue::Double3(v) => {
                for (chunk, phase) in bytes.chunks_exact_mut(8).zip(v) {
                    NativeEndian::write_f64(chunk, *phase);
                }
            }
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_na() {
            return serializer.serialize_none();
        }
        match self {
            AttributeValue::Int32(v) => serializer.serialize_i32(*v),
            AttributeValue::Int8(v) => serializer.serialize_i8(*v),
            AttributeValue::Bool(v) => v.serialize(serializer),
            AttributeValue::Double(v) => serializer.serialize_f64(*v),
            AttributeValue::Double3(v) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                for phase in v {
                    if phase.is_nan() {
                        seq.serialize_element(&Option::<f64>::None)?;
                    } else {
                        seq.serialize_element(phase)?;
                    }
                }
                seq.end()
            }
        }
    }
}
