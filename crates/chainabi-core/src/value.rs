//! Decoded values.
//!
//! A `DecodedValue` tree mirrors the shape of the `TypeNode` it was decoded
//! with. Values own their data and hold no reference to the source buffer.

use alloy_primitives::{Address, I256, U256};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A decoded, typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Uint(U256),
    Int(I256),
    Bool(bool),
    Address(Address),
    /// `bytesN` / `function`: exactly N significant bytes.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Decimal(Decimal),
    /// Fixed or dynamic array.
    Array(Vec<DecodedValue>),
    /// Tuple components in declaration order.
    Tuple(Vec<(String, DecodedValue)>),
}

impl DecodedValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            DecodedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            DecodedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            DecodedValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Byte content of `FixedBytes` and `Bytes` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            DecodedValue::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a tuple component by name.
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            DecodedValue::Tuple(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Lowercase `0x`-prefixed hex, with no checksum casing.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Uint(v) => write!(f, "{v}"),
            DecodedValue::Int(v) => write!(f, "{v}"),
            DecodedValue::Bool(v) => write!(f, "{v}"),
            DecodedValue::Address(a) => write!(f, "{}", address_hex(a)),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            DecodedValue::String(s) => write!(f, "{s}"),
            DecodedValue::Decimal(d) => write!(f, "{d}"),
            DecodedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            DecodedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Big numbers and decimals serialize as exact decimal strings, byte values
/// and addresses as hex strings, tuples as ordered objects.
impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Uint(v) => serializer.collect_str(v),
            DecodedValue::Int(v) => serializer.collect_str(v),
            DecodedValue::Bool(v) => serializer.serialize_bool(*v),
            DecodedValue::Address(a) => serializer.serialize_str(&address_hex(a)),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(b)))
            }
            DecodedValue::String(s) => serializer.serialize_str(s),
            DecodedValue::Decimal(d) => serializer.collect_str(d),
            DecodedValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedValue::Tuple(fields) => serialize_fields(fields, serializer),
        }
    }
}

fn serialize_fields<S: Serializer>(
    fields: &[(String, DecodedValue)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

/// Exact fixed-point decimal: `(-1)^negative * magnitude / 10^scale`.
///
/// Arithmetic never goes through binary floating point; rendering is a
/// pure digit-string operation on the integer magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    magnitude: U256,
    scale: u8,
}

impl Decimal {
    pub fn new(negative: bool, magnitude: U256, scale: u8) -> Self {
        // -0 and 0 are the same value
        let negative = negative && !magnitude.is_zero();
        Self {
            negative,
            magnitude,
            scale,
        }
    }

    pub fn from_unsigned(raw: U256, scale: u8) -> Self {
        Self::new(false, raw, scale)
    }

    pub fn from_signed(raw: I256, scale: u8) -> Self {
        Self::new(raw.is_negative(), raw.unsigned_abs(), scale)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The unscaled integer magnitude.
    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.magnitude.to_string();
        let scale = self.scale as usize;
        let sign = if self.negative { "-" } else { "" };
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

/// A named row of decoded values in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedRow {
    fields: Vec<(String, DecodedValue)>,
}

impl DecodedRow {
    pub fn new(fields: Vec<(String, DecodedValue)>) -> Self {
        Self { fields }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn into_fields(self) -> Vec<(String, DecodedValue)> {
        self.fields
    }
}

impl Serialize for DecodedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fields(&self.fields, serializer)
    }
}
