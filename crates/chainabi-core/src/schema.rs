//! Schema-bound decoding: an ordered list of named fields bound to the
//! head/tail decoder, producing one `DecodedRow` per buffer.

use crate::decode::decode_region;
use crate::error::AbiError;
use crate::parser::parse;
use crate::reader::WordReader;
use crate::types::TypeNode;
use crate::value::DecodedRow;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One named field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeNode,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An ordered, immutable field list. Order is wire order.
///
/// Built once, then shared across any number of concurrent decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Build a schema from already-parsed fields.
    ///
    /// Field names must be unique; a collision is a `SchemaMismatch`.
    pub fn new(fields: Vec<Field>) -> Result<Self, AbiError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(AbiError::mismatch(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Parse `(name, descriptor)` pairs into a schema.
    ///
    /// ```
    /// use chainabi_core::Schema;
    ///
    /// let schema = Schema::parse(&[("a", "uint256"), ("b", "bytes")]).unwrap();
    /// assert_eq!(schema.len(), 2);
    /// ```
    pub fn parse<N, D>(pairs: &[(N, D)]) -> Result<Self, AbiError>
    where
        N: AsRef<str>,
        D: AsRef<str>,
    {
        let fields = pairs
            .iter()
            .map(|(name, descriptor)| Ok(Field::new(name.as_ref(), parse(descriptor.as_ref())?)))
            .collect::<Result<Vec<_>, AbiError>>()?;
        Self::new(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Canonical parameter list, e.g. `(uint256,bytes)`.
    pub fn canonical_params(&self) -> String {
        let types: Vec<String> = self.fields.iter().map(|f| f.ty.to_string()).collect();
        format!("({})", types.join(","))
    }

    /// Decode one buffer laid out as this schema's head/tail region.
    ///
    /// Either every field decodes or the whole call fails; there are no
    /// partial rows.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedRow, AbiError> {
        let reader = WordReader::new(data);
        let values = decode_region(&reader, self.fields.iter().map(|f| &f.ty), 0)?;
        Ok(DecodedRow::new(
            self.fields
                .iter()
                .map(|f| f.name.clone())
                .zip(values)
                .collect(),
        ))
    }
}

/// Serializes as an ordered `{ name: descriptor }` object.
impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.ty)?;
        }
        map.end()
    }
}
