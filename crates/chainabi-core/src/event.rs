//! Event log decoding.
//!
//! A log stores each indexed parameter as one 32-byte topic and every
//! non-indexed parameter in a single data buffer, which has the same layout
//! as a function's argument list. A non-anonymous event additionally
//! carries `keccak256(signature)` as its first topic.

use alloy_primitives::B256;

use crate::error::AbiError;
use crate::fingerprint::signature_hash;
use crate::scalar::decode_scalar;
use crate::schema::{Field, Schema};
use crate::types::TypeNode;
use crate::value::{DecodedRow, DecodedValue};

/// Topics available to indexed parameters, after topic0 if present.
const MAX_TOPICS: usize = 4;

/// One declared event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventField {
    pub name: String,
    pub ty: TypeNode,
    pub indexed: bool,
}

impl EventField {
    pub fn new(name: impl Into<String>, ty: TypeNode, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
        }
    }
}

/// A raw log record: the full topic list (topic0 included for
/// non-anonymous events) and the data buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLog {
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
}

impl RawLog {
    pub fn new(topics: Vec<B256>, data: Vec<u8>) -> Self {
        Self { topics, data }
    }
}

/// A validated event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchema {
    name: String,
    fields: Vec<EventField>,
    anonymous: bool,
    /// Non-indexed fields, in declared order.
    data: Schema,
    signature: String,
    topic0: B256,
}

impl EventSchema {
    /// Validate and build an event schema.
    ///
    /// Indexed parameters must be single-word scalars; anything else is
    /// `UnsupportedType`. Duplicate names and more indexed parameters than
    /// a log has topics for are `SchemaMismatch`.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<EventField>,
        anonymous: bool,
    ) -> Result<Self, AbiError> {
        let name = name.into();

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(AbiError::mismatch(format!(
                    "duplicate field name '{}' in event {name}",
                    field.name
                )));
            }
            if field.indexed && !field.ty.is_scalar() {
                return Err(AbiError::UnsupportedType {
                    field: field.name.clone(),
                    ty: format!("indexed {}", field.ty),
                });
            }
        }

        let indexed = fields.iter().filter(|f| f.indexed).count();
        let available = if anonymous { MAX_TOPICS } else { MAX_TOPICS - 1 };
        if indexed > available {
            return Err(AbiError::mismatch(format!(
                "event {name} declares {indexed} indexed fields, at most {available} fit in a log"
            )));
        }

        let data = Schema::new(
            fields
                .iter()
                .filter(|f| !f.indexed)
                .map(|f| Field::new(f.name.clone(), f.ty.clone()))
                .collect(),
        )?;

        let types: Vec<String> = fields.iter().map(|f| f.ty.to_string()).collect();
        let signature = format!("{name}({})", types.join(","));
        let topic0 = signature_hash(&signature);

        Ok(Self {
            name,
            fields,
            anonymous,
            data,
            signature,
            topic0,
        })
    }

    /// Build from `(name, descriptor, indexed)` triples.
    pub fn parse<N, D>(
        name: impl Into<String>,
        fields: &[(N, D, bool)],
        anonymous: bool,
    ) -> Result<Self, AbiError>
    where
        N: AsRef<str>,
        D: AsRef<str>,
    {
        let fields = fields
            .iter()
            .map(|(n, d, indexed)| {
                Ok(EventField::new(n.as_ref(), crate::parser::parse(d.as_ref())?, *indexed))
            })
            .collect::<Result<Vec<_>, AbiError>>()?;
        Self::new(name, fields, anonymous)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[EventField] {
        &self.fields
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn indexed_count(&self) -> usize {
        self.fields.iter().filter(|f| f.indexed).count()
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `keccak256(signature)`: topic0 of every non-anonymous log.
    pub fn topic0(&self) -> B256 {
        self.topic0
    }

    /// Decode one log given only its indexed-parameter topics (topic0 already
    /// removed) and its data buffer.
    ///
    /// The row lists fields in declared order regardless of which were
    /// indexed.
    pub fn decode(&self, topics: &[B256], data: &[u8]) -> Result<DecodedRow, AbiError> {
        let expected = self.indexed_count();
        if topics.len() != expected {
            return Err(AbiError::mismatch(format!(
                "event {} expects {expected} indexed topics, log has {}",
                self.name,
                topics.len()
            )));
        }

        let mut indexed = topics.iter().zip(self.fields.iter().filter(|f| f.indexed)).map(
            |(topic, field)| {
                decode_scalar(field.ty.kind(), &topic.0).ok_or_else(|| AbiError::UnsupportedType {
                    field: field.name.clone(),
                    ty: field.ty.to_string(),
                })
            },
        );
        let mut data = self.data.decode(data)?.into_fields().into_iter();

        let mut row: Vec<(String, DecodedValue)> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = if field.indexed {
                indexed.next()
            } else {
                data.next().map(|(_, v)| Ok(v))
            };
            let value = value.ok_or_else(|| {
                AbiError::mismatch(format!("no value decoded for field '{}'", field.name))
            })??;
            row.push((field.name.clone(), value));
        }
        Ok(DecodedRow::new(row))
    }

    /// Decode a log from its full topic list.
    ///
    /// For non-anonymous events the first topic must equal `topic0()` and is
    /// stripped before decoding.
    pub fn decode_log(&self, topics: &[B256], data: &[u8]) -> Result<DecodedRow, AbiError> {
        if self.anonymous {
            return self.decode(topics, data);
        }
        let (first, rest) = topics.split_first().ok_or_else(|| {
            AbiError::mismatch(format!("log for event {} has no topics", self.name))
        })?;
        if *first != self.topic0 {
            return Err(AbiError::mismatch(format!(
                "topic0 {first} does not match {} ({})",
                self.topic0, self.signature
            )));
        }
        self.decode(rest, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn word(v: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&v.to_be_bytes());
        w
    }

    fn address_topic(byte: u8) -> B256 {
        let mut w = [0u8; 32];
        w[12..].copy_from_slice(&[byte; 20]);
        B256::from(w)
    }

    fn transfer() -> EventSchema {
        EventSchema::parse(
            "Transfer",
            &[
                ("from", "address", true),
                ("to", "address", true),
                ("value", "uint256", false),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn transfer_signature_and_topic0() {
        let ev = transfer();
        assert_eq!(ev.signature(), "Transfer(address,address,uint256)");
        assert_eq!(
            format!("{:x}", ev.topic0()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn two_topics_three_data_fields() {
        let ev = EventSchema::parse(
            "Mixed",
            &[
                ("maker", "address", true),
                ("nonce", "uint256", true),
                ("amount", "uint256", false),
                ("active", "bool", false),
                ("delta", "int256", false),
            ],
            false,
        )
        .unwrap();

        let topics = [address_topic(0x11), B256::from(word(7))];
        let mut data = Vec::new();
        data.extend(word(500));
        data.extend(word(1));
        data.extend([0xffu8; 32]);

        let row = ev.decode(&topics, &data).unwrap();
        assert_eq!(
            row.names().collect::<Vec<_>>(),
            vec!["maker", "nonce", "amount", "active", "delta"]
        );
        assert_eq!(
            row.get("maker").and_then(|v| v.as_address()),
            Some(Address::from_slice(&[0x11; 20]))
        );
        assert_eq!(row.get("nonce").and_then(|v| v.as_uint()), Some(U256::from(7u64)));
        assert_eq!(row.get("amount").and_then(|v| v.as_uint()), Some(U256::from(500u64)));
        assert_eq!(row.get("active").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(
            row.get("delta").and_then(|v| v.as_int()).map(|i| i.is_negative()),
            Some(true)
        );
    }

    #[test]
    fn interleaved_indexed_fields_keep_declared_order() {
        let ev = EventSchema::parse(
            "Interleaved",
            &[("a", "uint8", false), ("b", "uint8", true), ("c", "uint8", false)],
            false,
        )
        .unwrap();
        let mut data = word(1).to_vec();
        data.extend(word(3));
        let row = ev.decode(&[B256::from(word(2))], &data).unwrap();
        let values: Vec<_> = row.iter().map(|(n, v)| (n, v.as_uint())).collect();
        assert_eq!(
            values,
            vec![
                ("a", Some(U256::from(1u64))),
                ("b", Some(U256::from(2u64))),
                ("c", Some(U256::from(3u64)))
            ]
        );
    }

    #[test]
    fn topic_count_mismatch() {
        let ev = transfer();
        let err = ev.decode(&[address_topic(1)], &word(1)).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
    }

    #[test]
    fn dynamic_indexed_field_is_unsupported() {
        let err = EventSchema::parse("E", &[("s", "string", true)], false).unwrap_err();
        assert!(matches!(err, AbiError::UnsupportedType { ref field, .. } if field == "s"));

        let err = EventSchema::parse("E", &[("t", "(uint256,uint256)", true)], false).unwrap_err();
        assert_eq!(err.kind(), "unsupported_type");
    }

    #[test]
    fn too_many_indexed_fields() {
        let fields = [
            ("a", "uint8", true),
            ("b", "uint8", true),
            ("c", "uint8", true),
            ("d", "uint8", true),
        ];
        assert!(EventSchema::parse("E", &fields, false).is_err());
        assert!(EventSchema::parse("E", &fields, true).is_ok());
    }

    #[test]
    fn decode_log_checks_topic0() {
        let ev = transfer();
        let topics = [ev.topic0(), address_topic(1), address_topic(2)];
        let row = ev.decode_log(&topics, &word(10)).unwrap();
        assert_eq!(row.len(), 3);

        let wrong = [B256::ZERO, address_topic(1), address_topic(2)];
        assert_eq!(ev.decode_log(&wrong, &word(10)).unwrap_err().kind(), "schema_mismatch");
        assert!(ev.decode_log(&[], &word(10)).is_err());
    }

    #[test]
    fn anonymous_log_has_no_topic0() {
        let ev = EventSchema::parse("Anon", &[("who", "address", true)], true).unwrap();
        let row = ev.decode_log(&[address_topic(9)], &[]).unwrap();
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn truncated_data_fails_whole_log() {
        let ev = transfer();
        let err = ev
            .decode(&[address_topic(1), address_topic(2)], &[0u8; 16])
            .unwrap_err();
        assert_eq!(err.kind(), "truncated");
    }
}
