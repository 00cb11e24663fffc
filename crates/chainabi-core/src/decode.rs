//! Head/tail decoding.
//!
//! A region is a run of fields laid out as consecutive head slots starting
//! at `region_start`. Static fields live in place in the head; a dynamic
//! field's slot holds a byte offset, relative to `region_start`, to where
//! its value (the tail) begins. Tuples, fixed arrays and the element list of
//! a dynamic array are all regions of their own, so the same walk applies
//! recursively.
//!
//! Tail offsets are followed as given. Canonical encoders emit them in
//! increasing order, but nothing here depends on that.

use crate::error::AbiError;
use crate::reader::WordReader;
use crate::scalar::decode_scalar;
use crate::types::{TupleField, TypeKind, TypeNode, WORD_SIZE};
use crate::value::DecodedValue;

/// Decode `types` as one head/tail region starting at `region_start`.
pub fn decode_region<'t, I>(
    reader: &WordReader<'_>,
    types: I,
    region_start: usize,
) -> Result<Vec<DecodedValue>, AbiError>
where
    I: IntoIterator<Item = &'t TypeNode>,
{
    let types = types.into_iter();
    let mut values = Vec::with_capacity(types.size_hint().0);
    let mut head = region_start;

    for ty in types {
        let value = if ty.is_dynamic() {
            let offset = reader.read_usize(head)?;
            let tail = region_start
                .checked_add(offset)
                .ok_or_else(|| overflow(reader, region_start))?;
            decode_value(reader, ty, tail)?
        } else {
            decode_value(reader, ty, head)?
        };
        values.push(value);
        head = head
            .checked_add(ty.head_size())
            .ok_or_else(|| overflow(reader, head))?;
    }

    Ok(values)
}

/// Decode the value of `ty` whose encoding starts at `pos`.
///
/// For static types `pos` is the head slot; for dynamic types it is the
/// already-resolved tail position.
pub fn decode_value(
    reader: &WordReader<'_>,
    ty: &TypeNode,
    pos: usize,
) -> Result<DecodedValue, AbiError> {
    match ty.kind() {
        TypeKind::Bytes => {
            let (len, data) = reader.read_length_prefixed(pos)?;
            Ok(DecodedValue::Bytes(reader.slice(data, len)?.to_vec()))
        }
        TypeKind::String => {
            let (len, data) = reader.read_length_prefixed(pos)?;
            let raw = reader.slice(data, len)?;
            Ok(DecodedValue::String(String::from_utf8_lossy(raw).into_owned()))
        }
        TypeKind::FixedArray { element, len } => {
            decode_repeated(reader, element, *len, pos).map(DecodedValue::Array)
        }
        TypeKind::Array(element) => {
            let len = reader.read_usize(pos)?;
            decode_repeated(reader, element, len, pos + WORD_SIZE).map(DecodedValue::Array)
        }
        TypeKind::Tuple(fields) => decode_tuple(reader, fields, pos),
        kind => {
            let word = reader.read_word(pos)?;
            decode_scalar(kind, word).ok_or_else(|| {
                AbiError::ty(ty.to_string(), "no scalar decoding for this type")
            })
        }
    }
}

/// `len` copies of `element` as one region: inline for static elements,
/// offset-indirected for dynamic ones.
fn decode_repeated(
    reader: &WordReader<'_>,
    element: &TypeNode,
    len: usize,
    region_start: usize,
) -> Result<Vec<DecodedValue>, AbiError> {
    // The whole head run must exist before anything is allocated for it;
    // `len` may come straight from the buffer.
    let head_size = element.head_size();
    if head_size == 0 {
        // Zero-width elements (`T[0]`) occupy no bytes; cap their count by
        // the buffer size instead.
        if len > reader.len() {
            return Err(AbiError::Truncated {
                offset: region_start,
                needed: len,
                available: reader.len(),
            });
        }
    } else {
        let head_bytes = len
            .checked_mul(head_size)
            .ok_or_else(|| overflow(reader, region_start))?;
        reader.ensure(region_start, head_bytes)?;
    }

    decode_region(reader, std::iter::repeat(element).take(len), region_start)
}

fn decode_tuple(
    reader: &WordReader<'_>,
    fields: &[TupleField],
    region_start: usize,
) -> Result<DecodedValue, AbiError> {
    let values = decode_region(reader, fields.iter().map(|f| &f.ty), region_start)?;
    let named = fields
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (field, value))| (component_name(field, i), value))
        .collect();
    Ok(DecodedValue::Tuple(named))
}

/// Unnamed tuple components are named by position: `_0`, `_1`, ...
pub fn component_name(field: &TupleField, index: usize) -> String {
    match field.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("_{index}"),
    }
}

fn overflow(reader: &WordReader<'_>, offset: usize) -> AbiError {
    AbiError::Truncated {
        offset,
        needed: usize::MAX,
        available: reader.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use alloy_primitives::U256;

    fn word(v: u64) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[24..].copy_from_slice(&v.to_be_bytes());
        w
    }

    fn left(bytes: &[u8]) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[..bytes.len()].copy_from_slice(bytes);
        w
    }

    fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
        parts.concat()
    }

    fn decode(types: &[&str], buf: &[u8]) -> Result<Vec<DecodedValue>, AbiError> {
        let nodes: Vec<TypeNode> = types.iter().map(|t| parse(t).unwrap()).collect();
        decode_region(&WordReader::new(buf), nodes.iter(), 0)
    }

    #[test]
    fn uint_then_bytes() {
        let buf = concat(&[word(0x40), word(3), left(&[0xaa, 0xbb, 0xcc])]);
        let values = decode(&["uint256", "bytes"], &buf).unwrap();
        // `a` is read from its head slot; `b` follows the same word as an offset.
        assert_eq!(values[0], DecodedValue::Uint(U256::from(64u64)));
        assert_eq!(values[1], DecodedValue::Bytes(vec![0xaa, 0xbb, 0xcc]));
    }

    #[test]
    fn bool_array_value() {
        let ty = parse("bool[]").unwrap();
        let buf = concat(&[word(2), word(1), word(0)]);
        let v = decode_value(&WordReader::new(&buf), &ty, 0).unwrap();
        assert_eq!(
            v,
            DecodedValue::Array(vec![DecodedValue::Bool(true), DecodedValue::Bool(false)])
        );
    }

    #[test]
    fn reordered_tails_decode_the_same() {
        // canonical: a at 0x40, b at 0x80
        let canonical = concat(&[
            word(0x40),
            word(0x80),
            word(1),
            left(b"a"),
            word(2),
            left(b"bb"),
        ]);
        // reordered: b's tail first
        let reordered = concat(&[
            word(0x80),
            word(0x40),
            word(2),
            left(b"bb"),
            word(1),
            left(b"a"),
        ]);
        let a = decode(&["string", "string"], &canonical).unwrap();
        let b = decode(&["string", "string"], &reordered).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].as_str(), Some("a"));
        assert_eq!(a[1].as_str(), Some("bb"));
    }

    #[test]
    fn offsets_are_relative_to_enclosing_region() {
        // (uint256,(uint256,string)): outer head = [1, offset 0x40]
        // inner tuple at 0x40: head = [2, offset 0x40 (relative to 0x40)]
        let buf = concat(&[
            word(1),
            word(0x40),
            word(2),
            word(0x40),
            word(2),
            left(b"hi"),
        ]);
        let values = decode(&["uint256", "(uint256 value,string key)"], &buf).unwrap();
        let inner = &values[1];
        assert_eq!(inner.field("value"), Some(&DecodedValue::Uint(U256::from(2u64))));
        assert_eq!(inner.field("key").and_then(|v| v.as_str()), Some("hi"));
    }

    #[test]
    fn static_tuple_and_fixed_array_inline() {
        let buf = concat(&[word(1), word(2), word(3), word(4)]);
        let values = decode(&["(uint8,uint8)", "uint8[2]"], &buf).unwrap();
        assert_eq!(values[0].field("_0").and_then(|v| v.as_uint()), Some(U256::from(1u64)));
        assert_eq!(values[0].field("_1").and_then(|v| v.as_uint()), Some(U256::from(2u64)));
        assert_eq!(values[1].as_array().unwrap().len(), 2);
    }

    #[test]
    fn fixed_array_of_dynamic_elements_uses_offsets() {
        // string[2] is dynamic: head holds an offset to its own region
        let buf = concat(&[
            word(0x20),
            word(0x40),
            word(0x80),
            word(1),
            left(b"x"),
            word(1),
            left(b"y"),
        ]);
        let values = decode(&["string[2]"], &buf).unwrap();
        let items = values[0].as_array().unwrap();
        assert_eq!(items[0].as_str(), Some("x"));
        assert_eq!(items[1].as_str(), Some("y"));
    }

    #[test]
    fn nested_dynamic_arrays() {
        // uint8[][] = [[7], []]
        let buf = concat(&[
            word(0x20), // offset to outer array
            word(2),    // outer length
            word(0x40), // offset of [7] relative to element region
            word(0x80), // offset of []
            word(1),
            word(7),
            word(0),
        ]);
        let values = decode(&["uint8[][]"], &buf).unwrap();
        let outer = values[0].as_array().unwrap();
        assert_eq!(outer[0].as_array().unwrap(), &[DecodedValue::Uint(U256::from(7u64))]);
        assert!(outer[1].as_array().unwrap().is_empty());
    }

    #[test]
    fn zero_length_fixed_array_consumes_nothing() {
        let buf = word(9);
        let values = decode(&["bool[0]", "uint256"], &buf).unwrap();
        assert!(values[0].as_array().unwrap().is_empty());
        assert_eq!(values[1].as_uint(), Some(U256::from(9u64)));
    }

    #[test]
    fn truncated_static_region() {
        let buf = word(1);
        let err = decode(&["uint256", "uint256"], &buf).unwrap_err();
        assert_eq!(err.kind(), "truncated");
    }

    #[test]
    fn tail_offset_past_end() {
        let buf = concat(&[word(0x1000)]);
        assert_eq!(decode(&["bytes"], &buf).unwrap_err().kind(), "truncated");
    }

    #[test]
    fn adversarial_offset_does_not_wrap() {
        let mut buf = vec![0xffu8; 24];
        buf.extend_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(decode(&["bytes"], &buf).unwrap_err().kind(), "truncated");
    }

    #[test]
    fn adversarial_array_length_is_rejected_before_allocating() {
        let buf = concat(&[word(0x20), word(u64::MAX)]);
        assert_eq!(decode(&["uint256[]"], &buf).unwrap_err().kind(), "truncated");
    }

    #[test]
    fn zero_width_elements_are_bounded_by_buffer() {
        let buf = concat(&[word(0x20), word(3)]);
        let values = decode(&["uint8[0][]"], &buf).unwrap();
        assert_eq!(values[0].as_array().unwrap().len(), 3);

        let forged = concat(&[word(0x20), word(1 << 40)]);
        assert_eq!(decode(&["uint8[0][]"], &forged).unwrap_err().kind(), "truncated");
    }

    #[test]
    fn huge_static_element_is_truncated_not_overflow() {
        let desc = format!("uint256[{}][]", usize::MAX / WORD_SIZE);
        let buf = concat(&[word(0x20), word(1), word(0), word(0)]);
        let err = decode(&[desc.as_str()], &buf).unwrap_err();
        assert_eq!(err.kind(), "truncated");
    }

    #[test]
    fn invalid_utf8_is_lossy_not_fatal() {
        let buf = concat(&[word(0x20), word(2), left(&[0xff, 0x41])]);
        let values = decode(&["string"], &buf).unwrap();
        assert_eq!(values[0].as_str(), Some("\u{fffd}A"));
    }
}
