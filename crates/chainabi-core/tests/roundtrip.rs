//! Decode what `alloy-dyn-abi` encodes, and check we get the same values back.

use alloy_dyn_abi::DynSolValue;
use chainabi_core::{Address, DecodedValue, Schema, B256, I256, U256};

/// Mirror of a reference value in our decoded representation. Tuple
/// components come back positionally named.
fn expected(v: &DynSolValue) -> DecodedValue {
    match v {
        DynSolValue::Bool(b) => DecodedValue::Bool(*b),
        DynSolValue::Int(i, _) => DecodedValue::Int(*i),
        DynSolValue::Uint(u, _) => DecodedValue::Uint(*u),
        DynSolValue::FixedBytes(word, size) => DecodedValue::FixedBytes(word[..*size].to_vec()),
        DynSolValue::Address(a) => DecodedValue::Address(*a),
        DynSolValue::Bytes(b) => DecodedValue::Bytes(b.clone()),
        DynSolValue::String(s) => DecodedValue::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            DecodedValue::Array(items.iter().map(expected).collect())
        }
        DynSolValue::Tuple(items) => DecodedValue::Tuple(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("_{i}"), expected(v)))
                .collect(),
        ),
        other => panic!("no mirror for {other:?}"),
    }
}

fn check<D: AsRef<str>>(cases: Vec<(D, DynSolValue)>) {
    let pairs: Vec<(String, &str)> = cases
        .iter()
        .enumerate()
        .map(|(i, (d, _))| (format!("f{i}"), d.as_ref()))
        .collect();
    let schema = Schema::parse(&pairs).unwrap();
    let values: Vec<DynSolValue> = cases.iter().map(|(_, v)| v.clone()).collect();
    let encoded = DynSolValue::Tuple(values.clone()).abi_encode_params();

    let row = schema.decode(&encoded).unwrap();
    assert_eq!(row.len(), values.len());
    for (i, v) in values.iter().enumerate() {
        assert_eq!(
            row.get(&format!("f{i}")),
            Some(&expected(v)),
            "field f{i} ({})",
            cases[i].0.as_ref()
        );
    }
}

fn uint_max(bits: usize) -> U256 {
    if bits == 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << bits) - U256::from(1u8)
    }
}

fn int_min(bits: usize) -> I256 {
    I256::MIN.asr(256 - bits)
}

fn int_max(bits: usize) -> I256 {
    I256::MAX.asr(256 - bits)
}

#[test]
fn integer_boundaries() {
    let mut cases = Vec::new();
    for bits in [8usize, 16, 24, 64, 128, 160, 256] {
        let (u, i) = (format!("uint{bits}"), format!("int{bits}"));
        cases.push((u.clone(), DynSolValue::Uint(U256::ZERO, bits)));
        cases.push((u, DynSolValue::Uint(uint_max(bits), bits)));
        cases.push((i.clone(), DynSolValue::Int(int_min(bits), bits)));
        cases.push((i.clone(), DynSolValue::Int(int_max(bits), bits)));
        cases.push((i, DynSolValue::Int(I256::MINUS_ONE, bits)));
    }
    check(cases);
}

#[test]
fn scalars() {
    let mut word = [0u8; 32];
    word[..5].copy_from_slice(&[1, 2, 3, 4, 5]);
    check(vec![
        ("bool", DynSolValue::Bool(true)),
        ("bool", DynSolValue::Bool(false)),
        ("address", DynSolValue::Address(Address::from_slice(&[0xfe; 20]))),
        ("bytes5", DynSolValue::FixedBytes(B256::from(word), 5)),
        ("bytes32", DynSolValue::FixedBytes(B256::repeat_byte(0x77), 32)),
    ]);
}

#[test]
fn dynamic_values() {
    check(vec![
        ("bytes", DynSolValue::Bytes(vec![])),
        ("bytes", DynSolValue::Bytes(vec![0xab; 33])),
        ("string", DynSolValue::String(String::new())),
        ("string", DynSolValue::String("héllo wörld".repeat(5))),
        (
            "uint256[]",
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(1u8), 256),
                DynSolValue::Uint(U256::MAX, 256),
            ]),
        ),
        ("uint256[]", DynSolValue::Array(vec![])),
        (
            "string[]",
            DynSolValue::Array(vec![
                DynSolValue::String("a".into()),
                DynSolValue::String("".into()),
                DynSolValue::String("x".repeat(40)),
            ]),
        ),
    ]);
}

#[test]
fn nested_composites() {
    let inner = |n: u64, s: &str| {
        DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(n), 256),
            DynSolValue::String(s.into()),
        ])
    };
    check(vec![
        ("(uint256,string)", inner(1, "one")),
        (
            "(uint256,string)[]",
            DynSolValue::Array(vec![inner(2, "two"), inner(3, "three")]),
        ),
        (
            "(uint256,string)[2]",
            DynSolValue::FixedArray(vec![inner(4, "four"), inner(5, "")]),
        ),
        (
            "uint8[2][3]",
            DynSolValue::FixedArray(
                (0..3u64)
                    .map(|i| {
                        DynSolValue::FixedArray(vec![
                            DynSolValue::Uint(U256::from(i), 8),
                            DynSolValue::Uint(U256::from(i + 10), 8),
                        ])
                    })
                    .collect(),
            ),
        ),
        (
            "bytes[][]",
            DynSolValue::Array(vec![
                DynSolValue::Array(vec![DynSolValue::Bytes(vec![1, 2, 3])]),
                DynSolValue::Array(vec![]),
            ]),
        ),
        (
            "(bool,(address,bytes)[],int16)",
            DynSolValue::Tuple(vec![
                DynSolValue::Bool(true),
                DynSolValue::Array(vec![DynSolValue::Tuple(vec![
                    DynSolValue::Address(Address::from_slice(&[0x01; 20])),
                    DynSolValue::Bytes(vec![9; 64]),
                ])]),
                DynSolValue::Int(I256::try_from(-2i64).unwrap(), 16),
            ]),
        ),
    ]);
}

#[test]
fn static_tuple_is_inline() {
    check(vec![
        (
            "(uint8,bool)",
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(200u8), 8),
                DynSolValue::Bool(true),
            ]),
        ),
        ("uint256", DynSolValue::Uint(U256::from(42u8), 256)),
    ]);
}
