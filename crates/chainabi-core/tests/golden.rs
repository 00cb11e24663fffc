//! Golden-file tests: decode fixed on-chain-shaped payloads and compare the
//! JSON rendering of each row against the recorded expectation.

use chainabi_core::{EventSchema, FunctionSchema, Schema, B256};
use serde_json::Value;
use std::path::PathBuf;

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

fn hex_field(v: &Value, key: &str) -> Vec<u8> {
    let s = v[key].as_str().unwrap();
    hex::decode(s.trim_start_matches("0x")).unwrap()
}

fn pairs(v: &Value) -> Vec<(String, String)> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p[0].as_str().unwrap().to_string(),
                p[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn all_type_function_inputs() {
    let fx = fixture("all_type_function.json");
    let inputs = Schema::parse(&pairs(&fx["inputs"])).unwrap();

    let row = inputs.decode(&hex_field(&fx, "input_data")).unwrap();
    let names: Vec<_> = row.names().collect();
    let declared: Vec<_> = inputs.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, declared);
    assert_eq!(serde_json::to_value(&row).unwrap(), fx["expected_input"]);
}

#[test]
fn all_type_function_outputs() {
    let fx = fixture("all_type_function.json");
    let func = FunctionSchema::new(
        fx["name"].as_str().unwrap(),
        Schema::parse(&pairs(&fx["inputs"])).unwrap(),
        Schema::parse(&pairs(&fx["outputs"])).unwrap(),
    );

    let row = func.decode_output(&hex_field(&fx, "output_data")).unwrap();
    assert_eq!(serde_json::to_value(&row).unwrap(), fx["expected_output"]);
}

#[test]
fn all_type_function_calldata_round() {
    let fx = fixture("all_type_function.json");
    let func = FunctionSchema::new(
        "AllTypeFunction",
        Schema::parse(&pairs(&fx["inputs"])).unwrap(),
        Schema::default(),
    );
    let mut calldata = func.selector().to_vec();
    calldata.extend(hex_field(&fx, "input_data"));
    let row = func.decode_calldata(&calldata).unwrap();
    assert_eq!(serde_json::to_value(&row).unwrap(), fx["expected_input"]);
}

#[test]
fn all_type_function_rejects_every_truncation() {
    let fx = fixture("all_type_function.json");
    let inputs = Schema::parse(&pairs(&fx["inputs"])).unwrap();
    let data = hex_field(&fx, "input_data");
    for cut in (0..data.len()).step_by(32) {
        let err = inputs.decode(&data[..cut]).unwrap_err();
        assert_eq!(err.kind(), "truncated", "cut at {cut}");
    }
}

fn order_approved() -> (Value, EventSchema) {
    let fx = fixture("order_approved_part_one.json");
    let fields: Vec<(String, String, bool)> = fx["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f[0].as_str().unwrap().to_string(),
                f[1].as_str().unwrap().to_string(),
                f[2].as_bool().unwrap(),
            )
        })
        .collect();
    let ev = EventSchema::parse(
        fx["name"].as_str().unwrap(),
        &fields,
        fx["anonymous"].as_bool().unwrap(),
    )
    .unwrap();
    (fx, ev)
}

fn topics(fx: &Value) -> Vec<B256> {
    fx["indexed_topics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().parse::<B256>().unwrap())
        .collect()
}

#[test]
fn order_approved_part_one_event() {
    let (fx, ev) = order_approved();
    assert_eq!(ev.signature(), fx["signature"].as_str().unwrap());

    let row = ev.decode(&topics(&fx), &hex_field(&fx, "data")).unwrap();
    let order: Vec<_> = fx["field_order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(row.names().collect::<Vec<_>>(), order);
    assert_eq!(serde_json::to_value(&row).unwrap(), fx["expected"]);
}

#[test]
fn order_approved_part_one_full_log() {
    let (fx, ev) = order_approved();
    let mut all = vec![ev.topic0()];
    all.extend(topics(&fx));
    let row = ev.decode_log(&all, &hex_field(&fx, "data")).unwrap();
    assert_eq!(serde_json::to_value(&row).unwrap(), fx["expected"]);
}

#[test]
fn order_approved_part_one_missing_topic() {
    let (fx, ev) = order_approved();
    let mut short = topics(&fx);
    short.pop();
    let err = ev.decode(&short, &hex_field(&fx, "data")).unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}
