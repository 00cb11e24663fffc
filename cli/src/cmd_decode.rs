//! `chainabi decode`, `decode-batch`, `decode-call` and `decode-log`.

use anyhow::{anyhow, Context, Result};
use chainabi_batch::{BatchEngine, BatchRequest};
use chainabi_core::{DecodedRow, ErrorMode, Schema, B256};
use chainabi_registry::AbiTransformer;
use std::path::Path;
use tracing::debug;

/// Which part of a function call the bytes hold.
#[derive(Debug, Clone, Copy)]
pub enum CallPart {
    /// Arguments without the selector
    Input,
    /// Selector followed by arguments
    Calldata,
    /// Return data
    Output,
}

pub fn decode(types: &[String], data: &str, json: bool) -> Result<()> {
    let schema = schema_from_types(types)?;
    let bytes = parse_hex(data).context("invalid data hex")?;
    let row = schema.decode(&bytes)?;
    print_row(&row, json)
}

pub fn decode_batch(
    types: &[String],
    input: &Path,
    threads: usize,
    chunk_size: usize,
    mode: ErrorMode,
    json: bool,
) -> Result<()> {
    let schema = schema_from_types(types)?;
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("read input file '{}'", input.display()))?;

    let payloads = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .map(|(n, l)| parse_hex(l.trim()).with_context(|| format!("line {}: invalid hex", n + 1)))
        .collect::<Result<Vec<_>>>()?;

    let request = BatchRequest::new(payloads)
        .concurrency(threads)
        .chunk_size(chunk_size)
        .error_mode(mode)
        .on_progress(|done, total| debug!(done, total, "decode-batch progress"));
    let result = BatchEngine::new(schema).decode(request)?;

    if json {
        let errors: Vec<_> = result
            .errors
            .iter()
            .map(|(index, e)| serde_json::json!({ "index": index, "kind": e.kind(), "error": e.to_string() }))
            .collect();
        let out = serde_json::json!({
            "total": result.total_input,
            "decoded": result.rows.len(),
            "rows": result.rows,
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (i, row) in result.rows.iter().enumerate() {
        println!("Row {i}:");
        print_fields(row);
    }
    println!("Total:    {}", result.total_input);
    println!("Decoded:  {}", result.rows.len());
    println!("Failed:   {}", result.failed());
    for (index, e) in &result.errors {
        println!("  #{index}: {e}");
    }
    Ok(())
}

pub fn decode_call(abi_path: &Path, function: &str, data: &str, part: CallPart, json: bool) -> Result<()> {
    let func = load_abi(abi_path)?.function(function)?;
    let bytes = parse_hex(data).context("invalid calldata hex")?;

    let row = match part {
        CallPart::Input => func.decode_input(&bytes)?,
        CallPart::Calldata => func.decode_calldata(&bytes)?,
        CallPart::Output => func.decode_output(&bytes)?,
    };

    if !json {
        println!("Function:  {}", func.signature());
        println!("Selector:  0x{}", hex::encode(func.selector()));
    }
    print_row(&row, json)
}

pub fn decode_log(abi_path: &Path, event: &str, topics: &[String], data: &str, json: bool) -> Result<()> {
    let schema = load_abi(abi_path)?.event(event)?;
    let topics = topics
        .iter()
        .map(|t| t.parse::<B256>().map_err(|e| anyhow!("invalid topic '{t}': {e}")))
        .collect::<Result<Vec<_>>>()?;
    let bytes = parse_hex(data).context("invalid data hex")?;

    let row = schema.decode_log(&topics, &bytes)?;

    if !json {
        println!("Event:   {}", schema.signature());
        if !schema.is_anonymous() {
            println!("Topic0:  {}", schema.topic0());
        }
    }
    print_row(&row, json)
}

fn load_abi(path: &Path) -> Result<AbiTransformer> {
    let abi_json = std::fs::read_to_string(path)
        .with_context(|| format!("read ABI file '{}'", path.display()))?;
    Ok(AbiTransformer::from_json(&abi_json)?)
}

/// Build a schema from `type` or `name:type` entries; unnamed columns are `_<i>`.
fn schema_from_types(types: &[String]) -> Result<Schema> {
    let pairs: Vec<(String, &str)> = types
        .iter()
        .enumerate()
        .map(|(i, t)| match t.split_once(':') {
            Some((name, ty)) => (name.trim().to_string(), ty.trim()),
            None => (format!("_{i}"), t.trim()),
        })
        .collect();
    Schema::parse(&pairs).context("invalid --types")
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(s.strip_prefix("0x").unwrap_or(s))?)
}

fn print_row(row: &DecodedRow, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(row)?);
    } else {
        println!("Fields:");
        print_fields(row);
    }
    Ok(())
}

fn print_fields(row: &DecodedRow) {
    for (name, value) in row.iter() {
        println!("  {name}: {value}");
    }
}
