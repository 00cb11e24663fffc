//! `chainabi manifest validate`: parse a decode manifest and list its targets.

use anyhow::{Context, Result};
use chainabi_registry::{DecodeTarget, ManifestParser};
use std::path::Path;

pub fn validate(file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("read manifest '{}'", file.display()))?;
    let targets = ManifestParser::parse_all(&content)
        .with_context(|| format!("invalid manifest '{}'", file.display()))?;

    if json {
        let out: Vec<_> = targets.iter().map(describe).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("✓ {} target(s) in {}", targets.len(), file.display());
    for target in &targets {
        println!("  - {} {}", target.kind(), target.signature());
        match target {
            DecodeTarget::Event(e) => {
                if !e.is_anonymous() {
                    println!("      topic0:   {}", e.topic0());
                }
                for f in e.fields() {
                    let indexed = if f.indexed { " [indexed]" } else { "" };
                    println!("      {}: {}{}", f.name, f.ty, indexed);
                }
            }
            DecodeTarget::Function(f) => {
                println!("      selector: 0x{}", hex::encode(f.selector()));
                for p in f.inputs().fields() {
                    println!("      in  {}: {}", p.name, p.ty);
                }
                for p in f.outputs().fields() {
                    println!("      out {}: {}", p.name, p.ty);
                }
            }
        }
    }
    Ok(())
}

fn describe(target: &DecodeTarget) -> serde_json::Value {
    match target {
        DecodeTarget::Event(e) => serde_json::json!({
            "kind": "event",
            "name": e.name(),
            "signature": e.signature(),
            "topic0": (!e.is_anonymous()).then(|| e.topic0().to_string()),
            "indexed": e.indexed_count(),
        }),
        DecodeTarget::Function(f) => serde_json::json!({
            "kind": "function",
            "name": f.name(),
            "signature": f.signature(),
            "selector": format!("0x{}", hex::encode(f.selector())),
            "inputs": f.inputs(),
            "outputs": f.outputs(),
        }),
    }
}
