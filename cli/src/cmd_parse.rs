//! `chainabi parse-type`: validate a type descriptor and show its layout.

use anyhow::{Context, Result};
use chainabi_core::parse;

pub fn run(descriptor: &str, json: bool) -> Result<()> {
    let ty = parse(descriptor).with_context(|| format!("parse type '{descriptor}'"))?;

    if json {
        let info = serde_json::json!({
            "canonical": ty.to_string(),
            "dynamic": ty.is_dynamic(),
            "head_words": ty.head_size() / 32,
            "static_words": ty.static_words(),
            "depth": ty.depth(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("✓ {ty}");
    println!("  Layout:      {}", if ty.is_dynamic() { "dynamic (offset in head)" } else { "static (inline)" });
    println!("  Head words:  {}", ty.head_size() / 32);
    if let Some(words) = ty.static_words() {
        println!("  Encoded:     {} bytes", words * 32);
    }
    println!("  Depth:       {}", ty.depth());
    Ok(())
}
