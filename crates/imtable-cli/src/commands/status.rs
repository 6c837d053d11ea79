use anyhow::Result;
use std::path::Path;

use imtable_core::schema::Database;

pub fn show_status(db_path: &Path, json: bool) -> Result<()> {
    let db = Database::open(db_path)?;

    let name = db
        .get_attribute("NAME")?
        .unwrap_or_else(|| "<unnamed>".to_string());
    let count = db.phrase_count()?;
    let attributes = db.list_attributes()?;

    if json {
        let attrs: serde_json::Map<String, serde_json::Value> = attributes
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        let report = serde_json::json!({
            "artifact": db_path.display().to_string(),
            "name": name,
            "entries": count,
            "definition": attrs,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n📊 Table Artifact\n");
    println!("  Artifact: {}", db_path.display());
    println!("  Name:     {name}");
    println!("  Entries:  {count}");

    if !attributes.is_empty() {
        println!("\n  Definition:");
        for (key, value) in attributes {
            println!("    {key} = {value}");
        }
    }

    Ok(())
}
