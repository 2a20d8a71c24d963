use crate::config;

/// Pretty-printed JSON Schema for `jsonschema-graph.toml`.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn run() -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(&config::schema())?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_valid_json() -> anyhow::Result<()> {
        let out = run()?;
        let parsed: serde_json::Value = serde_json::from_str(&out)?;
        assert!(parsed["properties"]["default_dialect"].is_object());
        Ok(())
    }
}
