//! Command implementations for dynarray-cmd

use anyhow::{Context, Result};
use dynarray_testkit::props::CheckConfig;
use std::path::Path;

pub mod check;
pub mod copy;

/// Reads check settings from a JSON file. Missing fields take their default values.
pub fn load_check_config(path: &Path) -> Result<CheckConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid check config in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_check_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.json");
        std::fs::write(&path, r#"{ "iterations": 12, "failure_rate": 0.5 }"#).unwrap();

        let config = load_check_config(&path).unwrap();
        assert_eq!(config.iterations, 12);
        assert_eq!(config.failure_rate, 0.5);
        assert_eq!(config.max_item_size, 2);
    }

    #[test]
    fn test_load_check_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_check_config(&dir.path().join("missing.json")).is_err());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "iterations": "many" }"#).unwrap();
        let err = load_check_config(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid check config"));
    }
}
