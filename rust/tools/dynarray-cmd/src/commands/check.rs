//! Check command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use dynarray_testkit::props::{self, CheckConfig};

use crate::commands::load_check_config;

/// Settings given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub max_item_size: Option<usize>,
    pub max_items: Option<usize>,
    pub failure_rate: Option<f64>,
    pub budget: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut CheckConfig) {
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_item_size) = self.max_item_size {
            config.max_item_size = max_item_size;
        }
        if let Some(max_items) = self.max_items {
            config.max_items = max_items;
        }
        if let Some(failure_rate) = self.failure_rate {
            config.failure_rate = failure_rate;
        }
        if self.budget.is_some() {
            config.budget = self.budget;
        }
    }
}

pub fn resolve_config(config_path: Option<PathBuf>, overrides: Overrides) -> Result<CheckConfig> {
    let mut config = match config_path {
        Some(path) => load_check_config(&path)?,
        None => CheckConfig::default(),
    };
    overrides.apply(&mut config);
    config
        .validate()
        .with_context(|| format!("Invalid check settings: {config:?}"))?;
    Ok(config)
}

pub fn run(config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = resolve_config(config_path, overrides)?;
    log::debug!("check config: {config:?}");

    let counts = props::run_checks(&config)
        .with_context(|| format!("Copy check failed (seed {})", config.seed))?;

    println!("Checked {} copy scenarios (seed {})", config.iterations, config.seed);
    println!("  copied in place:       {}", counts.in_place);
    println!("  reallocated:           {}", counts.reallocated);
    println!("  destination too small: {}", counts.destination_too_small);
    println!("  allocation failed:     {}", counts.allocation_failed);
    println!("  size overflow:         {}", counts.size_overflow);
    if config.budget.is_some() {
        println!("  skipped (budget):      {}", counts.skipped);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.json");
        std::fs::write(&path, r#"{ "iterations": 40, "seed": 1, "budget": 512 }"#).unwrap();

        let config = resolve_config(
            Some(path),
            Overrides {
                seed: Some(9),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.iterations, 40);
        assert_eq!(config.seed, 9);
        assert_eq!(config.budget, Some(512));
    }

    #[test]
    fn test_rejects_bad_settings() {
        let bad_rate = Overrides {
            failure_rate: Some(1.5),
            ..Default::default()
        };
        assert!(resolve_config(None, bad_rate).is_err());

        let zero_items = Overrides {
            max_item_size: Some(0),
            ..Default::default()
        };
        assert!(resolve_config(None, zero_items).is_err());

        let huge_lists = Overrides {
            max_items: Some(usize::MAX),
            iterations: Some(1),
            ..Default::default()
        };
        assert!(resolve_config(None, huge_lists).is_err());
    }

    #[test]
    fn test_run_small_check() {
        let overrides = Overrides {
            iterations: Some(50),
            ..Default::default()
        };
        run(None, overrides).unwrap();
    }
}
