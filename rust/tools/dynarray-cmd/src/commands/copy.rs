//! Copy command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use dynarray::{ArrayList, Mode};
use dynarray_alloc::{Allocator, BudgetAllocator, HeapAllocator};
use serde::Serialize;

/// A single copy to run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub item_size: usize,
    pub source_len: usize,
    /// In items.
    pub dest_capacity: usize,
    pub dest_len: usize,
    pub fixed: bool,
    pub budget: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListInfo {
    mode: String,
    item_size: usize,
    length: usize,
    capacity_bytes: usize,
}

impl ListInfo {
    fn of(list: &ArrayList<'_>) -> ListInfo {
        ListInfo {
            mode: match list.mode() {
                Mode::Fixed => "fixed".to_string(),
                Mode::Dynamic => "dynamic".to_string(),
            },
            item_size: list.item_size(),
            length: list.len(),
            capacity_bytes: list.capacity_bytes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CopyReport {
    source: ListInfo,
    destination_before: ListInfo,
    destination_after: ListInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn execute(scenario: &Scenario) -> Result<CopyReport> {
    anyhow::ensure!(
        scenario.dest_len <= scenario.dest_capacity,
        "dest-len ({}) exceeds dest-capacity ({})",
        scenario.dest_len,
        scenario.dest_capacity
    );
    let item_size = scenario.item_size;
    let allocator: Arc<dyn Allocator> = match scenario.budget {
        Some(limit) => Arc::new(BudgetAllocator::new(HeapAllocator::new(), limit)),
        None => Arc::new(HeapAllocator::new()),
    };

    let source_bytes = scenario
        .source_len
        .checked_mul(item_size)
        .context("Source size overflows")?;
    let mut source_storage = (0..source_bytes).map(|i| i as u8).collect::<Vec<_>>();
    let source = ArrayList::from_initialized(&mut source_storage, item_size, scenario.source_len)
        .context("Failed to create source list")?;

    let dest_bytes = scenario
        .dest_capacity
        .checked_mul(item_size)
        .context("Destination size overflows")?;
    let mut fixed_storage = vec![0u8; if scenario.fixed { dest_bytes } else { 0 }];
    let mut destination = if scenario.fixed {
        ArrayList::from_initialized(&mut fixed_storage, item_size, scenario.dest_len)
    } else {
        ArrayList::new_dynamic(allocator, scenario.dest_capacity, item_size).and_then(
            |mut list| {
                if scenario.dest_len > 0 {
                    let mut filler = vec![0u8; scenario.dest_len * item_size];
                    let filled =
                        ArrayList::from_initialized(&mut filler, item_size, scenario.dest_len)?;
                    filled.copy_into(&mut list)?;
                }
                Ok(list)
            },
        )
    }
    .context("Failed to create destination list")?;

    let destination_before = ListInfo::of(&destination);
    let error = dynarray::copy(&source, &mut destination)
        .err()
        .map(|e| e.to_string());
    if let Some(e) = &error {
        log::debug!("copy failed: {e}");
    }

    Ok(CopyReport {
        source: ListInfo::of(&source),
        destination_before,
        destination_after: ListInfo::of(&destination),
        error,
    })
}

pub fn run(scenario: Scenario) -> Result<()> {
    let report = execute(&scenario)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
