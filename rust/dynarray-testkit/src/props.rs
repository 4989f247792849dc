//! Postcondition checking for the copy operation.
//!
//! [`check_copy`] snapshots both lists, runs the copy and verifies:
//! - both lists are valid afterwards and keep equal item sizes;
//! - the source is untouched;
//! - on success the destination holds exactly the source items and enough capacity,
//!   keeping its buffer when it was already large enough;
//! - on failure the destination is bit-identical to its previous state and the
//!   error kind matches the destination's mode and capacity;
//! - allocator traffic: at most one acquisition and one release, and only when the
//!   destination had to grow.
//!
//! [`run_checks`] drives it over randomly generated list pairs.

use std::sync::Arc;

use dynarray::{ArrayList, CopyError, ErrorKind, Mode};
use dynarray_alloc::{Allocator, BudgetAllocator};
use dynarray_common::verify_arg;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    alloc::{AllocStats, FailingAllocator, FailurePolicy, TrackingAllocator},
    data_gen::{self, ListBounds, ListShape},
};

/// A violated copy postcondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("copy property violated: {property} ({details})")]
pub struct Violation {
    pub property: &'static str,
    pub details: String,
}

impl Violation {
    fn new(property: &'static str, details: impl Into<String>) -> Violation {
        Violation {
            property,
            details: details.into(),
        }
    }
}

/// Why a check run stopped.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The settings cannot drive a run.
    #[error("invalid check config: {0}")]
    Config(#[from] dynarray::Error),
    #[error(transparent)]
    Violation(#[from] Violation),
}

/// How a checked copy ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination was large enough and kept its buffer.
    InPlace,
    /// The destination acquired a new block.
    Reallocated,
    /// The copy failed; both lists are unchanged.
    Failed(CopyError),
}

/// Full observable state of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub mode: Mode,
    pub item_size: usize,
    pub length: usize,
    pub capacity_bytes: usize,
    pub buffer: Vec<u8>,
}

impl Snapshot {
    pub fn of(list: &ArrayList<'_>) -> Snapshot {
        Snapshot {
            mode: list.mode(),
            item_size: list.item_size(),
            length: list.len(),
            capacity_bytes: list.capacity_bytes(),
            buffer: list.buffer().to_vec(),
        }
    }
}

fn ensure(
    condition: bool,
    property: &'static str,
    details: impl FnOnce() -> String,
) -> Result<(), Violation> {
    if condition {
        Ok(())
    } else {
        Err(Violation::new(property, details()))
    }
}

/// Copies `source` into `destination` and verifies the copy postconditions.
///
/// When `tracker` is given it must be the allocator of `destination` (if dynamic);
/// its counters are used to verify allocator traffic.
pub fn check_copy(
    source: &ArrayList<'_>,
    destination: &mut ArrayList<'_>,
    tracker: Option<&TrackingAllocator>,
) -> Result<CopyOutcome, Violation> {
    let source_before = Snapshot::of(source);
    let destination_before = Snapshot::of(destination);
    let stats_before = tracker.map(TrackingAllocator::stats);

    let result = dynarray::copy(source, destination);

    let source_after = Snapshot::of(source);
    let destination_after = Snapshot::of(destination);
    let stats_after = tracker.map(TrackingAllocator::stats);

    ensure(source.is_valid(), "source valid", || format!("{source:?}"))?;
    ensure(destination.is_valid(), "destination valid", || {
        format!("{destination:?}")
    })?;
    ensure(
        source.item_size() == destination.item_size(),
        "item sizes equal",
        || format!("{} != {}", source.item_size(), destination.item_size()),
    )?;
    ensure(source_before == source_after, "source untouched", || {
        format!("{source_before:?} -> {source_after:?}")
    })?;

    let required = source_before.length * source_before.item_size;
    let outcome = match result {
        Ok(()) => {
            ensure(
                destination_after.length == source_before.length,
                "length equal on success",
                || format!("{} != {}", destination_after.length, source_before.length),
            )?;
            ensure(
                destination_after.capacity_bytes >= required,
                "capacity sufficient on success",
                || format!("{} < {required}", destination_after.capacity_bytes),
            )?;
            ensure(
                destination.as_bytes() == source.as_bytes(),
                "content copied",
                || format!("{:?} != {:?}", destination.as_bytes(), source.as_bytes()),
            )?;
            ensure(
                destination_after.mode == destination_before.mode,
                "mode kept",
                || format!("{:?} -> {:?}", destination_before.mode, destination_after.mode),
            )?;
            if destination_before.capacity_bytes >= required {
                ensure(
                    destination_after.capacity_bytes == destination_before.capacity_bytes
                        && destination_after.buffer[required..]
                            == destination_before.buffer[required..],
                    "in-place copy keeps buffer",
                    || format!("{destination_before:?} -> {destination_after:?}"),
                )?;
                CopyOutcome::InPlace
            } else {
                ensure(
                    destination_before.mode == Mode::Dynamic
                        && destination_after.capacity_bytes == required,
                    "growth only for dynamic destinations, to the exact size",
                    || format!("{destination_before:?} -> {destination_after:?}"),
                )?;
                CopyOutcome::Reallocated
            }
        }
        Err(e) => {
            ensure(
                destination_before == destination_after,
                "destination untouched on failure",
                || format!("{destination_before:?} -> {destination_after:?}"),
            )?;
            let kind_matches = match e {
                CopyError::SizeOverflow { .. } => false,
                CopyError::AllocationFailed { requested } => {
                    destination_before.mode == Mode::Dynamic
                        && requested == required
                        && destination_before.capacity_bytes < required
                }
                CopyError::DestinationTooSmall { required: r, capacity } => {
                    destination_before.mode == Mode::Fixed
                        && r == required
                        && capacity == destination_before.capacity_bytes
                        && capacity < required
                }
            };
            ensure(kind_matches, "error kind matches state", || {
                format!("{e:?} for {destination_before:?}")
            })?;
            CopyOutcome::Failed(e)
        }
    };

    if let (Some(before), Some(after)) = (stats_before, stats_after) {
        check_allocator_traffic(&outcome, &before, &after)?;
    }
    Ok(outcome)
}

fn check_allocator_traffic(
    outcome: &CopyOutcome,
    before: &AllocStats,
    after: &AllocStats,
) -> Result<(), Violation> {
    let acquired = after.acquired - before.acquired;
    let released = after.released - before.released;
    let (max_acquired, max_released) = match outcome {
        CopyOutcome::Reallocated => (1, 1),
        CopyOutcome::InPlace | CopyOutcome::Failed(_) => (0, 0),
    };
    ensure(
        acquired <= max_acquired && released <= max_released,
        "allocator traffic",
        || format!("{outcome:?}: {acquired} acquired, {released} released"),
    )?;
    if matches!(outcome, CopyOutcome::Reallocated) {
        ensure(acquired == 1, "reallocation acquires one block", || {
            format!("{acquired} acquired")
        })?;
    }
    Ok(())
}

/// Settings of a randomized copy check run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Number of generated list pairs.
    pub iterations: usize,
    /// Seed of the generator; runs with equal settings are reproducible.
    pub seed: u64,
    /// Largest item size in bytes.
    pub max_item_size: usize,
    /// Largest number of items in a generated list.
    pub max_items: usize,
    /// Probability that the destination allocator refuses the copy's allocation.
    pub failure_rate: f64,
    /// Optional cap on bytes held by all lists of one iteration.
    pub budget: Option<usize>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            iterations: 10_000,
            seed: 0x5eed,
            max_item_size: 2,
            max_items: 64,
            failure_rate: 0.1,
            budget: None,
        }
    }
}

impl CheckConfig {
    /// Largest buffer a single generated list may need.
    pub const MAX_LIST_BYTES: usize = 1 << 30;

    /// Checks that the settings describe lists that can be generated and allocated.
    pub fn validate(&self) -> dynarray::Result<()> {
        verify_arg!(max_item_size, self.max_item_size > 0);
        verify_arg!(failure_rate, (0.0..=1.0).contains(&self.failure_rate));
        let max_list_bytes = self
            .bounds()
            .max_list_bytes()
            .ok_or_else(dynarray::Error::size_overflow)?;
        verify_arg!(max_items, max_list_bytes <= Self::MAX_LIST_BYTES);
        Ok(())
    }

    pub fn bounds(&self) -> ListBounds {
        ListBounds {
            max_item_size: self.max_item_size.max(1),
            max_items: self.max_items,
        }
    }
}

/// Outcome counts of a check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub in_place: usize,
    pub reallocated: usize,
    pub destination_too_small: usize,
    pub allocation_failed: usize,
    pub size_overflow: usize,
    /// Iterations whose lists could not be built within the budget.
    pub skipped: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::InPlace => self.in_place += 1,
            CopyOutcome::Reallocated => self.reallocated += 1,
            CopyOutcome::Failed(CopyError::DestinationTooSmall { .. }) => {
                self.destination_too_small += 1
            }
            CopyOutcome::Failed(CopyError::AllocationFailed { .. }) => self.allocation_failed += 1,
            CopyOutcome::Failed(CopyError::SizeOverflow { .. }) => self.size_overflow += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.in_place
            + self.reallocated
            + self.destination_too_small
            + self.allocation_failed
            + self.size_overflow
            + self.skipped
    }
}

/// Runs `config.iterations` randomized copies, stopping at the first violation.
///
/// Lists are built with reliable allocation; the configured failure rate applies
/// only to the copy itself. With a budget, iterations whose lists do not fit are
/// skipped, and refusals during the copy count as allocation failures. After every
/// iteration all blocks must have been returned to the allocator.
pub fn run_checks(config: &CheckConfig) -> Result<OutcomeCounts, CheckError> {
    config.validate()?;
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let failing = Arc::new(FailingAllocator::new(FailurePolicy::Never));
    let limited: Arc<dyn Allocator> = match config.budget {
        Some(limit) => Arc::new(BudgetAllocator::new(failing.clone(), limit)),
        None => failing.clone(),
    };
    let tracker = Arc::new(TrackingAllocator::new(limited));
    let bounds = config.bounds();
    let mut counts = OutcomeCounts::default();

    for iteration in 0..config.iterations {
        let (source_shape, destination_shape) = data_gen::arbitrary_pair(&mut rng, &bounds);
        log::trace!("iteration {iteration}: {source_shape:?} -> {destination_shape:?}");

        failing.set_policy(FailurePolicy::Never);
        let mut source_backing = Vec::new();
        let mut destination_backing = Vec::new();
        let lists = build_pair(
            (&source_shape, &mut source_backing),
            (&destination_shape, &mut destination_backing),
            tracker.clone(),
            &mut rng,
        );
        let (source, mut destination) = match lists {
            Ok(lists) => lists,
            Err(e) if config.budget.is_some() && is_allocation_failure(&e) => {
                log::debug!("iteration {iteration}: lists exceed the budget ({e})");
                counts.skipped += 1;
                continue;
            }
            Err(e) => return Err(Violation::new("list generation", e.to_string()).into()),
        };

        failing.set_policy(FailurePolicy::random(config.failure_rate, rng.u64(..)));
        let outcome = check_copy(&source, &mut destination, Some(&*tracker))?;
        counts.record(&outcome);

        drop(source);
        drop(destination);
        let stats = tracker.stats();
        ensure(
            stats.live_blocks() == 0 && stats.outstanding_bytes == 0,
            "all blocks released on drop",
            || format!("iteration {iteration}: {stats:?}"),
        )?;
    }
    log::info!("{} copies checked: {counts:?}", config.iterations);
    Ok(counts)
}

fn build_pair<'a>(
    (source_shape, source_backing): (&ListShape, &'a mut Vec<u8>),
    (destination_shape, destination_backing): (&ListShape, &'a mut Vec<u8>),
    allocator: Arc<dyn Allocator>,
    rng: &mut fastrand::Rng,
) -> dynarray::Result<(ArrayList<'a>, ArrayList<'a>)> {
    let source = data_gen::build(source_shape, source_backing, allocator.clone(), rng)?;
    let destination = data_gen::build(destination_shape, destination_backing, allocator, rng)?;
    Ok((source, destination))
}

fn is_allocation_failure(e: &dynarray::Error) -> bool {
    matches!(e.kind(), ErrorKind::AllocationFailed { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_checks_default_bounds() {
        let config = CheckConfig {
            iterations: 2_000,
            ..Default::default()
        };
        let counts = run_checks(&config).unwrap();
        assert_eq!(counts.total(), 2_000);
        assert!(counts.in_place > 0);
        assert!(counts.reallocated > 0);
        assert!(counts.destination_too_small > 0);
        assert!(counts.allocation_failed > 0);
        assert_eq!(counts.size_overflow, 0);
    }

    #[test]
    fn test_run_checks_is_reproducible() {
        let config = CheckConfig {
            iterations: 300,
            seed: 99,
            max_item_size: 16,
            max_items: 10,
            failure_rate: 0.3,
            budget: None,
        };
        let first = run_checks(&config).unwrap();
        assert_eq!(first, run_checks(&config).unwrap());
    }

    #[test]
    fn test_run_checks_with_budget() {
        let config = CheckConfig {
            iterations: 1_000,
            max_item_size: 4,
            failure_rate: 0.0,
            budget: Some(96),
            ..Default::default()
        };
        let counts = run_checks(&config).unwrap();
        assert_eq!(counts.total(), 1_000);
        assert!(counts.skipped > 0);
        assert!(counts.allocation_failed > 0);
    }

    #[test]
    fn test_run_checks_rejects_unbounded_lists() {
        for max_items in [usize::MAX, usize::MAX / 4, CheckConfig::MAX_LIST_BYTES] {
            let config = CheckConfig {
                iterations: 1,
                max_items,
                max_item_size: 2,
                ..Default::default()
            };
            assert!(matches!(run_checks(&config), Err(CheckError::Config(_))));
        }
    }

    #[test]
    fn test_validate() {
        assert!(CheckConfig::default().validate().is_ok());
        let bad_rate = CheckConfig {
            failure_rate: 2.0,
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());
        let wide = CheckConfig {
            max_item_size: usize::MAX,
            max_items: 0,
            ..Default::default()
        };
        assert!(wide.validate().is_err());
        let overflowing = CheckConfig {
            max_item_size: usize::MAX,
            max_items: 1,
            ..Default::default()
        };
        assert!(overflowing.validate().unwrap_err().is_size_overflow());
    }

    #[test]
    fn test_check_config_from_json() {
        let config: CheckConfig =
            serde_json::from_str(r#"{ "iterations": 5, "max_item_size": 8 }"#).unwrap();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.max_item_size, 8);
        assert_eq!(config.seed, CheckConfig::default().seed);
        assert_eq!(config.budget, None);

        let config: CheckConfig = serde_json::from_str(r#"{ "budget": 4096 }"#).unwrap();
        assert_eq!(config.budget, Some(4096));
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::new("length equal on success", "3 != 4");
        assert_eq!(
            v.to_string(),
            "copy property violated: length equal on success (3 != 4)"
        );
    }
}
