//! Round-based ingestion of new candidates
//!
//! Candidates are grouped by category and part number. Each round works on a
//! single part number, visits categories in random order and admits up to the
//! per-category cap from each. A part is repeated until no category has
//! candidates left for it, then the next part with candidates is taken. The
//! budget check happens after every admission, so the selection may overshoot
//! by at most one item; the reducer corrects that afterwards.

use crate::copy::copy_into_selection;
use crate::scanner::SourceScanner;
use crate::selection::SelectionDir;
use rand::seq::SliceRandom;
use rand::Rng;
use selecta_core::{format_bytes, CatalogEntry, Manifest, Result};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::PathBuf;

/// Ingestion limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub budget_bytes: u64,
    /// 0 = unlimited
    pub max_per_category_per_round: usize,
}

/// Result of an ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Canonical names admitted, in admission order
    pub admitted: Vec<String>,
    pub admitted_bytes: u64,
    /// Candidates that vanished or collided and were skipped
    pub skipped: usize,
    pub rounds: usize,
}

impl IngestOutcome {
    pub fn admitted_count(&self) -> usize {
        self.admitted.len()
    }
}

/// Candidates keyed by category, then part number
///
/// Category keys are sorted so a seeded RNG reproduces the same plan.
#[derive(Debug, Clone, Default)]
pub struct IngestPlan {
    groups: BTreeMap<String, BTreeMap<u32, VecDeque<CatalogEntry>>>,
}

impl IngestPlan {
    /// Group a catalog and shuffle every (category, part) group
    pub fn new<R: Rng + ?Sized>(catalog: Vec<CatalogEntry>, rng: &mut R) -> Self {
        let mut grouped: BTreeMap<String, BTreeMap<u32, Vec<CatalogEntry>>> = BTreeMap::new();
        for entry in catalog {
            grouped
                .entry(entry.category().to_string())
                .or_default()
                .entry(entry.part_number())
                .or_default()
                .push(entry);
        }

        let groups = grouped
            .into_iter()
            .map(|(category, parts)| {
                let parts = parts
                    .into_iter()
                    .map(|(part, mut entries)| {
                        entries.shuffle(rng);
                        (part, VecDeque::from(entries))
                    })
                    .collect();
                (category, parts)
            })
            .collect();

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups
            .values()
            .all(|parts| parts.values().all(VecDeque::is_empty))
    }

    pub fn remaining(&self) -> usize {
        self.groups
            .values()
            .flat_map(|parts| parts.values())
            .map(VecDeque::len)
            .sum()
    }

    /// Categories that still hold candidates for `part`
    fn categories_at(&self, part: u32) -> Vec<String> {
        self.groups
            .iter()
            .filter(|(_, parts)| parts.get(&part).is_some_and(|q| !q.is_empty()))
            .map(|(category, _)| category.clone())
            .collect()
    }

    /// Smallest part number above `part` that any category still holds
    fn next_part_after(&self, part: u32) -> Option<u32> {
        self.groups
            .values()
            .flat_map(|parts| parts.iter())
            .filter(|(p, q)| **p > part && !q.is_empty())
            .map(|(p, _)| *p)
            .min()
    }

    fn take(&mut self, category: &str, part: u32, cap: usize) -> Vec<CatalogEntry> {
        let Some(queue) = self.groups.get_mut(category).and_then(|parts| parts.get_mut(&part)) else {
            return Vec::new();
        };
        let take = if cap == 0 { queue.len() } else { cap.min(queue.len()) };
        queue.drain(..take).collect()
    }
}

/// Scan the source pools and admit new items until the budget is reached
///
/// `exclude` holds canonical names that must not be re-admitted in this run
/// (items the reducer just evicted).
pub fn ingest<R: Rng + ?Sized>(
    manifest: &mut Manifest,
    source_pools: &[PathBuf],
    scanner: &SourceScanner,
    selection: &SelectionDir,
    options: IngestOptions,
    exclude: &HashSet<String>,
    rng: &mut R,
) -> Result<IngestOutcome> {
    if options.budget_bytes == 0 {
        tracing::info!("Budget is zero, nothing to ingest");
        return Ok(IngestOutcome::default());
    }

    let mut known: HashSet<String> = manifest
        .items
        .iter()
        .map(|i| i.canonical_name.clone())
        .collect();
    known.extend(exclude.iter().cloned());

    let catalog = scanner.catalog(source_pools, &known);
    let plan = IngestPlan::new(catalog, rng);
    admit_rounds(manifest, plan, selection, options, rng)
}

/// Run admission rounds over a prepared plan
pub fn admit_rounds<R: Rng + ?Sized>(
    manifest: &mut Manifest,
    mut plan: IngestPlan,
    selection: &SelectionDir,
    options: IngestOptions,
    rng: &mut R,
) -> Result<IngestOutcome> {
    let budget = options.budget_bytes;
    let mut outcome = IngestOutcome::default();
    let mut total = manifest.total_bytes();
    let mut part = 1u32;

    'rounds: while total < budget {
        let mut categories = plan.categories_at(part);
        if categories.is_empty() {
            match plan.next_part_after(part) {
                Some(next) => {
                    part = next;
                    continue;
                }
                None => break,
            }
        }

        outcome.rounds += 1;
        categories.shuffle(rng);
        tracing::info!("Round {} - part {} ({} categories)", outcome.rounds, part, categories.len());

        for category in categories {
            for entry in plan.take(&category, part, options.max_per_category_per_round) {
                let Some(item) = copy_into_selection(&entry, selection)? else {
                    outcome.skipped += 1;
                    continue;
                };

                total += item.size_bytes;
                outcome.admitted_bytes += item.size_bytes;
                tracing::info!(
                    "Copied: {} ({}) | accumulated {} / {}",
                    item.canonical_name,
                    format_bytes(item.size_bytes),
                    format_bytes(total),
                    format_bytes(budget)
                );
                outcome.admitted.push(item.canonical_name.clone());
                manifest.push(item);

                if total >= budget {
                    break 'rounds;
                }
            }
        }
    }

    tracing::info!(
        "Ingestion finished: {} admitted ({}), {} skipped, {} candidates left",
        outcome.admitted.len(),
        format_bytes(outcome.admitted_bytes),
        outcome.skipped,
        plan.remaining()
    );

    Ok(outcome)
}
