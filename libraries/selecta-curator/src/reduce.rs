//! Budget reduction
//!
//! Eviction levels categories: each step takes one item, highest part first,
//! from a category that currently holds the most items. Ties are broken at
//! random. A category whose losses would run more than
//! `ceil(removed / categories) + 1` ahead of the least-touched category is
//! passed over for the next-largest one, so uneven categories stay within
//! that bound until the smaller ones run dry. Items flagged during
//! reconciliation are purged before anything else.

use crate::selection::SelectionDir;
use rand::seq::SliceRandom;
use rand::Rng;
use selecta_core::{format_bytes, Item, Manifest, Result};
use std::collections::BTreeMap;

/// Result of a reduction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceOutcome {
    /// Evicted items, in eviction order
    pub evicted: Vec<Item>,
    pub evicted_bytes: u64,
    /// Evicted items whose file was already gone
    pub already_missing: usize,
}

impl ReduceOutcome {
    pub fn evicted_count(&self) -> usize {
        self.evicted.len()
    }

    /// Canonical names of the evicted items
    pub fn evicted_names(&self) -> impl Iterator<Item = &str> {
        self.evicted.iter().map(|i| i.canonical_name.as_str())
    }
}

/// Per-category eviction state used while planning
struct Group {
    /// Remaining members; the next victim sits last
    members: Vec<usize>,
    lost: usize,
}

/// Choose which items to evict, returning indices into `items` in order
///
/// Pure planning step; nothing is touched on disk.
pub fn plan_evictions<R: Rng + ?Sized>(items: &[Item], budget_bytes: u64, rng: &mut R) -> Vec<usize> {
    let mut order = Vec::new();
    let mut total: u64 = 0;
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();

    for (index, item) in items.iter().enumerate() {
        if item.pending_eviction {
            order.push(index);
            continue;
        }
        total += item.size_bytes;
        groups
            .entry(item.category.as_str())
            .or_insert_with(|| Group { members: Vec::new(), lost: 0 })
            .members
            .push(index);
    }

    // Ties on part number are broken at random; the highest part sits last
    for group in groups.values_mut() {
        group.members.shuffle(rng);
        group.members.sort_by_key(|&i| items[i].part_number);
    }

    let mut removed = 0;
    while total > budget_bytes {
        let Some(category) = next_victim(&groups, removed, rng) else {
            break;
        };
        let Some(group) = groups.get_mut(category) else {
            break;
        };
        let Some(index) = group.members.pop() else {
            break;
        };
        group.lost += 1;
        removed += 1;
        total -= items[index].size_bytes;
        order.push(index);
    }

    order
}

/// Category to evict from next, or `None` when every group is empty
fn next_victim<'a, R: Rng + ?Sized>(
    groups: &BTreeMap<&'a str, Group>,
    removed: usize,
    rng: &mut R,
) -> Option<&'a str> {
    let least_lost = groups.values().map(|g| g.lost).min()?;
    let allowance = (removed + 1).div_ceil(groups.len()) + 1;

    let non_empty = || groups.iter().filter(|(_, g)| !g.members.is_empty());
    let mut eligible: Vec<(&'a str, &Group)> = non_empty()
        .filter(|(_, g)| g.lost + 1 - least_lost <= allowance)
        .map(|(c, g)| (*c, g))
        .collect();

    if eligible.is_empty() {
        // Only the least-touched categories are exhausted; take from whoever lost least
        let floor = non_empty().map(|(_, g)| g.lost).min()?;
        eligible = non_empty()
            .filter(|(_, g)| g.lost == floor)
            .map(|(c, g)| (*c, g))
            .collect();
    }

    let largest = eligible.iter().map(|(_, g)| g.members.len()).max()?;
    let leaders: Vec<&'a str> = eligible
        .into_iter()
        .filter(|(_, g)| g.members.len() == largest)
        .map(|(c, _)| c)
        .collect();
    leaders.choose(rng).copied()
}

/// Evict items until the manifest fits `budget_bytes`
///
/// Files already missing on disk are logged and their entries dropped anyway.
/// Any other delete failure aborts the reduction.
pub fn reduce<R: Rng + ?Sized>(
    manifest: &mut Manifest,
    selection: &SelectionDir,
    budget_bytes: u64,
    rng: &mut R,
) -> Result<ReduceOutcome> {
    let plan = plan_evictions(&manifest.items, budget_bytes, rng);
    let names: Vec<String> = plan
        .into_iter()
        .map(|i| manifest.items[i].current_name.clone())
        .collect();

    evict(manifest, selection, names, budget_bytes)
}

/// Evict every item flagged during reconciliation, whatever the budget
pub fn purge_flagged(manifest: &mut Manifest, selection: &SelectionDir) -> Result<ReduceOutcome> {
    let names: Vec<String> = manifest
        .items
        .iter()
        .filter(|i| i.pending_eviction)
        .map(|i| i.current_name.clone())
        .collect();
    if names.is_empty() {
        return Ok(ReduceOutcome::default());
    }

    tracing::info!("Purging {} entries flagged during reconciliation", names.len());
    let budget_bytes = manifest.target_bytes;
    evict(manifest, selection, names, budget_bytes)
}

fn evict(
    manifest: &mut Manifest,
    selection: &SelectionDir,
    names: Vec<String>,
    budget_bytes: u64,
) -> Result<ReduceOutcome> {
    let mut outcome = ReduceOutcome::default();
    for name in names {
        if !selection.remove(&name)? {
            tracing::warn!("{} already missing on disk, dropping its entry", name);
            outcome.already_missing += 1;
        }
        let Some(item) = manifest.remove_by_current_name(&name) else {
            continue;
        };

        outcome.evicted_bytes += item.size_bytes;
        tracing::info!(
            "Evicted: {} ({}) | remaining {} / {}",
            item.current_name,
            format_bytes(item.size_bytes),
            format_bytes(manifest.total_bytes()),
            format_bytes(budget_bytes)
        );
        outcome.evicted.push(item);
    }

    Ok(outcome)
}
