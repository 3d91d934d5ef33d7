//! Replay order sequencing
//!
//! Items are interleaved by category and renamed on disk with a zero padded
//! ordinal prefix (`0001 - Category - Title.mp4`), so a player that simply
//! sorts the directory plays them in that order.

use crate::selection::SelectionDir;
use rand::seq::SliceRandom;
use rand::Rng;
use selecta_core::{format_ordinal_name, CategoryGroups, Item, Manifest};

/// Result of a sequencing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub renamed: usize,
    pub rename_failures: usize,
    /// Neighbouring items sharing a category in the new order
    pub adjacent_pairs: usize,
}

/// Interleave category groups into a single replay order
///
/// Each group is shuffled, then every step emits from the category with the
/// most items left, excluding the one just emitted (random tie-break). Two
/// neighbours share a category only when one category holds a strict
/// majority of all items.
pub fn plan_order<R: Rng + ?Sized>(groups: CategoryGroups, rng: &mut R) -> Vec<Item> {
    let mut queues: Vec<Vec<Item>> = groups
        .into_values()
        .map(|mut items| {
            items.shuffle(rng);
            items
        })
        .collect();

    let total: usize = queues.iter().map(Vec::len).sum();
    let mut order = Vec::with_capacity(total);
    let mut last: Option<usize> = None;

    while order.len() < total {
        let mut candidates: Vec<usize> = (0..queues.len())
            .filter(|&i| !queues[i].is_empty() && Some(i) != last)
            .collect();
        if candidates.is_empty() {
            // Only the previous category is left
            candidates.extend(last);
        }
        candidates.shuffle(rng);

        let Some(pick) = candidates.into_iter().max_by_key(|&i| queues[i].len()) else {
            break;
        };
        let Some(item) = queues[pick].pop() else {
            break;
        };
        order.push(item);
        last = Some(pick);
    }

    order
}

/// Count neighbouring items that share a category
pub fn adjacent_pairs(items: &[Item]) -> usize {
    items
        .windows(2)
        .filter(|pair| pair[0].category == pair[1].category)
        .count()
}

/// Reorder the manifest and rename every file to its new ordinal name
///
/// A failed rename is logged and the item keeps its old name; the run goes on.
pub fn sequence<R: Rng + ?Sized>(
    manifest: &mut Manifest,
    selection: &SelectionDir,
    rng: &mut R,
) -> SequenceOutcome {
    let ordered = plan_order(manifest.take_category_groups(), rng);
    let mut outcome = SequenceOutcome {
        adjacent_pairs: adjacent_pairs(&ordered),
        ..Default::default()
    };

    if outcome.adjacent_pairs > 0 {
        tracing::warn!(
            "One category dominates the selection; {} adjacent pairs could not be avoided",
            outcome.adjacent_pairs
        );
    }

    for (index, mut item) in ordered.into_iter().enumerate() {
        let new_name = format_ordinal_name(index + 1, &item.canonical_name);
        if new_name != item.current_name {
            match selection.rename(&item.current_name, &new_name) {
                Ok(()) => {
                    tracing::info!("Renamed: {} -> {}", item.current_name, new_name);
                    item.current_name = new_name;
                    outcome.renamed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to rename {} to {}: {}", item.current_name, new_name, e);
                    outcome.rename_failures += 1;
                }
            }
        }
        manifest.push(item);
    }

    tracing::info!(
        "Sequenced {} items: {} renamed, {} failures",
        manifest.count(),
        outcome.renamed,
        outcome.rename_failures
    );
    outcome
}
