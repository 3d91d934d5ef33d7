/// Subcommand implementations
use crate::config::CliConfig;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use selecta_core::{format_bytes, Manifest};
use selecta_curator::{ConfirmGate, RotationController, RotationSummary, SelectionLock};
use std::fmt::Write as _;

/// Seeded RNG when a seed is given, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

pub fn run(config: &CliConfig, gate: &dyn ConfirmGate, seed: Option<u64>) -> Result<RotationSummary> {
    let mut controller = RotationController::from_config(config.to_rotation_config())?;
    let mut rng = make_rng(seed);
    Ok(controller.run(&mut rng, gate)?)
}

pub fn status(config: &CliConfig) -> Result<String> {
    let controller = RotationController::from_config(config.to_rotation_config())?;
    let manifest = controller.status()?;
    Ok(render_status(&manifest, config.budget()))
}

pub fn rebuild(config: &CliConfig) -> Result<Manifest> {
    let mut controller = RotationController::from_config(config.to_rotation_config())?;
    Ok(controller.rebuild()?)
}

pub fn shuffle(config: &CliConfig, seed: Option<u64>) -> Result<RotationSummary> {
    let mut controller = RotationController::from_config(config.to_rotation_config())?;
    let mut rng = make_rng(seed);
    Ok(controller.resequence(&mut rng)?)
}

/// Remove a stale run lock; returns whether one was present
pub fn unlock(config: &CliConfig) -> Result<bool> {
    Ok(SelectionLock::force_release(&config.selection_path)?)
}

/// Human-readable selection overview
pub fn render_status(manifest: &Manifest, budget_bytes: u64) -> String {
    let total = manifest.total_bytes();
    let mut out = String::new();
    let _ = writeln!(out, "Items:  {}", manifest.count());
    let _ = writeln!(out, "Total:  {}", format_bytes(total));
    let _ = writeln!(
        out,
        "Budget: {}{}",
        format_bytes(budget_bytes),
        if total > budget_bytes { " (over budget)" } else { "" }
    );

    let counts = manifest.category_counts();
    if !counts.is_empty() {
        let _ = writeln!(out, "Categories:");
        for (category, count) in counts {
            let _ = writeln!(out, "  {category}: {count}");
        }
    }
    out
}
