use crate::{
    ingest::{ingest, IngestOptions},
    lock::SelectionLock,
    reconcile::{reconcile, Reconciliation},
    reduce::{purge_flagged, reduce, ReduceOutcome},
    scanner::SourceScanner,
    selection::SelectionDir,
    sequence::sequence,
    store::ManifestStore,
    RotationConfig, RotationPhase, RotationSummary,
};
use rand::Rng;
use selecta_core::{format_bytes, Manifest, Result, SelectaError};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Decides whether an unchanged selection should be re-sequenced anyway
pub trait ConfirmGate {
    fn confirm_resequence(&self, manifest: &Manifest) -> bool;
}

/// Always re-sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmGate for AlwaysConfirm {
    fn confirm_resequence(&self, _manifest: &Manifest) -> bool {
        true
    }
}

/// Never re-sequence an unchanged selection
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl ConfirmGate for NeverConfirm {
    fn confirm_resequence(&self, _manifest: &Manifest) -> bool {
        false
    }
}

/// Main rotation controller that drives one curation run
///
/// Each stage runs to completion before the next begins, and every stage that
/// changes the manifest is persisted before moving on.
pub struct RotationController {
    config: RotationConfig,
    selection: SelectionDir,
    scanner: SourceScanner,
    store: ManifestStore,
    phase: RotationPhase,
}

impl RotationController {
    pub fn new(config: RotationConfig, store: ManifestStore) -> Result<Self> {
        config.validate()?;
        let selection = SelectionDir::new(
            &config.selection_path,
            &config.extensions,
            &config.manifest_file_name,
        );
        let scanner = SourceScanner::new(&config.extensions).max_depth(config.scan_depth);
        Ok(Self {
            config,
            selection,
            scanner,
            store,
            phase: RotationPhase::Idle,
        })
    }

    /// Controller whose manifest lives at the configured name in the selection
    pub fn from_config(config: RotationConfig) -> Result<Self> {
        let store = ManifestStore::new(config.selection_path.join(&config.manifest_file_name));
        Self::new(config, store)
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    /// Run the full pipeline: reconcile, reduce, ingest, reduce, sequence
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R, gate: &dyn ConfirmGate) -> Result<RotationSummary> {
        self.selection.initialize()?;
        let _lock = SelectionLock::acquire(self.selection.path())?;
        let budget = self.config.budget_bytes;
        let mut summary = RotationSummary {
            run_id: Uuid::new_v4().to_string(),
            target_bytes: budget,
            ..Default::default()
        };

        info!(
            "Starting rotation {} (budget {}, {} source pools)",
            summary.run_id,
            format_bytes(budget),
            self.config.source_paths.len()
        );

        let result = self.run_pipeline(rng, gate, &mut summary);
        self.set_phase(RotationPhase::Idle);

        match result {
            Ok(manifest) => {
                summary.final_bytes = manifest.total_bytes();
                summary.item_count = manifest.count();
                summary.budget_satisfied = summary.final_bytes <= budget;
                if manifest.is_empty() && summary.evicted > 0 {
                    warn!(
                        "Budget {} is smaller than every available item; the selection is empty",
                        format_bytes(budget)
                    );
                }
                info!("{}", summary.summary_text());
                Ok(summary)
            }
            Err(e) => {
                error!("Rotation {} aborted: {}", summary.run_id, e);
                Err(e)
            }
        }
    }

    fn run_pipeline<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        gate: &dyn ConfirmGate,
        summary: &mut RotationSummary,
    ) -> Result<Manifest> {
        let budget = self.config.budget_bytes;

        // Phase 1: Reconciling
        let (
            Reconciliation {
                mut manifest,
                added,
                removed,
            },
            purged,
        ) = self.load_reconciled()?;
        summary.reconciled_added = added.len();
        summary.reconciled_removed = removed.len();
        summary.evicted = purged.evicted_count();
        summary.evicted_bytes = purged.evicted_bytes;
        let manual_changes = !added.is_empty() || !removed.is_empty();

        // Phase 2: Reducing (manual additions may have pushed us over)
        let mut evicted_names: HashSet<String> = purged.evicted_names().map(str::to_string).collect();
        if manifest.total_bytes() > budget {
            self.reduce_and_save(&mut manifest, rng, summary, &mut evicted_names)?;
        }

        // Phase 3: Ingesting, skipped entirely when already at budget
        if manifest.total_bytes() < budget {
            self.set_phase(RotationPhase::Ingesting);
            let outcome = ingest(
                &mut manifest,
                &self.config.source_paths,
                &self.scanner,
                &self.selection,
                IngestOptions {
                    budget_bytes: budget,
                    max_per_category_per_round: self.config.max_per_category_per_round,
                },
                &evicted_names,
                rng,
            )?;
            summary.admitted = outcome.admitted_count();
            summary.admitted_bytes = outcome.admitted_bytes;
            if summary.admitted > 0 {
                self.persist(&mut manifest)?;
            }
        } else {
            debug!("Selection already at budget, skipping ingestion");
        }

        // Phase 4: Reducing the ingestion overshoot
        if manifest.total_bytes() > budget {
            self.reduce_and_save(&mut manifest, rng, summary, &mut evicted_names)?;
        }

        // Phase 5: Sequencing
        if self.config.randomize_final_order {
            let changed = summary.admitted > 0 || manual_changes || summary.evicted > 0;
            if changed || gate.confirm_resequence(&manifest) {
                self.sequence_and_save(&mut manifest, rng, summary)?;
            } else {
                debug!("Selection unchanged and re-sequencing declined");
            }
        }

        Ok(manifest)
    }

    /// Reconciled view of the selection without touching the disk
    pub fn status(&self) -> Result<Manifest> {
        if !self.selection.path().is_dir() {
            return Err(SelectaError::SelectionMissing(
                self.selection.path().display().to_string(),
            ));
        }
        let listing = self.selection.list_media()?;
        let manifest = self
            .store
            .load()?
            .unwrap_or_else(|| Manifest::new(self.config.budget_bytes));
        let mut reconciled = reconcile(manifest, &listing, &self.selection).manifest;
        reconciled.target_bytes = self.config.budget_bytes;
        Ok(reconciled)
    }

    /// Throw the manifest away and rebuild it from the selection directory
    pub fn rebuild(&mut self) -> Result<Manifest> {
        self.selection.initialize()?;
        let _lock = SelectionLock::acquire(self.selection.path())?;
        self.store.discard()?;
        info!("Manifest discarded, rebuilding from {}", self.selection.path().display());

        let (reconciled, _) = self.load_reconciled()?;
        self.set_phase(RotationPhase::Idle);
        Ok(reconciled.manifest)
    }

    /// Re-sequence the selection regardless of the confirmation gate
    pub fn resequence<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RotationSummary> {
        self.selection.initialize()?;
        let _lock = SelectionLock::acquire(self.selection.path())?;
        let mut summary = RotationSummary {
            run_id: Uuid::new_v4().to_string(),
            target_bytes: self.config.budget_bytes,
            ..Default::default()
        };

        let (
            Reconciliation {
                mut manifest,
                added,
                removed,
            },
            purged,
        ) = self.load_reconciled()?;
        summary.reconciled_added = added.len();
        summary.reconciled_removed = removed.len();
        summary.evicted = purged.evicted_count();
        summary.evicted_bytes = purged.evicted_bytes;
        self.sequence_and_save(&mut manifest, rng, &mut summary)?;
        self.set_phase(RotationPhase::Idle);

        summary.final_bytes = manifest.total_bytes();
        summary.item_count = manifest.count();
        summary.budget_satisfied = summary.final_bytes <= summary.target_bytes;
        info!("{}", summary.summary_text());
        Ok(summary)
    }

    /// Load the manifest (or start empty) and absorb manual disk changes
    ///
    /// Entries flagged during reconciliation are purged straight away, so no
    /// saved manifest points at a file that could not be read. Saves when
    /// anything changed, when no valid manifest existed, or when the
    /// configured budget differs from the recorded one.
    fn load_reconciled(&mut self) -> Result<(Reconciliation, ReduceOutcome)> {
        self.set_phase(RotationPhase::Reconciling);
        let listing = self.selection.list_media()?;
        let loaded = self.store.load()?;
        let was_missing = loaded.is_none();
        if was_missing {
            info!("No usable manifest, rebuilding from the selection directory");
        }

        let manifest = loaded.unwrap_or_else(|| Manifest::new(self.config.budget_bytes));
        let mut reconciled = reconcile(manifest, &listing, &self.selection);
        let budget_changed = reconciled.manifest.target_bytes != self.config.budget_bytes;
        reconciled.manifest.target_bytes = self.config.budget_bytes;
        let purged = purge_flagged(&mut reconciled.manifest, &self.selection)?;

        if reconciled.changed() || was_missing || budget_changed || purged.evicted_count() > 0 {
            self.persist(&mut reconciled.manifest)?;
        }
        Ok((reconciled, purged))
    }

    fn reduce_and_save<R: Rng + ?Sized>(
        &mut self,
        manifest: &mut Manifest,
        rng: &mut R,
        summary: &mut RotationSummary,
        evicted_names: &mut HashSet<String>,
    ) -> Result<()> {
        self.set_phase(RotationPhase::Reducing);
        info!(
            "Selection over budget ({} / {}), reducing",
            format_bytes(manifest.total_bytes()),
            format_bytes(self.config.budget_bytes)
        );

        let outcome = reduce(manifest, &self.selection, self.config.budget_bytes, rng)?;
        summary.evicted += outcome.evicted_count();
        summary.evicted_bytes += outcome.evicted_bytes;
        evicted_names.extend(outcome.evicted_names().map(str::to_string));

        if outcome.evicted_count() > 0 {
            self.persist(manifest)?;
        }
        Ok(())
    }

    fn sequence_and_save<R: Rng + ?Sized>(
        &mut self,
        manifest: &mut Manifest,
        rng: &mut R,
        summary: &mut RotationSummary,
    ) -> Result<()> {
        self.set_phase(RotationPhase::Sequencing);
        let outcome = sequence(manifest, &self.selection, rng);
        summary.renamed += outcome.renamed;
        summary.rename_failures += outcome.rename_failures;
        summary.sequenced = true;
        self.persist(manifest)
    }

    fn persist(&mut self, manifest: &mut Manifest) -> Result<()> {
        self.store.save(manifest)?;
        self.set_phase(RotationPhase::Persisted);
        Ok(())
    }

    fn set_phase(&mut self, phase: RotationPhase) {
        if self.phase != phase {
            debug!("Phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}
