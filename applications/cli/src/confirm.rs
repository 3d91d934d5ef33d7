/// Interactive confirmation for re-sequencing an unchanged selection
use selecta_core::{format_bytes, Manifest};
use selecta_curator::ConfirmGate;
use std::io::{self, BufRead, Write};

/// Asks on stdin; anything but an explicit yes declines
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm_resequence(&self, manifest: &Manifest) -> bool {
        let mut stdout = io::stdout();
        let _ = write!(
            stdout,
            "No changes in the selection ({} items, {}). Reshuffle the order anyway? (y/n) ",
            manifest.count(),
            format_bytes(manifest.total_bytes())
        );
        let _ = stdout.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read answer ({}), keeping the current order", e);
                false
            }
        }
    }
}

/// Whether a typed answer means yes
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}
