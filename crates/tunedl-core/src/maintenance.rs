//! Bulk removal of job records.

use tracing::info;

use crate::job::JobRegistry;

/// Outcome of [`clear_jobs`]. `remaining` is only reported for a selective clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub cleared_count: usize,
    pub remaining: Option<usize>,
}

impl ClearOutcome {
    pub fn message(&self) -> String {
        match self.remaining {
            None => format!("Cleared {} downloads", self.cleared_count),
            Some(_) => format!("Cleared {} completed/failed downloads", self.cleared_count),
        }
    }
}

/// Drop every record when `all` is set, otherwise only terminal ones.
///
/// In-flight workers whose records are removed keep running; their later
/// writes are discarded.
pub async fn clear_jobs(registry: &JobRegistry, all: bool) -> ClearOutcome {
    let outcome = if all {
        ClearOutcome {
            cleared_count: registry.clear().await,
            remaining: None,
        }
    } else {
        let (cleared_count, remaining) = registry
            .remove_where(|record| record.status().is_terminal())
            .await;
        ClearOutcome {
            cleared_count,
            remaining: Some(remaining),
        }
    };
    info!(all, cleared = outcome.cleared_count, remaining = ?outcome.remaining, "cleared jobs");
    outcome
}
