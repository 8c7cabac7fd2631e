//! Terminal progress display for clustering runs.
//!
//! A clustering task reports two steps per solution: the first half of the bar covers loading
//! structures, the second half covers the RMSD comparisons. The status line follows that split
//! and keeps a count of solutions whose structures could not be loaded.

use gaudiview::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stage {
    #[default]
    Idle,
    Loading,
    Comparing,
    Finished,
}

impl Stage {
    /// Where a task of `total` steps stands after `position` of them.
    fn at(position: u64, total: u64) -> Self {
        if total == 0 {
            Stage::Idle
        } else if position >= total {
            Stage::Finished
        } else if position < total / 2 {
            Stage::Loading
        } else {
            Stage::Comparing
        }
    }

    fn label(self) -> &'static str {
        match self {
            Stage::Idle => "Waiting",
            Stage::Loading => "Loading structures",
            Stage::Comparing => "Comparing RMSD",
            Stage::Finished => "Done",
        }
    }
}

/// The key of a "Skipping '<key>': ..." notice, if `message` is one.
fn skipped_key(message: &str) -> Option<&str> {
    message
        .strip_prefix("Skipping '")?
        .split_once("':")
        .map(|(key, _)| key)
}

#[derive(Debug, Default)]
struct Tracker {
    phase: Option<&'static str>,
    stage: Stage,
    skipped: Vec<String>,
}

impl Tracker {
    fn started(phase: &'static str) -> Self {
        Self {
            phase: Some(phase),
            ..Self::default()
        }
    }

    fn skipped_suffix(&self) -> String {
        match self.skipped.len() {
            0 => String::new(),
            n => format!(" ({} skipped)", n),
        }
    }

    fn status(&self) -> String {
        format!("{}{}", self.stage.label(), self.skipped_suffix())
    }

    fn summary(&self) -> String {
        format!(
            "✓ {} done{}",
            self.phase.unwrap_or("Task"),
            self.skipped_suffix()
        )
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
    tracker: Arc<Mutex<Tracker>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target)
            .with_style(Self::spinner_style())
            .with_message(Stage::Idle.label());
        bar.finish_and_clear();

        Self {
            bar,
            tracker: Arc::new(Mutex::new(Tracker::default())),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        let tracker = Arc::clone(&self.tracker);

        Box::new(move |progress: Progress| {
            let Ok(mut tracker) = tracker.lock() else {
                warn!("Progress tracker mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    *tracker = Tracker::started(name);
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(Self::spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    bar.set_message(name);
                }
                Progress::TaskStart { total_steps } => {
                    bar.disable_steady_tick();
                    bar.reset();
                    bar.set_length(total_steps);
                    bar.set_position(0);
                    bar.set_style(Self::bar_style());
                    tracker.stage = Stage::at(0, total_steps);
                    bar.set_message(tracker.status());
                }
                Progress::TaskIncrement => {
                    bar.inc(1);
                    let stage = Stage::at(bar.position(), bar.length().unwrap_or(0));
                    if stage != tracker.stage {
                        tracker.stage = stage;
                        bar.set_message(tracker.status());
                    }
                }
                Progress::TaskFinish => {
                    bar.set_position(bar.length().unwrap_or(0));
                    tracker.stage = Stage::Finished;
                    bar.set_message(tracker.status());
                }
                Progress::PhaseFinish => {
                    bar.disable_steady_tick();
                    bar.finish_with_message(tracker.summary());
                }
                Progress::Message(msg) => match skipped_key(&msg) {
                    Some(key) => {
                        tracker.skipped.push(key.to_string());
                        bar.set_message(tracker.status());
                        bar.println(format!("  {}", msg));
                    }
                    None => debug!("{}", msg),
                },
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("=>-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden() -> CliProgressHandler {
        CliProgressHandler::with_target(ProgressDrawTarget::hidden())
    }

    fn skipped(handler: &CliProgressHandler) -> Vec<String> {
        handler.tracker.lock().unwrap().skipped.clone()
    }

    #[test]
    fn stage_follows_the_load_then_compare_split() {
        assert_eq!(Stage::at(0, 0), Stage::Idle);
        assert_eq!(Stage::at(0, 6), Stage::Loading);
        assert_eq!(Stage::at(2, 6), Stage::Loading);
        assert_eq!(Stage::at(3, 6), Stage::Comparing);
        assert_eq!(Stage::at(5, 6), Stage::Comparing);
        assert_eq!(Stage::at(6, 6), Stage::Finished);
    }

    #[test]
    fn skip_notices_yield_their_key() {
        assert_eq!(
            skipped_key("Skipping 'ligand_001': structures unavailable"),
            Some("ligand_001")
        );
        assert_eq!(skipped_key("Loading the solutions..."), None);
        assert_eq!(skipped_key("Skipping everything"), None);
    }

    #[test]
    fn clustering_run_moves_from_loading_to_comparing() {
        let handler = hidden();
        let callback = handler.callback();

        callback(Progress::PhaseStart { name: "Clustering" });
        assert_eq!(handler.bar.message(), "Clustering");

        callback(Progress::TaskStart { total_steps: 6 });
        callback(Progress::Message("Loading the solutions...".to_string()));
        assert_eq!(handler.bar.message(), "Loading structures");

        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        callback(Progress::Message(
            "Skipping 'B': structures unavailable".to_string(),
        ));
        assert_eq!(handler.bar.message(), "Loading structures (1 skipped)");

        callback(Progress::TaskIncrement);
        assert_eq!(handler.bar.position(), 3);
        assert_eq!(handler.bar.message(), "Comparing RMSD (1 skipped)");

        callback(Progress::Message("Calculating RMSD...".to_string()));
        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);
        assert_eq!(handler.bar.position(), 6);
        assert_eq!(handler.bar.message(), "Done (1 skipped)");

        callback(Progress::PhaseFinish);
        assert!(handler.bar.is_finished());
        assert_eq!(handler.bar.message(), "✓ Clustering done (1 skipped)");
        assert_eq!(skipped(&handler), vec!["B".to_string()]);
    }

    #[test]
    fn a_new_phase_forgets_earlier_skips() {
        let handler = hidden();
        let callback = handler.callback();

        callback(Progress::PhaseStart { name: "Clustering" });
        callback(Progress::Message(
            "Skipping 'A': structures unavailable".to_string(),
        ));
        callback(Progress::PhaseFinish);
        assert_eq!(skipped(&handler), vec!["A".to_string()]);

        callback(Progress::PhaseStart { name: "Clustering" });
        callback(Progress::TaskStart { total_steps: 2 });
        assert!(skipped(&handler).is_empty());
        assert_eq!(handler.bar.message(), "Loading structures");
    }

    #[test]
    fn empty_task_finishes_without_skips() {
        let handler = hidden();
        let callback = handler.callback();

        callback(Progress::PhaseStart { name: "Clustering" });
        callback(Progress::TaskStart { total_steps: 0 });
        assert_eq!(handler.bar.message(), "Waiting");
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);

        assert_eq!(handler.bar.message(), "✓ Clustering done");
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let handler = hidden();
        let callback = handler.callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Clustering" });
            callback(Progress::TaskStart { total_steps: 2 });
            callback(Progress::Message(
                "Skipping 'C': structures unavailable".to_string(),
            ));
            callback(Progress::TaskIncrement);
            callback(Progress::TaskIncrement);
            callback(Progress::TaskFinish);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(handler.bar.is_finished());
        assert_eq!(handler.bar.message(), "✓ Clustering done (1 skipped)");
    }
}
