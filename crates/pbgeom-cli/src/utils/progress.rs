use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pbgeom::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders assembly progress on stderr with `indicatif`.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state without drawing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        Box::new(move |progress: Progress| {
            let Ok(guard) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            apply(&guard, progress);
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(pb: &ProgressBar, progress: Progress) {
    match progress {
        Progress::PhaseStart { name } => {
            pb.reset();
            pb.set_length(0);
            pb.set_style(spinner_style());
            pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            pb.set_message(name);
        }
        Progress::PhaseFinish => {
            pb.disable_steady_tick();
            pb.finish_with_message("✓ Done");
        }
        Progress::TaskStart { total_steps } => {
            pb.disable_steady_tick();
            pb.reset();
            pb.set_length(total_steps);
            pb.set_style(bar_style());
        }
        Progress::TaskIncrement => pb.inc(1),
        Progress::TaskFinish => {
            let total = pb.length().unwrap_or(0);
            if pb.position() < total {
                pb.set_position(total);
            }
            pb.finish();
        }
        Progress::TypeBuilt {
            type_id,
            spheres,
            degenerate_fallbacks,
        } => {
            let line = if degenerate_fallbacks > 0 {
                format!(
                    "  Type {type_id}: {spheres} CG sphere(s), {degenerate_fallbacks} singleton fallback(s)"
                )
            } else {
                format!("  Type {type_id}: {spheres} CG sphere(s)")
            };
            pb.println(line);
        }
        Progress::Message(msg) => pb.println(format!("  {msg}")),
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_phases_and_tasks() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Placing Molecules",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Placing Molecules");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::TaskIncrement);
        callback(Progress::TypeBuilt {
            type_id: 0,
            spheres: 3,
            degenerate_fallbacks: 1,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(4));
            assert_eq!(pb.position(), 1);
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 4);
        }

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.lock().unwrap().message(), "✓ Done");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Thread Test",
            });
            callback(Progress::TaskIncrement);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }
}
