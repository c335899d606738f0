//! Progress counter for completed files

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::pipeline::CompletionCallback;

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Advance the bar by `n`. Blocks on the lock: skipped ticks would never be made up.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.update(n);
    }
}

/// Final redraw so the counter shows every completed file, then move past the bar line.
pub fn finish_counter(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.refresh();
        eprintln!();
    }
}

/// Callback for the work manager: one tick per finished file.
pub fn completion_callback(bar: &Option<ProgressBar>) -> Option<CompletionCallback> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Arc::new(move || update_progress_bar(&bar, 1)) as CompletionCallback
    })
}
