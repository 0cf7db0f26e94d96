use std::sync::{
    Arc,
    atomic::{AtomicU8, AtomicU64, Ordering},
};
use std::time::Instant;

use crate::models::{Fragment, ProgressUpdate};

pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;

const PHASE: &str = "classify";

/// Counts classified fragments across rayon workers and reports each new
/// percent step once. The step that reaches 100% is the last update.
pub struct ClassificationProgress {
    total: u64,
    start: Instant,
    classified: AtomicU64,
    last_percent: AtomicU8,
    callback: Option<ProgressCallback>,
}

impl ClassificationProgress {
    pub fn new(total_fragments: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            total: total_fragments as u64,
            start: Instant::now(),
            classified: AtomicU64::new(0),
            last_percent: AtomicU8::new(0),
            callback,
        }
    }

    pub fn fragment_done(&self, fragment: &Fragment) {
        let classified = self.classified.fetch_add(1, Ordering::Relaxed) + 1;
        let percent = ((classified * 100) / self.total.max(1)).min(100) as u8;

        let mut previous = self.last_percent.load(Ordering::Relaxed);
        while percent > previous {
            match self.last_percent.compare_exchange_weak(
                previous,
                percent,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.emit(
                        percent,
                        classified,
                        format!("classified {}#{}", fragment.source, fragment.index),
                    );
                    return;
                }
                Err(current) => previous = current,
            }
        }
    }

    /// Closes a run that never reached 100%, which only happens when there
    /// was nothing to classify.
    pub fn finish(&self) {
        if self.last_percent.swap(100, Ordering::SeqCst) < 100 {
            self.emit(100, self.total, "no fragments to classify".to_string());
        }
    }

    fn emit(&self, percent: u8, classified: u64, message: String) {
        let Some(callback) = &self.callback else {
            return;
        };

        let elapsed = self.start.elapsed().as_secs_f64();
        let remaining = self.total.saturating_sub(classified);
        let eta_seconds = (elapsed > 0.0 && classified > 0)
            .then(|| (remaining as f64 * elapsed / classified as f64).round() as u64);

        callback(ProgressUpdate {
            phase: PHASE.to_string(),
            percent,
            processed: classified.min(self.total),
            total: self.total,
            eta_seconds,
            message,
        });
    }
}
