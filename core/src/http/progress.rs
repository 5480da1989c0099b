use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Upload progress callback receiving a percentage in `0..=100`
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Converts transferred/total byte counts into percentages and forwards
/// them to a callback, never reporting a value lower than one already sent.
pub struct ProgressTracker {
    last: AtomicU8,
    callback: ProgressFn,
}

impl ProgressTracker {
    pub fn new(callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self::from_boxed(Box::new(callback))
    }

    pub fn from_boxed(callback: ProgressFn) -> Self {
        Self {
            last: AtomicU8::new(0),
            callback,
        }
    }

    /// Rounded percentage of `transferred` over `total`; an unknown total
    /// counts as complete.
    pub fn percent(transferred: u64, total: u64) -> u8 {
        if total == 0 {
            return 100;
        }
        let pct = (transferred as f64 / total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn report(&self, transferred: u64, total: u64) {
        let pct = Self::percent(transferred, total);
        let prev = self.last.fetch_max(pct, Ordering::SeqCst);
        if pct > prev {
            (self.callback)(pct);
        }
    }

    pub fn finish(&self) {
        self.report(1, 1);
    }

    pub fn last(&self) -> u8 {
        self.last.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (ProgressTracker, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = ProgressTracker::new(move |p| sink.lock().unwrap().push(p));
        (tracker, seen)
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(ProgressTracker::percent(1, 3), 33);
        assert_eq!(ProgressTracker::percent(2, 3), 67);
        assert_eq!(ProgressTracker::percent(10, 5), 100);
        assert_eq!(ProgressTracker::percent(0, 0), 100);
    }

    #[test]
    fn never_reports_backwards() {
        let (tracker, seen) = recording();
        tracker.report(50, 100);
        tracker.report(20, 100); // second transfer after a retry
        tracker.report(50, 100);
        tracker.report(80, 100);
        tracker.finish();
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![50, 80, 100]);
        assert_eq!(tracker.last(), 100);
    }
}
