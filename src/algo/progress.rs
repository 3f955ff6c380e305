//! Progress reporting for long-running filters.
//!
//! Filters report one step per iteration through a [`Progress`] callback.
//!
//! # Example
//!
//! ```
//! use gimsmooth::algo::filter::{filter_with_progress, FilterMode, FilterOptions};
//! use gimsmooth::algo::Progress;
//! use gimsmooth::gim::shapes;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let options = FilterOptions::default().with_mode(FilterMode::Plain).with_spatial_factor(2.0);
//! filter_with_progress(&shapes::octahedral_sphere(9, 1.0), &options, &progress);
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_report_forwards_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, message| {
            sink.lock().unwrap().push((current, total, message.to_string()));
        });

        progress.report(1, 3, "Filtering");
        progress.report(3, 3, "Filtering");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (1, 3, "Filtering".to_string()));
    }

    #[test]
    fn test_none_is_silent() {
        Progress::default().report(0, 1, "ignored");
        assert_eq!(format!("{:?}", Progress::none()), "Progress { .. }");
    }
}
