//! Progress indicators for the parallel release batch
//!
//! Uses `linya` bars behind a mutex so rayon workers can tick them.

use linya::{Bar, Progress};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe multi-bar progress
#[derive(Clone)]
pub struct MultiProgress {
  progress: Arc<Mutex<Progress>>,
}

impl MultiProgress {
  pub fn new() -> Self {
    Self {
      progress: Arc::new(Mutex::new(Progress::new())),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Progress> {
    self.progress.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Add a new bar with a label and total
  pub fn add_bar(&self, total: usize, label: impl Into<String>) -> Bar {
    self.lock().bar(total, label.into())
  }

  /// Increment a bar by one
  pub fn inc(&self, bar: &Bar) {
    self.lock().inc_and_draw(bar, 1);
  }
}

impl Default for MultiProgress {
  fn default() -> Self {
    Self::new()
  }
}
