//! # Dropbox Intake
//!
//! Files move through three directories under `<root>/dropbox/`:
//!
//! ```text
//! incoming/report.csv  ──►  processing/report.csv  ──►  archive/20240102_030405_report.csv
//! ```
//!
//! - [`processor::FileProcessor`] performs one file's transitions. Each move is
//!   a single `rename`, so a file is always in exactly one stage.
//! - [`watcher::DropboxWatcher`] polls `incoming/` and feeds every file to the
//!   processor, one at a time, in name order.
//!
//! What "processing" means is pluggable through [`ProcessingStrategy`]. The
//! default [`PassThrough`] only waits.
//!
//! A file left in `processing/` (a failed strategy, an archive collision, or a
//! crash between the two moves) stays there. Nothing reconciles it
//! automatically.
//!
//! The watcher only picks up regular files with UTF-8 names. Subdirectories
//! and non UTF-8 names stay in `incoming/` and are still counted as pending by
//! the health snapshot.
//!
//! Only one watcher may run per nest root. Two watchers on the same tree race
//! on the renames.

use crate::error::Result;
use std::path::Path;
use std::thread;
use std::time::Duration;

pub mod processor;
pub mod watcher;

/// The work done to a file while it sits in `processing/`.
pub trait ProcessingStrategy {
    fn process(&self, path: &Path) -> Result<()>;
}

/// Leaves the file untouched after an optional delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough {
    pub delay: Duration,
}

impl PassThrough {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ProcessingStrategy for PassThrough {
    fn process(&self, _path: &Path) -> Result<()> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(())
    }
}
