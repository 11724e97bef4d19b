use super::processor::FileProcessor;
use super::{PassThrough, ProcessingStrategy};
use crate::cancel::CancellationToken;
use crate::clock::{Clock, SystemClock};
use crate::config::DropboxSettings;
use crate::error::{AugmentError, Result};
use crate::layout::PathLayout;
use crate::logging::scoped;
use crate::model::FileEntry;
use std::fs;
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, warn, Dispatch};

/// What one polling cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub discovered: usize,
    pub archived: usize,
    pub failed: Vec<String>,
}

pub struct DropboxWatcher<S: ProcessingStrategy = PassThrough, C: Clock = SystemClock> {
    layout: PathLayout,
    processor: FileProcessor<S, C>,
    poll_interval: Duration,
    backoff: Duration,
    log: Dispatch,
}

impl<S: ProcessingStrategy, C: Clock> DropboxWatcher<S, C> {
    pub fn new(layout: PathLayout, processor: FileProcessor<S, C>, log: Dispatch) -> Self {
        let defaults = DropboxSettings::default();
        Self {
            layout,
            processor,
            poll_interval: defaults.poll_interval(),
            backoff: defaults.backoff(),
            log,
        }
    }

    pub fn with_intervals(mut self, poll_interval: Duration, backoff: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.backoff = backoff;
        self
    }

    /// Poll until `cancel` fires.
    ///
    /// Cancellation is checked before each cycle and after each sleep, never
    /// while a cycle is running. A failed cycle is logged and followed by the
    /// longer backoff sleep instead of the poll interval.
    pub fn run(&self, cancel: &CancellationToken) {
        scoped(&self.log, || {
            info!("Monitoring dropbox for incoming files...");
            if let Err(e) = fs::create_dir_all(self.layout.incoming()) {
                warn!(
                    "Could not create {}: {}",
                    self.layout.incoming().display(),
                    e
                );
            }

            while !cancel.is_cancelled() {
                let pause = match self.run_cycle() {
                    Ok(_) => self.poll_interval,
                    Err(e) => {
                        error!("Error monitoring dropbox: {}", e);
                        self.backoff
                    }
                };
                if cancel.wait(pause) {
                    break;
                }
            }

            info!("Stopping dropbox monitoring...");
        })
    }

    /// List `incoming/` once and process every file found, in name order.
    ///
    /// Per-file failures are counted in the report and do not stop the cycle.
    /// Anything else abandons the rest of the cycle.
    pub fn run_cycle(&self) -> Result<CycleReport> {
        scoped(&self.log, || {
            let entries = self.discover()?;
            let mut report = CycleReport {
                discovered: entries.len(),
                ..CycleReport::default()
            };

            if entries.is_empty() {
                debug!("Dropbox empty");
                return Ok(report);
            }
            info!("Found {} file(s) to process", entries.len());

            for entry in entries {
                match self.processor.process(&entry) {
                    Ok(_) => report.archived += 1,
                    Err(e) if e.is_per_file() => report.failed.push(entry.name),
                    Err(e) => return Err(e),
                }
            }

            Ok(report)
        })
    }

    fn discover(&self) -> Result<Vec<FileEntry>> {
        let dir = match fs::read_dir(self.layout.incoming()) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AugmentError::Listing(e)),
        };

        let now = self.processor.clock().now();
        let mut entries = Vec::new();
        for item in dir {
            let item = item.map_err(AugmentError::Listing)?;
            if !item.file_type().map_err(AugmentError::Listing)?.is_file() {
                continue;
            }
            match item.file_name().into_string() {
                Ok(name) => entries.push(FileEntry::discovered(name, now)),
                Err(raw) => debug!("Skipping non UTF-8 file name: {:?}", raw),
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
