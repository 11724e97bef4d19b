//! Append-only flare log.
//!
//! Each flare is one JSON object on its own line in `logs/flares.log`.
//! Existing lines are never rewritten. Appends from two processes at once are
//! not guaranteed to stay whole lines.

use crate::clock::{Clock, SystemClock};
use crate::error::{AugmentError, Result};
use crate::layout::PathLayout;
use crate::logging::scoped;
use crate::model::{Flare, Severity};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use tracing::{info, Dispatch};

pub struct FlareEmitter<C: Clock = SystemClock> {
    layout: PathLayout,
    clock: C,
    log: Dispatch,
}

impl FlareEmitter<SystemClock> {
    pub fn new(layout: PathLayout, log: Dispatch) -> Self {
        Self::with_clock(layout, SystemClock, log)
    }
}

impl<C: Clock> FlareEmitter<C> {
    pub fn with_clock(layout: PathLayout, clock: C, log: Dispatch) -> Self {
        Self { layout, clock, log }
    }

    pub fn emit(&self, message: impl Into<String>, severity: Severity) -> Result<Flare> {
        let flare = Flare {
            timestamp: self.clock.now(),
            severity,
            message: message.into(),
        };

        scoped(&self.log, || {
            info!("Deploying flare [{}]: {}", flare.severity, flare.message);
            self.append(&flare)
        })?;

        Ok(flare)
    }

    /// Every flare in the log, oldest first. A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<Flare>> {
        let file = match fs::File::open(self.layout.flare_log_path()) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AugmentError::Io(e)),
        };

        let mut flares = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            flares.push(serde_json::from_str(&line)?);
        }
        Ok(flares)
    }

    fn append(&self, flare: &Flare) -> Result<()> {
        let mut line = serde_json::to_string(flare)?;
        line.push('\n');

        fs::create_dir_all(self.layout.logs_dir()).map_err(AugmentError::Flare)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.layout.flare_log_path())
            .map_err(AugmentError::Flare)?;
        // Single write so one flare is one line.
        file.write_all(line.as_bytes()).map_err(AugmentError::Flare)?;
        Ok(())
    }
}
