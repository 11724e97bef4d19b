//! Read-only health snapshot of a nest.
//!
//! A missing directory is not a failure: it reports a zero-valued `ok`
//! component. Any other read error marks that component `error` and the
//! snapshot as a whole `degraded`. [`HealthMonitor::snapshot`] itself never
//! fails and never touches the filesystem beyond reading it.

use crate::clock::{Clock, SystemClock};
use crate::layout::PathLayout;
use crate::logging::scoped;
use crate::model::{ComponentHealth, ComponentStatus, HealthSnapshot, HealthStatus};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn, Dispatch};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct HealthMonitor<C: Clock = SystemClock> {
    layout: PathLayout,
    clock: C,
    log: Dispatch,
}

impl HealthMonitor<SystemClock> {
    pub fn new(layout: PathLayout, log: Dispatch) -> Self {
        Self::with_clock(layout, SystemClock, log)
    }
}

impl<C: Clock> HealthMonitor<C> {
    pub fn with_clock(layout: PathLayout, clock: C, log: Dispatch) -> Self {
        Self { layout, clock, log }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        scoped(&self.log, || {
            info!("Checking nest health...");

            let mut components = BTreeMap::new();
            components.insert("dropbox".to_string(), self.dropbox_health());
            components.insert("logs".to_string(), self.logs_health());

            let status = if components
                .values()
                .all(|c| c.status == ComponentStatus::Ok)
            {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            };

            HealthSnapshot {
                timestamp: self.clock.now(),
                status,
                components,
            }
        })
    }

    fn dropbox_health(&self) -> ComponentHealth {
        match count_entries(self.layout.incoming()) {
            Ok(pending) => {
                info!("Dropbox: {} files pending", pending);
                ComponentHealth::new(ComponentStatus::Ok).with_metric("files_pending", pending)
            }
            Err(e) => {
                warn!("Dropbox unreadable ({}): {}", self.layout.incoming().display(), e);
                ComponentHealth::new(ComponentStatus::Error).with_metric("files_pending", 0)
            }
        }
    }

    fn logs_health(&self) -> ComponentHealth {
        match total_file_bytes(self.layout.logs_dir()) {
            Ok(bytes) => {
                let size_mb = round2(bytes as f64 / BYTES_PER_MB);
                info!("Logs: {} MB", size_mb);
                ComponentHealth::new(ComponentStatus::Ok).with_metric("size_mb", size_mb)
            }
            Err(e) => {
                warn!("Logs unreadable ({}): {}", self.layout.logs_dir().display(), e);
                ComponentHealth::new(ComponentStatus::Error).with_metric("size_mb", 0.0)
            }
        }
    }
}

fn count_entries(dir: &Path) -> io::Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut count = 0;
    for entry in entries {
        entry?;
        count += 1;
    }
    Ok(count)
}

/// Sum of the sizes of the regular files directly inside `dir`.
fn total_file_bytes(dir: &Path) -> io::Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut total = 0;
    for entry in entries {
        let metadata = entry?.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
