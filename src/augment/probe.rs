//! Placeholder network capabilities.
//!
//! Neither [`SimulatedProber`] nor [`HeartbeatListener`] touches the network.
//! They exist so the CLI can offer `probe` and `listen` against a stable
//! interface. A real implementation plugs in behind [`Prober`] or [`Listener`].

use crate::cancel::CancellationToken;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::logging::scoped;
use crate::model::ProbeReport;
use std::time::Duration;
use tracing::{debug, info, Dispatch};

pub const DEFAULT_PROBE_KIND: &str = "ping";
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

pub trait Prober {
    fn probe(&self, target: &str, kind: &str) -> Result<ProbeReport>;
}

pub trait Listener {
    /// Block until `cancel` fires.
    fn listen(&self, cancel: &CancellationToken) -> Result<()>;
}

pub struct SimulatedProber<C: Clock = SystemClock> {
    clock: C,
    log: Dispatch,
}

impl SimulatedProber<SystemClock> {
    pub fn new(log: Dispatch) -> Self {
        Self {
            clock: SystemClock,
            log,
        }
    }
}

impl<C: Clock> Prober for SimulatedProber<C> {
    fn probe(&self, target: &str, kind: &str) -> Result<ProbeReport> {
        scoped(&self.log, || {
            info!("Launching {} probe to {}", kind, target);
            let report = ProbeReport {
                timestamp: self.clock.now(),
                target: target.to_string(),
                kind: kind.to_string(),
                status: "completed".to_string(),
                results: "Probe successful (simulated)".to_string(),
            };
            info!("Probe completed: {}", target);
            Ok(report)
        })
    }
}

pub struct HeartbeatListener {
    port: u16,
    heartbeat: Duration,
    log: Dispatch,
}

impl HeartbeatListener {
    pub fn new(log: Dispatch) -> Self {
        Self {
            port: DEFAULT_LISTEN_PORT,
            heartbeat: Duration::from_secs(10),
            log,
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

impl Listener for HeartbeatListener {
    fn listen(&self, cancel: &CancellationToken) -> Result<()> {
        scoped(&self.log, || {
            info!("Starting communication listener...");
            info!("Listening on HTTP port {} (simulated, nothing is bound)", self.port);
            while !cancel.wait(self.heartbeat) {
                debug!("Heartbeat - listening...");
            }
            info!("Stopping communication listener...");
            Ok(())
        })
    }
}
