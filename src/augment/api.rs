//! # API Facade
//!
//! [`Augment`] is the single entry point for every operation, whichever UI is
//! driving it. It owns one instance of each component, wired to the same
//! [`PathLayout`] and logging [`Dispatch`], and dispatches to them.
//!
//! The facade does no terminal I/O and never exits the process. The CLI in
//! `main.rs` and the prompt in [`crate::dispatch`] handle presentation.
//!
//! `Augment<S>` is generic over the [`ProcessingStrategy`] so embedders can
//! plug in real work without touching the watcher.

use crate::cancel::CancellationToken;
use crate::config::AugmentConfig;
use crate::dropbox::processor::FileProcessor;
use crate::dropbox::watcher::DropboxWatcher;
use crate::dropbox::{PassThrough, ProcessingStrategy};
use crate::error::Result;
use crate::flare::FlareEmitter;
use crate::health::HealthMonitor;
use crate::layout::PathLayout;
use crate::logging::scoped;
use crate::model::{Flare, HealthSnapshot, ProbeReport, Severity};
use crate::probe::{HeartbeatListener, Listener, Prober, SimulatedProber};
use std::fmt;
use tracing::{info, Dispatch};

pub struct Augment<S: ProcessingStrategy = PassThrough> {
    layout: PathLayout,
    config: AugmentConfig,
    health: HealthMonitor,
    flares: FlareEmitter,
    watcher: DropboxWatcher<S>,
    prober: Box<dyn Prober>,
    listener: Box<dyn Listener>,
    log: Dispatch,
}

impl Augment<PassThrough> {
    /// Load (or create) the nest config and wire up the default components.
    pub fn open(layout: PathLayout, log: Dispatch) -> Result<Self> {
        scoped(&log, || info!("Augment initializing..."));
        let config = AugmentConfig::load(&layout)?;
        let strategy = PassThrough::new(config.dropbox.processing_delay());
        let augment = Self::with_strategy(layout, config, strategy, log);
        scoped(&augment.log, || info!("Augment ready!"));
        Ok(augment)
    }
}

impl<S: ProcessingStrategy> Augment<S> {
    pub fn with_strategy(
        layout: PathLayout,
        config: AugmentConfig,
        strategy: S,
        log: Dispatch,
    ) -> Self {
        let processor = FileProcessor::new(layout.clone(), strategy, log.clone());
        let watcher = DropboxWatcher::new(layout.clone(), processor, log.clone())
            .with_intervals(config.dropbox.poll_interval(), config.dropbox.backoff());

        Self {
            health: HealthMonitor::new(layout.clone(), log.clone()),
            flares: FlareEmitter::new(layout.clone(), log.clone()),
            prober: Box::new(SimulatedProber::new(log.clone())),
            listener: Box::new(HeartbeatListener::new(log.clone())),
            watcher,
            layout,
            config,
            log,
        }
    }

    pub fn with_prober(mut self, prober: impl Prober + 'static) -> Self {
        self.prober = Box::new(prober);
        self
    }

    pub fn with_listener(mut self, listener: impl Listener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn layout(&self) -> &PathLayout {
        &self.layout
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    pub fn log(&self) -> &Dispatch {
        &self.log
    }

    pub fn health(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    pub fn flare(&self, message: impl Into<String>, severity: Severity) -> Result<Flare> {
        self.flares.emit(message, severity)
    }

    pub fn flares(&self) -> Result<Vec<Flare>> {
        self.flares.read_all()
    }

    /// Watch the dropbox until `cancel` fires.
    pub fn monitor(&self, cancel: &CancellationToken) {
        self.watcher.run(cancel)
    }

    /// A single watcher cycle, for callers that schedule their own polling.
    pub fn process_once(&self) -> Result<CycleReport> {
        self.watcher.run_cycle()
    }

    pub fn probe(&self, target: &str, kind: &str) -> Result<ProbeReport> {
        self.prober.probe(target, kind)
    }

    pub fn listen(&self, cancel: &CancellationToken) -> Result<()> {
        self.listener.listen(cancel)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            name: self.config.name.clone(),
            version: self.config.version.clone(),
            features: self.config.enabled_features(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub name: String,
    pub version: String,
    pub features: Vec<&'static str>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Status", self.name)?;
        writeln!(f, "   Version: {}", self.version)?;
        writeln!(f, "   Uptime: Running")?;
        writeln!(f, "   Features: {}", self.features.join(", "))
    }
}

pub use crate::dropbox::watcher::CycleReport;
