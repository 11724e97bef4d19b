//! Logging capability.
//!
//! Nothing in the library installs a global subscriber. Components receive a
//! [`Dispatch`] at construction and emit their events under it with
//! [`scoped`], so a test can hand in the dispatcher from [`capture`] and read
//! back exactly what a component logged.

use crate::error::Result;
use crate::layout::PathLayout;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "AUGMENT_LOG";

/// Build the production dispatcher: `logs/augment.log` plus stderr.
pub fn dispatch(layout: &PathLayout, verbose: bool) -> Result<Dispatch> {
    fs::create_dir_all(layout.logs_dir())?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(layout.augment_log_path())?;

    let filter = || {
        EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter()),
        );

    Ok(Dispatch::new(subscriber))
}

/// Run `f` with `dispatch` as the current default.
pub fn scoped<T>(dispatch: &Dispatch, f: impl FnOnce() -> T) -> T {
    tracing::dispatcher::with_default(dispatch, f)
}

/// A dispatcher that records every event (debug and above) in memory.
pub fn capture() -> (Dispatch, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (Dispatch::new(subscriber), logs)
}

#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

pub struct CapturedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

impl Write for CapturedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer lock poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
