//! # Augment Architecture
//!
//! Augment is a small automation agent for a *nest*: a directory tree holding a
//! file dropbox, logs and config. It is a library with a thin CLI on top, the
//! same way the dropbox pipeline is a library with a polling loop on top.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs) and prompt (dispatch.rs)      │
//! │  - Parses arguments, prints JSON and messages               │
//! │  - Installs the Ctrl-C handler, picks exit codes            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - `Augment` facade, one instance of every component        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Components                                                 │
//! │  - dropbox/   FileProcessor + DropboxWatcher (the core)     │
//! │  - health.rs  read-only HealthMonitor                       │
//! │  - flare.rs   append-only FlareEmitter                      │
//! │  - probe.rs   placeholder Prober / Listener                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  PathLayout (layout.rs): every path derived from one root   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Hidden Globals
//!
//! Logging is a capability. Every component is built with a
//! `tracing::Dispatch` and logs under it, so the library never installs a
//! global subscriber. Time comes from a [`clock::Clock`] and stopping comes from a
//! [`cancel::CancellationToken`]. Tests swap in a capturing dispatcher, a
//! fixed clock and a pre-cancelled token.
//!
//! ## Concurrency
//!
//! Everything runs on the caller's thread. The watcher processes files one at
//! a time and only sleeps between cycles, which is also the only place it
//! notices cancellation. One watcher per nest root is assumed. Nothing locks
//! the directories.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`dropbox`]: Intake pipeline (processor, watcher, processing strategies)
//! - [`health`]: Health snapshots
//! - [`flare`]: Flare log
//! - [`probe`]: Placeholder probe and listener capabilities
//! - [`dispatch`]: Interactive command table
//! - [`layout`]: Nest directory tree
//! - [`config`]: `config/augment.json`
//! - [`logging`]: Dispatcher construction and test capture
//! - [`model`]: Data types (`FileEntry`, `HealthSnapshot`, `Flare`, ...)
//! - [`error`]: Error types

pub mod api;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod dropbox;
pub mod error;
pub mod flare;
pub mod health;
pub mod layout;
pub mod logging;
pub mod model;
pub mod probe;
