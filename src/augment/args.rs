use augment::layout::DEFAULT_ROOT;
use augment::model::Severity;
use augment::probe::DEFAULT_PROBE_KIND;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const USAGE: &str = "Usage: augment [health|monitor|listen|flare|probe|status]";

#[derive(Parser, Debug)]
#[command(name = "augment")]
#[command(about = "Dropbox intake, health checks and flares for a local nest", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Root of the nest directory tree
    #[arg(long, global = true, env = "AUGMENT_NEST", default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a health snapshot as JSON
    Health,

    /// Watch the dropbox until interrupted
    Monitor,

    /// Run the communication listener until interrupted
    Listen,

    /// Append a flare to the flare log
    Flare {
        /// Message words (defaults to "Test flare")
        #[arg(num_args = 0..)]
        message: Vec<String>,

        /// info, warning or critical
        #[arg(short, long, default_value = "info")]
        severity: Severity,
    },

    /// Launch a (simulated) probe
    Probe {
        /// Hostname or IP
        #[arg(default_value = "localhost")]
        target: String,

        /// Probe type
        #[arg(short, long, default_value = DEFAULT_PROBE_KIND)]
        kind: String,
    },

    /// Show version and enabled features
    Status,
}
