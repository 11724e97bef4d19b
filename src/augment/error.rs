use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AugmentError {
    /// A file could not be moved between dropbox stages.
    #[error("Move failed for {name}: {reason}")]
    Move { name: String, reason: String },

    /// The timestamped archive name is already taken.
    #[error("Archive collision for {name}: {} already exists", target.display())]
    Collision { name: String, target: PathBuf },

    #[error("Processing failed for {name}: {reason}")]
    Processing { name: String, reason: String },

    #[error("Could not list dropbox: {0}")]
    Listing(#[source] std::io::Error),

    #[error("Could not append flare: {0}")]
    Flare(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid severity: {0} (expected info, warning or critical)")]
    InvalidSeverity(String),

    #[error("Could not install interrupt handler: {0}")]
    Interrupt(String),
}

impl AugmentError {
    /// Per-file failures the watcher logs and moves past.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            AugmentError::Move { .. }
                | AugmentError::Collision { .. }
                | AugmentError::Processing { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AugmentError>;
