//! Directory tree of a nest.
//!
//! Every component resolves its paths through [`PathLayout`], which derives the
//! whole tree from a single root:
//!
//! ```text
//! <root>/
//! ├── dropbox/
//! │   ├── incoming/     # files waiting to be picked up
//! │   ├── processing/   # files currently being worked on
//! │   └── archive/      # YYYYMMDD_HHMMSS_<name>
//! ├── logs/
//! │   ├── augment.log   # tracing output
//! │   └── flares.log    # one JSON flare per line
//! └── config/
//!     └── augment.json
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "/opt/nest";

const AUGMENT_LOG: &str = "augment.log";
const FLARE_LOG: &str = "flares.log";
const CONFIG_FILENAME: &str = "augment.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    root: PathBuf,
    dropbox_incoming: PathBuf,
    dropbox_processing: PathBuf,
    dropbox_archive: PathBuf,
    logs_dir: PathBuf,
    flare_log_path: PathBuf,
}

impl PathLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let dropbox = root.join("dropbox");
        let logs_dir = root.join("logs");
        Self {
            dropbox_incoming: dropbox.join("incoming"),
            dropbox_processing: dropbox.join("processing"),
            dropbox_archive: dropbox.join("archive"),
            flare_log_path: logs_dir.join(FLARE_LOG),
            logs_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn incoming(&self) -> &Path {
        &self.dropbox_incoming
    }

    pub fn processing(&self) -> &Path {
        &self.dropbox_processing
    }

    pub fn archive(&self) -> &Path {
        &self.dropbox_archive
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn flare_log_path(&self) -> &Path {
        &self.flare_log_path
    }

    pub fn augment_log_path(&self) -> PathBuf {
        self.logs_dir.join(AUGMENT_LOG)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILENAME)
    }
}

impl Default for PathLayout {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}
