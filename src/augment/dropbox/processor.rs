use super::{PassThrough, ProcessingStrategy};
use crate::clock::{Clock, SystemClock};
use crate::error::{AugmentError, Result};
use crate::layout::PathLayout;
use crate::logging::scoped;
use crate::model::{FileEntry, FileState};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, Dispatch};

/// Format of the prefix that makes archive names unique.
pub const ARCHIVE_STAMP: &str = "%Y%m%d_%H%M%S";

/// Outcome of a successful pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub entry: FileEntry,
    pub archive_path: PathBuf,
}

pub struct FileProcessor<S: ProcessingStrategy = PassThrough, C: Clock = SystemClock> {
    layout: PathLayout,
    strategy: S,
    clock: C,
    log: Dispatch,
}

impl<S: ProcessingStrategy> FileProcessor<S, SystemClock> {
    pub fn new(layout: PathLayout, strategy: S, log: Dispatch) -> Self {
        Self::with_clock(layout, strategy, SystemClock, log)
    }
}

impl<S: ProcessingStrategy, C: Clock> FileProcessor<S, C> {
    pub fn with_clock(layout: PathLayout, strategy: S, clock: C, log: Dispatch) -> Self {
        Self {
            layout,
            strategy,
            clock,
            log,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Move `entry` from incoming to processing, run the strategy, then move it
    /// to the archive under a timestamped name.
    ///
    /// Failures are logged here. A `Move` failure leaves the file where it was,
    /// `Processing` and `Collision` failures leave it in `processing/`.
    pub fn process(&self, entry: &FileEntry) -> Result<Processed> {
        scoped(&self.log, || {
            info!("Processing file: {}", entry.name);
            let result = self.transition(entry);
            match &result {
                Ok(done) => info!(
                    "File processed: {} -> {}",
                    entry.name,
                    done.archive_path.display()
                ),
                Err(e) => error!("Error processing file {}: {}", entry.name, e),
            }
            result
        })
    }

    fn transition(&self, entry: &FileEntry) -> Result<Processed> {
        fs::create_dir_all(self.layout.processing())?;
        fs::create_dir_all(self.layout.archive())?;

        let mut entry = entry.clone();

        let source = self.layout.incoming().join(&entry.name);
        let in_processing = self.layout.processing().join(&entry.name);
        if in_processing.exists() {
            return Err(AugmentError::Move {
                name: entry.name,
                reason: format!("{} already exists", in_processing.display()),
            });
        }
        move_file(&entry.name, &source, &in_processing)?;
        entry.state = FileState::Processing;

        self.strategy
            .process(&in_processing)
            .map_err(|e| AugmentError::Processing {
                name: entry.name.clone(),
                reason: e.to_string(),
            })?;

        let archive_path = self.archive_path(&entry.name);
        if archive_path.exists() {
            return Err(AugmentError::Collision {
                name: entry.name,
                target: archive_path,
            });
        }
        move_file(&entry.name, &in_processing, &archive_path)?;
        entry.state = FileState::Archived;

        Ok(Processed {
            entry,
            archive_path,
        })
    }

    fn archive_path(&self, name: &str) -> PathBuf {
        let stamp = self.clock.now().format(ARCHIVE_STAMP);
        self.layout.archive().join(format!("{}_{}", stamp, name))
    }
}

fn move_file(name: &str, from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| AugmentError::Move {
        name: name.to_string(),
        reason: if e.kind() == io::ErrorKind::NotFound {
            format!("{} vanished", from.display())
        } else {
            e.to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::logging::capture;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    struct Failing;

    impl ProcessingStrategy for Failing {
        fn process(&self, _path: &Path) -> Result<()> {
            Err(AugmentError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "corrupt payload",
            )))
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn setup() -> (TempDir, PathLayout) {
        let temp_dir = TempDir::new().unwrap();
        let layout = PathLayout::new(temp_dir.path());
        fs::create_dir_all(layout.incoming()).unwrap();
        (temp_dir, layout)
    }

    fn drop_file(layout: &PathLayout, name: &str, content: &str) -> FileEntry {
        fs::write(layout.incoming().join(name), content).unwrap();
        FileEntry::discovered(name, Local::now())
    }

    #[test]
    fn archives_with_timestamp_prefix() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::with_clock(
            layout.clone(),
            PassThrough::default(),
            fixed_clock(),
            capture().0,
        );
        let entry = drop_file(&layout, "report.csv", "a,b\n1,2\n");

        let done = processor.process(&entry).unwrap();

        let expected = layout.archive().join("20240102_030405_report.csv");
        assert_eq!(done.archive_path, expected);
        assert_eq!(done.entry.state, FileState::Archived);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "a,b\n1,2\n");
        assert!(!layout.incoming().join("report.csv").exists());
        assert!(!layout.processing().join("report.csv").exists());
    }

    #[test]
    fn creates_stage_directories() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::new(layout.clone(), PassThrough::default(), capture().0);
        let entry = drop_file(&layout, "a.txt", "a");

        processor.process(&entry).unwrap();
        assert!(layout.processing().is_dir());
        assert!(layout.archive().is_dir());
    }

    #[test]
    fn vanished_source_is_a_move_error() {
        let (_dir, layout) = setup();
        let (log, logs) = capture();
        let processor = FileProcessor::new(layout.clone(), PassThrough::default(), log);
        let entry = FileEntry::discovered("ghost.txt", Local::now());

        let err = processor.process(&entry).unwrap_err();
        assert!(matches!(err, AugmentError::Move { .. }));
        assert!(err.is_per_file());
        assert!(logs.contains("Error processing file ghost.txt"));
    }

    #[test]
    fn existing_processing_name_is_a_move_error() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::new(layout.clone(), PassThrough::default(), capture().0);
        fs::create_dir_all(layout.processing()).unwrap();
        fs::write(layout.processing().join("dup.txt"), "older").unwrap();
        let entry = drop_file(&layout, "dup.txt", "newer");

        let err = processor.process(&entry).unwrap_err();
        assert!(matches!(err, AugmentError::Move { .. }));
        // Neither copy is touched.
        assert_eq!(fs::read_to_string(layout.incoming().join("dup.txt")).unwrap(), "newer");
        assert_eq!(fs::read_to_string(layout.processing().join("dup.txt")).unwrap(), "older");
    }

    #[test]
    fn collision_leaves_file_in_processing() {
        let (_dir, layout) = setup();
        let (log, logs) = capture();
        let processor =
            FileProcessor::with_clock(layout.clone(), PassThrough::default(), fixed_clock(), log);

        let first = drop_file(&layout, "same.txt", "one");
        processor.process(&first).unwrap();

        let second = drop_file(&layout, "same.txt", "two");
        let err = processor.process(&second).unwrap_err();

        assert!(matches!(err, AugmentError::Collision { .. }));
        assert_eq!(fs::read_to_string(layout.processing().join("same.txt")).unwrap(), "two");
        assert_eq!(
            fs::read_to_string(layout.archive().join("20240102_030405_same.txt")).unwrap(),
            "one"
        );
        assert!(logs.contains("Archive collision for same.txt"));
    }

    #[test]
    fn strategy_failure_leaves_file_in_processing() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::new(layout.clone(), Failing, capture().0);
        let entry = drop_file(&layout, "bad.bin", "??");

        let err = processor.process(&entry).unwrap_err();
        assert!(matches!(err, AugmentError::Processing { .. }));
        assert!(layout.processing().join("bad.bin").exists());
        assert_eq!(fs::read_dir(layout.archive()).unwrap().count(), 0);
    }

    #[test]
    fn stale_retry_is_recoverable() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::with_clock(
            layout.clone(),
            PassThrough::default(),
            fixed_clock(),
            capture().0,
        );
        let entry = drop_file(&layout, "once.txt", "x");

        processor.process(&entry).unwrap();
        let err = processor.process(&entry).unwrap_err();

        assert!(err.is_per_file());
        assert!(layout.archive().join("20240102_030405_once.txt").exists());
    }

    #[test]
    fn archive_name_is_deterministic_under_fixed_clock() {
        let (_dir, layout) = setup();
        let processor = FileProcessor::with_clock(
            layout.clone(),
            PassThrough::default(),
            fixed_clock(),
            capture().0,
        );
        assert_eq!(
            processor.archive_path("x.log"),
            processor.archive_path("x.log")
        );
        assert_eq!(
            processor.archive_path("x.log"),
            layout.archive().join("20240102_030405_x.log")
        );
    }
}
