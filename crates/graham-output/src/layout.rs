//! Output directory structure.

use crate::export::ExportFormat;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory holding per-company reports and audit trails.
pub const REPORTS_DIR: &str = "reports";

/// Paths of every file a run writes under one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `root`. Nothing is created until [`create`](Self::create).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output directory and its `reports/` subdirectory.
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(self.reports_dir())
    }

    /// Output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `reports/` subdirectory.
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    /// `top_<N>.csv` or `top_<N>.json`.
    pub fn summary_path(&self, top_count: usize, format: ExportFormat) -> PathBuf {
        self.root
            .join(format!("top_{top_count}.{}", format.extension()))
    }

    /// `rejections.csv`.
    pub fn rejections_path(&self) -> PathBuf {
        self.root.join("rejections.csv")
    }

    /// `reports/<TICKER>.md`.
    pub fn report_path(&self, ticker: &str) -> PathBuf {
        self.reports_dir().join(format!("{ticker}.md"))
    }

    /// `reports/<TICKER>_audit.json`.
    pub fn audit_path(&self, ticker: &str) -> PathBuf {
        self.reports_dir().join(format!("{ticker}_audit.json"))
    }
}
