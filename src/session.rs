//! Per-run session state threaded through every stage.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::browser::BrowserHandle;
use crate::error::{ReportError, Result};
use crate::target::Target;

/// The named report images a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Whois,
    Responsive,
    Performance,
    Backlinks,
    Amp,
    Ssl,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Whois,
        ArtifactKind::Responsive,
        ArtifactKind::Performance,
        ArtifactKind::Backlinks,
        ArtifactKind::Amp,
        ArtifactKind::Ssl,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Whois => "whois.png",
            ArtifactKind::Responsive => "responsive.png",
            ArtifactKind::Performance => "performance.png",
            ArtifactKind::Backlinks => "backlinks.png",
            ArtifactKind::Amp => "amp.png",
            ArtifactKind::Ssl => "ssl.png",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Whois => "whois",
            ArtifactKind::Responsive => "responsive",
            ArtifactKind::Performance => "performance",
            ArtifactKind::Backlinks => "backlinks",
            ArtifactKind::Amp => "amp",
            ArtifactKind::Ssl => "ssl",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifacts produced so far, built incrementally by stages. Each key is
/// written at most once per run.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    entries: BTreeMap<ArtifactKind, PathBuf>,
}

impl ArtifactSet {
    pub fn record(&mut self, kind: ArtifactKind, path: PathBuf) -> Result<()> {
        if self.entries.contains_key(&kind) {
            return Err(ReportError::stage(format!(
                "artifact '{kind}' was already recorded this run"
            )));
        }
        self.entries.insert(kind, path);
        Ok(())
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.entries.get(&kind).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
        self.entries.iter().map(|(k, p)| (*k, p.as_path()))
    }
}

/// Shared context for one report run.
///
/// Exclusive owner of the output directory and the browser handle for the
/// run's lifetime; no other component writes into the directory or drives
/// the browser concurrently.
pub struct RunContext {
    pub run_name: String,
    pub output_dir: PathBuf,
    pub target: Target,
    pub browser: BrowserHandle,
    pub created_at: SystemTime,
    pub artifacts: ArtifactSet,
}

impl RunContext {
    pub fn new(
        run_name: impl Into<String>,
        output_dir: PathBuf,
        target: Target,
        browser: BrowserHandle,
    ) -> Self {
        Self {
            run_name: run_name.into(),
            output_dir,
            target,
            browser,
            created_at: SystemTime::now(),
            artifacts: ArtifactSet::default(),
        }
    }

    /// Where `kind`'s image belongs inside this run's output directory.
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }
}
