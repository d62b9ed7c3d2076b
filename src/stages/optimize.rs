//! Optional terminal pass: compress the report images via the external
//! compressor service and replace the originals with the optimized set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::pipeline::Stage;
use crate::session::{ArtifactKind, RunContext};

const FILE_INPUT: &str = "#fileSelector";
const DOWNLOAD_BUTTON: &str = "#app section:nth-of-type(1) div:nth-of-type(3) button";
/// Fixed name the compressor gives its result archive.
const ARCHIVE_NAME: &str = "imagecompressor.zip";

pub struct OptimizeStage {
    endpoint: String,
    navigation_timeout: Duration,
    poll_interval: Duration,
    download_dir: Option<PathBuf>,
}

impl OptimizeStage {
    pub fn new(config: &Config) -> OptimizeStage {
        OptimizeStage {
            endpoint: config.endpoints.compressor.clone(),
            navigation_timeout: config.timeouts.navigation,
            poll_interval: config.timeouts.poll_interval,
            download_dir: config.download_dir.clone(),
        }
    }

    fn download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// The browser reports nothing about download completion, so the
    /// archive appearing on disk is the signal.
    async fn wait_for_archive(&self, path: &Path) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.navigation_timeout;
        while !path.exists() {
            if tokio::time::Instant::now() >= deadline {
                return Err(ReportError::Timeout(format!(
                    "compressed archive never appeared at {}",
                    path.display()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for OptimizeStage {
    fn name(&self) -> &'static str {
        "optimize"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        if ctx.artifacts.is_empty() {
            return Err(ReportError::stage("no artifacts to optimize"));
        }

        ctx.browser
            .navigate(&self.endpoint, Some(self.navigation_timeout))
            .await?;

        // Artifacts a failed stage never produced are skipped; an upload
        // control that exists but rejects input is a real error.
        let uploads: Vec<PathBuf> = ArtifactKind::ALL
            .iter()
            .filter_map(|kind| ctx.artifacts.get(*kind))
            .map(|p| p.to_path_buf())
            .collect();
        for path in &uploads {
            ctx.browser
                .type_text(FILE_INPUT, &path.to_string_lossy())
                .await?;
        }

        ctx.browser.click(DOWNLOAD_BUTTON).await?;

        let downloaded = self.download_dir()?.join(ARCHIVE_NAME);
        self.wait_for_archive(&downloaded).await?;

        let archive_path = ctx.output_dir.join(ARCHIVE_NAME);
        std::fs::rename(&downloaded, &archive_path).or_else(|_| {
            // Rename fails across filesystems; fall back to copy+delete.
            std::fs::copy(&downloaded, &archive_path)
                .and_then(|_| std::fs::remove_file(&downloaded))
                .map(|_| ())
        })?;

        let file = std::fs::File::open(&archive_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ReportError::stage(format!("unreadable archive: {e}")))?;
        let packed: HashSet<String> = archive
            .file_names()
            .filter_map(|entry| Path::new(entry).file_name())
            .filter_map(|name| name.to_str())
            .map(str::to_string)
            .collect();
        archive
            .extract(&ctx.output_dir)
            .map_err(|e| ReportError::stage(format!("archive extraction failed: {e}")))?;

        // Extraction overwrote every upload the compressor returned, so
        // originals leave disk only once an optimized copy is in place.
        for path in &uploads {
            let replaced = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| packed.contains(name));
            if !replaced {
                std::fs::remove_file(path)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::ScriptedBrowser;
    use crate::target::Target;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn context_with_artifacts(
        out: &TempDir,
        kinds: &[ArtifactKind],
    ) -> (RunContext, crate::browser::testing::SharedState) {
        let (browser, state) = ScriptedBrowser::boxed();
        let target = Target::parse("example.com").unwrap();
        let mut ctx = RunContext::new("test", out.path().to_path_buf(), target, browser);
        for kind in kinds {
            let path = ctx.artifact_path(*kind);
            std::fs::write(&path, b"original").unwrap();
            ctx.artifacts.record(*kind, path).unwrap();
        }
        (ctx, state)
    }

    fn write_archive(dir: &std::path::Path, entries: &[&str]) {
        let file = std::fs::File::create(dir.join(ARCHIVE_NAME)).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for name in entries {
            writer
                .start_file(*name, FileOptions::default())
                .unwrap();
            writer.write_all(b"optimized").unwrap();
        }
        writer.finish().unwrap();
    }

    fn stage_with_download_dir(dir: &std::path::Path) -> OptimizeStage {
        let mut config = Config::default();
        config.download_dir = Some(dir.to_path_buf());
        OptimizeStage::new(&config)
    }

    #[tokio::test]
    async fn uploads_only_recorded_artifacts_and_swaps_in_the_archive() {
        let out = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let (mut ctx, state) =
            context_with_artifacts(&out, &[ArtifactKind::Whois, ArtifactKind::Ssl]);
        write_archive(downloads.path(), &["whois.png", "ssl.png"]);

        let stage = stage_with_download_dir(downloads.path());
        stage.run(&mut ctx).await.unwrap();

        let calls = state.lock().unwrap().calls.clone();
        let upload_calls: Vec<&String> =
            calls.iter().filter(|c| c.starts_with("type:")).collect();
        assert_eq!(upload_calls.len(), 2);
        assert!(upload_calls[0].contains("whois.png"));
        assert!(upload_calls[1].contains("ssl.png"));
        assert!(calls.iter().any(|c| c.starts_with("click:")));

        // Originals replaced by extracted content, archive kept alongside.
        let whois = std::fs::read(out.path().join("whois.png")).unwrap();
        assert_eq!(whois, b"optimized");
        assert!(out.path().join(ARCHIVE_NAME).exists());
        assert!(!downloads.path().join(ARCHIVE_NAME).exists());
    }

    #[tokio::test]
    async fn corrupt_archive_keeps_the_originals() {
        let out = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let (mut ctx, _state) =
            context_with_artifacts(&out, &[ArtifactKind::Whois, ArtifactKind::Ssl]);
        std::fs::write(downloads.path().join(ARCHIVE_NAME), b"not a zip").unwrap();

        let stage = stage_with_download_dir(downloads.path());
        let err = stage.run(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("unreadable archive"));

        // A bad download must never cost the run its artifacts.
        for name in ["whois.png", "ssl.png"] {
            let contents = std::fs::read(out.path().join(name)).unwrap();
            assert_eq!(contents, b"original", "{name}");
        }
    }

    #[tokio::test]
    async fn uploads_the_compressor_dropped_are_removed_after_extraction() {
        let out = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let (mut ctx, _state) =
            context_with_artifacts(&out, &[ArtifactKind::Whois, ArtifactKind::Ssl]);
        write_archive(downloads.path(), &["whois.png"]);

        let stage = stage_with_download_dir(downloads.path());
        stage.run(&mut ctx).await.unwrap();

        assert_eq!(std::fs::read(out.path().join("whois.png")).unwrap(), b"optimized");
        assert!(!out.path().join("ssl.png").exists());
    }

    #[test]
    fn default_download_dir_is_the_launch_cwd() {
        let stage = OptimizeStage::new(&Config::default());
        assert_eq!(
            stage.download_dir().unwrap(),
            std::env::current_dir().unwrap()
        );
    }

    #[tokio::test]
    async fn rejecting_file_input_is_a_stage_error() {
        let out = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let (mut ctx, state) = context_with_artifacts(&out, &[ArtifactKind::Whois]);
        state
            .lock()
            .unwrap()
            .missing
            .insert(FILE_INPUT.to_string());

        let stage = stage_with_download_dir(downloads.path());
        let err = stage.run(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("fileSelector"));
        // Original artifact untouched on failure.
        assert!(out.path().join("whois.png").exists());
    }

    #[tokio::test]
    async fn empty_artifact_set_fails_fast() {
        let out = TempDir::new().unwrap();
        let (mut ctx, state) = context_with_artifacts(&out, &[]);

        let stage = stage_with_download_dir(out.path());
        let err = stage.run(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("no artifacts"));
        assert!(state.lock().unwrap().calls.is_empty());
    }
}
