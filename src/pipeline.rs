//! Stage sequencing with per-stage failure isolation and timing.
//!
//! Stages run strictly in order against one shared [`RunContext`]. An error
//! inside a stage is recorded and the run moves on; a report with four of
//! six artifacts is still a useful report. Only setup (before the pipeline
//! starts) can abort a run.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::progress::ProgressCallback;
use crate::session::RunContext;

/// One named, independently-failable unit of the analysis pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &mut RunContext) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Failed,
}

/// Appended to the run log once per stage; never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage_name: String,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration: Duration,
}

/// The ordered run log plus run-level accounting.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub results: Vec<StageResult>,
    pub total_duration: Duration,
    pub artifacts_produced: usize,
}

impl RunReport {
    pub fn failed_stages(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == StageStatus::Failed)
            .count()
    }
}

pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl StagePipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// External interrupts cancel this token; the pipeline stops issuing
    /// stages but still releases the browser.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    fn log(&self, message: &str) {
        if let Some(cb) = &self.progress {
            cb(message);
        }
    }

    /// Runs every stage in order and returns the run log.
    ///
    /// Consumes the context: whatever happens inside the stages, the
    /// browser handle is released exactly once before this returns.
    pub async fn run(self, mut ctx: RunContext) -> RunReport {
        let run_started = Instant::now();
        let mut results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            if self.cancel.is_cancelled() {
                self.log("cancelled; skipping remaining stages");
                break;
            }

            self.log(&format!("[{}] started", stage.name()));
            let started = Instant::now();
            let outcome = stage.run(&mut ctx).await;
            let duration = started.elapsed();

            match outcome {
                Ok(()) => {
                    self.log(&format!(
                        "[{}] finished in {:.1}s",
                        stage.name(),
                        duration.as_secs_f32()
                    ));
                    results.push(StageResult {
                        stage_name: stage.name().to_string(),
                        status: StageStatus::Ok,
                        error: None,
                        duration,
                    });
                }
                Err(err) => {
                    self.log(&format!("[{}] failed: {}", stage.name(), err));
                    results.push(StageResult {
                        stage_name: stage.name().to_string(),
                        status: StageStatus::Failed,
                        error: Some(err.to_string()),
                        duration,
                    });
                }
            }
        }

        if let Err(err) = ctx.browser.close().await {
            self.log(&format!("browser shutdown failed: {err}"));
        }

        RunReport {
            results,
            total_duration: run_started.elapsed(),
            artifacts_produced: ctx.artifacts.len(),
        }
    }
}
