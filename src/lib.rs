//! Site Report Library
//!
//! A library for producing a visual "site report" for a target website: a
//! directory of annotated images covering registration data, responsiveness,
//! performance, backlinks, AMP and SSL presentation, assembled by driving a
//! headless browser and a handful of public web services.
//!
//! # Module Overview
//!
//! - [`target`] - URL validation and normalization
//! - [`pipeline`] - Stage sequencing with partial-failure tolerance
//! - [`stages`] - The report stages themselves
//! - [`rdap`] - RDAP bootstrap registry and longest-suffix resolution
//! - [`report`] - Template composition (text and bitmap stamping)
//! - [`browser`] - Headless browser seam (CDP implementation feature-gated)
//! - [`poll`] - Poll-based wait for externally rendered UI state
//! - [`output_path`] - Collision-avoiding output directory allocation
//! - [`config`] - Configuration file support
//!
//! # Example
//!
//! ```no_run
//! use sitereport_lib::{build_stages, Config, RunContext, StagePipeline, Target};
//!
//! # async fn example(browser: sitereport_lib::BrowserHandle) -> sitereport_lib::Result<()> {
//! let config = Config::default();
//! let target = Target::parse("example.com")?;
//! let output_dir = sitereport_lib::allocate_output_dir(".".as_ref(), "example")?;
//!
//! let ctx = RunContext::new("example", output_dir, target, browser);
//! let pipeline = StagePipeline::new(build_stages(&config, None, false));
//! let report = pipeline.run(ctx).await;
//! println!("{} artifacts", report.artifacts_produced);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod output_path;
pub mod pipeline;
pub mod poll;
pub mod progress;
pub mod rdap;
pub mod report;
pub mod session;
pub mod stages;
pub mod target;

pub use browser::{Browser, BrowserHandle};
#[cfg(feature = "headless-chrome")]
pub use browser::{CdpBrowser, CdpBrowserOptions};
pub use config::{Config, Credentials, Endpoints, Timeouts, Viewport};
pub use error::{ErrorCategory, ErrorPayload, ReportError, Result};
pub use output_path::allocate_output_dir;
pub use pipeline::{RunReport, Stage, StagePipeline, StageResult, StageStatus};
pub use progress::ProgressCallback;
pub use rdap::{BootstrapRegistry, RdapRecord, RdapResolver};
pub use session::{ArtifactKind, ArtifactSet, RunContext};
pub use stages::build_stages;
pub use target::{Scheme, Target};
