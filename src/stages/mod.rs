//! The pipeline stages, one per report artifact plus the optimize pass.

mod amp;
mod backlinks;
mod optimize;
mod performance;
mod responsive;
mod ssl;
mod whois;

pub use amp::AmpStage;
pub use backlinks::BacklinksStage;
pub use optimize::OptimizeStage;
pub use performance::PerformanceStage;
pub use responsive::ResponsiveStage;
pub use ssl::SslStage;
pub use whois::WhoisStage;

use image::RgbaImage;

use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::pipeline::Stage;
use crate::rdap::{BootstrapRegistry, RdapResolver};
use crate::report;
use crate::session::{ArtifactKind, RunContext};

/// Builds the standard stage sequence for one run.
///
/// The order is fixed: the whois artifact leads the report, the optimize
/// pass (when enabled) must run after every producer because it rewrites
/// the whole output directory.
pub fn build_stages(
    config: &Config,
    credentials: Option<Credentials>,
    optimize: bool,
) -> Vec<Box<dyn Stage>> {
    let http = reqwest::Client::new();
    let resolver = RdapResolver::with_client(http.clone(), BootstrapRegistry::builtin().clone());

    let mut stages: Vec<Box<dyn Stage>> = vec![
        Box::new(WhoisStage::new(http.clone(), resolver, config)),
        Box::new(ResponsiveStage::new(config)),
        Box::new(PerformanceStage::new(config, credentials)),
        Box::new(BacklinksStage::new(config)),
        Box::new(AmpStage::new(config)),
        Box::new(SslStage::new(http, config)),
    ];
    if optimize {
        stages.push(Box::new(OptimizeStage::new(config)));
    }
    stages
}

/// Grabs the current viewport and decodes it for cropping.
async fn capture_viewport(ctx: &mut RunContext) -> Result<RgbaImage> {
    let bytes = ctx.browser.screenshot().await?;
    report::decode_image(&bytes)
}

/// Writes `image` to its slot in the run directory and records it.
fn save_artifact(ctx: &mut RunContext, kind: ArtifactKind, image: &RgbaImage) -> Result<()> {
    let path = ctx.artifact_path(kind);
    image.save(&path)?;
    ctx.artifacts.record(kind, path)
}
