//! AMP preview card: the target URL stamped onto the AMP template.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Stage;
use crate::report::{compose, FieldValue, FontSet, ImageCanvas, AMP_LAYOUT};
use crate::session::{ArtifactKind, RunContext};

pub struct AmpStage {
    assets_dir: PathBuf,
}

impl AmpStage {
    pub fn new(config: &Config) -> AmpStage {
        AmpStage {
            assets_dir: config.assets_dir.clone(),
        }
    }
}

#[async_trait]
impl Stage for AmpStage {
    fn name(&self) -> &'static str {
        "amp"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        let mut fields = HashMap::new();
        fields.insert("url", FieldValue::Text(ctx.target.url()));

        let fonts = FontSet::load(&self.assets_dir)?;
        let template = self.assets_dir.join("images/amp.jpg");
        let mut canvas = ImageCanvas::from_template(&template, fonts)?;
        compose(&mut canvas, AMP_LAYOUT, &fields);

        let path = ctx.artifact_path(ArtifactKind::Amp);
        canvas.save_png(&path)?;
        ctx.artifacts.record(ArtifactKind::Amp, path)
    }
}
