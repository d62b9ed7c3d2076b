//! Multi-device preview via the responsive mockup service.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, Viewport};
use crate::error::Result;
use crate::pipeline::Stage;
use crate::report::crop_box;
use crate::session::{ArtifactKind, RunContext};

use super::{capture_viewport, save_artifact};

// The device mockup region on a 1280x1024 viewport.
const CROP: (u32, u32, u32, u32) = (140, 90, 1115, 635);

pub struct ResponsiveStage {
    endpoint: String,
    viewport: Viewport,
    navigation_timeout: Duration,
}

impl ResponsiveStage {
    pub fn new(config: &Config) -> ResponsiveStage {
        ResponsiveStage {
            endpoint: config.endpoints.responsive.clone(),
            viewport: config.viewport,
            navigation_timeout: config.timeouts.navigation,
        }
    }
}

#[async_trait]
impl Stage for ResponsiveStage {
    fn name(&self) -> &'static str {
        "responsive"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        let url = ctx.target.url();
        let browser = ctx.browser.as_mut();

        browser
            .navigate(&self.endpoint, Some(self.navigation_timeout))
            .await?;
        browser
            .set_viewport(self.viewport.width, self.viewport.height)
            .await?;

        browser.type_text(r#"input[name="site"]"#, &url).await?;
        browser.press_enter(r#"input[name="site"]"#).await?;

        // Strip page chrome so only the device mockups are in frame.
        browser
            .run_script(r##"document.querySelector('[role="main"]').style.background = "#fff""##)
            .await?;
        browser
            .run_script(r#"document.querySelector(".devices blockquote").remove()"#)
            .await?;
        // The entry form is not rendered on every result page.
        let _ = browser
            .run_script(r#"document.querySelector("form").remove()"#)
            .await;
        browser
            .run_script("window.scrollTo({top:70, left:0, behavior: 'auto'})")
            .await?;

        let screenshot = capture_viewport(ctx).await?;
        let cropped = crop_box(&screenshot, CROP.0, CROP.1, CROP.2, CROP.3);
        save_artifact(ctx, ArtifactKind::Responsive, &cropped)
    }
}
