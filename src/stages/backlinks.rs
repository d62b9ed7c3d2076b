//! Inbound-link summary from the backlink checker tool.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, Viewport};
use crate::error::Result;
use crate::pipeline::Stage;
use crate::report::crop_box;
use crate::session::{ArtifactKind, RunContext};

use super::{capture_viewport, save_artifact};

const URL_FIELD: &str = r#"input[name="url"]"#;
const CROP: (u32, u32, u32, u32) = (90, 130, 1230, 540);

pub struct BacklinksStage {
    endpoint: String,
    viewport: Viewport,
    navigation_timeout: Duration,
}

impl BacklinksStage {
    pub fn new(config: &Config) -> BacklinksStage {
        BacklinksStage {
            endpoint: config.endpoints.backlinks.clone(),
            viewport: config.viewport,
            navigation_timeout: config.timeouts.navigation,
        }
    }
}

#[async_trait]
impl Stage for BacklinksStage {
    fn name(&self) -> &'static str {
        "backlinks"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        let url = ctx.target.url();
        let browser = ctx.browser.as_mut();

        browser.clear_cookies().await?;
        browser
            .navigate(&self.endpoint, Some(self.navigation_timeout))
            .await?;
        browser
            .set_viewport(self.viewport.width, self.viewport.height)
            .await?;

        browser.type_text(URL_FIELD, &url).await?;
        browser.press_enter(URL_FIELD).await?;

        // Cookie banner and entry form cover the result table.
        let _ = browser
            .run_script(r##"document.querySelector("#cookiePopup").remove()"##)
            .await;
        let _ = browser
            .run_script(r##"document.querySelector("#frm-wrap").remove()"##)
            .await;
        browser
            .run_script("window.scrollTo({top:30, left:0, behavior: 'auto'})")
            .await?;

        let screenshot = capture_viewport(ctx).await?;
        let cropped = crop_box(&screenshot, CROP.0, CROP.1, CROP.2, CROP.3);
        save_artifact(ctx, ArtifactKind::Backlinks, &cropped)
    }
}
