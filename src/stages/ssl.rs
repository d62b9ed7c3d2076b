//! Browser-bar mockup showing the target's scheme, favicon and title.
//!
//! Uses the scheme-specific template: the padlock variant for HTTPS, the
//! "not secure" variant for plain HTTP, each with its own text offsets.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;

use crate::config::{Config, Endpoints};
use crate::error::Result;
use crate::pipeline::Stage;
use crate::report::{
    self, compose, truncate_with_ellipsis, FieldValue, FontSet, ImageCanvas, SSL_HTTPS_LAYOUT,
    SSL_HTTP_LAYOUT,
};
use crate::session::{ArtifactKind, RunContext};
use crate::target::Scheme;

/// Browser tabs cut titles off around this length.
const TITLE_DISPLAY_CHARS: usize = 20;

pub struct SslStage {
    http: reqwest::Client,
    endpoints: Endpoints,
    assets_dir: PathBuf,
    navigation_timeout: Duration,
}

impl SslStage {
    pub fn new(http: reqwest::Client, config: &Config) -> SslStage {
        SslStage {
            http,
            endpoints: config.endpoints.clone(),
            assets_dir: config.assets_dir.clone(),
            navigation_timeout: config.timeouts.navigation,
        }
    }

    /// Favicon via the public favicon service; decoration only.
    async fn fetch_favicon(&self, url: &str) -> Option<RgbaImage> {
        let base = self.endpoints.favicon_base.trim_end_matches('/');
        let bytes = self
            .http
            .get(base)
            .query(&[("domain", url)])
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .bytes()
            .await
            .ok()?;
        report::decode_image(&bytes).ok()
    }
}

#[async_trait]
impl Stage for SslStage {
    fn name(&self) -> &'static str {
        "ssl"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        let url = ctx.target.url();
        let scheme = ctx.target.scheme();

        ctx.browser
            .navigate(&url, Some(self.navigation_timeout))
            .await?;
        let title = ctx
            .browser
            .run_script("document.title")
            .await?
            .as_str()
            .map(str::to_string)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No Title".to_string());

        let favicon = self.fetch_favicon(&url).await;

        let mut fields = HashMap::new();
        fields.insert("url", FieldValue::Text(url));
        fields.insert(
            "title",
            FieldValue::Text(truncate_with_ellipsis(&title, TITLE_DISPLAY_CHARS)),
        );
        if let Some(favicon) = favicon {
            fields.insert("favicon", FieldValue::Bitmap(favicon));
        }

        let (template, layout) = match scheme {
            Scheme::Https => ("images/https.jpg", SSL_HTTPS_LAYOUT),
            Scheme::Http => ("images/http.jpg", SSL_HTTP_LAYOUT),
        };
        let fonts = FontSet::load(&self.assets_dir)?;
        let mut canvas = ImageCanvas::from_template(&self.assets_dir.join(template), fonts)?;
        compose(&mut canvas, layout, &fields);

        let path = ctx.artifact_path(ArtifactKind::Ssl);
        canvas.save_png(&path)?;
        ctx.artifacts.record(ArtifactKind::Ssl, path)
    }
}
