//! Registration snapshot: RDAP record, IP geolocation, page title, flag.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use async_trait::async_trait;
use image::RgbaImage;
use regex::Regex;
use serde::Deserialize;

use crate::config::{Config, Endpoints};
use crate::error::Result;
use crate::pipeline::Stage;
use crate::rdap::{RdapRecord, RdapResolver};
use crate::report::{self, compose, FieldValue, FontSet, ImageCanvas, WHOIS_LAYOUT};
use crate::session::{ArtifactKind, RunContext};

/// The divisor turning a full-size flag image into an inline thumbnail.
const FLAG_SHRINK_DIVISOR: u32 = 20;

pub struct WhoisStage {
    http: reqwest::Client,
    resolver: RdapResolver,
    endpoints: Endpoints,
    assets_dir: PathBuf,
}

impl WhoisStage {
    pub fn new(http: reqwest::Client, resolver: RdapResolver, config: &Config) -> WhoisStage {
        WhoisStage {
            http,
            resolver,
            endpoints: config.endpoints.clone(),
            assets_dir: config.assets_dir.clone(),
        }
    }

    /// Fetches the target's `<title>`; any page without one reports
    /// "No Title".
    async fn fetch_title(&self, url: &str) -> Result<String> {
        static TITLE: OnceLock<Regex> = OnceLock::new();
        let pattern = TITLE
            .get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));

        let body = self.http.get(url).send().await?.text().await?;
        let title = pattern
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(title.unwrap_or_else(|| "No Title".to_string()))
    }

    /// Looks the host up at the geolocation service. Failures degrade to an
    /// empty record so the artifact still renders from RDAP data alone.
    async fn fetch_geolocation(&self, host: &str) -> GeoRecord {
        let url = format!(
            "{}/{}",
            self.endpoints.geolocation_base.trim_end_matches('/'),
            host
        );
        let response = self
            .http
            .get(&url)
            .query(&[("fields", "66846719")])
            .send()
            .await;
        match response {
            Ok(response) if response.status().is_success() => {
                response.json().await.unwrap_or_default()
            }
            _ => GeoRecord::default(),
        }
    }

    /// Fetches and shrinks the country flag; decoration only, so any
    /// failure just drops it from the artifact.
    async fn fetch_flag(&self, country_code: &str) -> Option<RgbaImage> {
        let url = format!(
            "{}/{}",
            self.endpoints.flag_base.trim_end_matches('/'),
            country_code
        );
        let bytes = self
            .http
            .get(&url)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .bytes()
            .await
            .ok()?;
        let flag = report::decode_image(&bytes).ok()?;
        Some(report::shrink_by_divisor(&flag, FLAG_SHRINK_DIVISOR))
    }
}

/// The subset of the geolocation response the whois artifact uses,
/// selected server-side by the `fields` bitmask.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GeoRecord {
    query: Option<String>,
    reverse: Option<String>,
    city: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

impl GeoRecord {
    /// "Country - City" when both are known, bare country otherwise,
    /// nothing when the lookup failed.
    fn location_line(&self) -> Option<String> {
        let country = self.country.as_deref()?;
        match self.city.as_deref() {
            Some(city) if !city.is_empty() => Some(format!("{country} - {city}")),
            _ => Some(country.to_string()),
        }
    }
}

fn build_fields(
    host: &str,
    title: &str,
    record: &RdapRecord,
    geo: &GeoRecord,
    flag: Option<RgbaImage>,
) -> HashMap<&'static str, FieldValue> {
    let mut fields = HashMap::new();
    fields.insert("domain", FieldValue::Text(host.to_string()));
    fields.insert("status", FieldValue::Text(record.status_line()));
    fields.insert("nameservers", FieldValue::Text(record.nameserver_lines()));
    fields.insert("events", FieldValue::Text(record.event_lines()));
    fields.insert("title", FieldValue::Text(title.to_string()));
    if let Some(ip) = &geo.query {
        fields.insert("ip", FieldValue::Text(ip.clone()));
    }
    if let Some(reverse) = &geo.reverse {
        fields.insert("reverse", FieldValue::Text(reverse.clone()));
    }
    if let Some(location) = geo.location_line() {
        fields.insert("location", FieldValue::Text(location));
    }
    if let Some(flag) = flag {
        fields.insert("flag", FieldValue::Bitmap(flag));
    }
    fields
}

#[async_trait]
impl Stage for WhoisStage {
    fn name(&self) -> &'static str {
        "whois"
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        let title = self.fetch_title(&ctx.target.url()).await?;
        let record = self.resolver.resolve(ctx.target.host()).await;
        let geo = self.fetch_geolocation(ctx.target.host()).await;
        let flag = match geo.country_code.as_deref() {
            Some(code) => self.fetch_flag(code).await,
            None => None,
        };

        let fields = build_fields(ctx.target.host(), &title, &record, &geo, flag);

        let fonts = FontSet::load(&self.assets_dir)?;
        let template = self.assets_dir.join("images/whois.jpg");
        let mut canvas = ImageCanvas::from_template(&template, fonts)?;
        compose(&mut canvas, WHOIS_LAYOUT, &fields);

        let path = ctx.artifact_path(ArtifactKind::Whois);
        canvas.save_png(&path)?;
        ctx.artifacts.record(ArtifactKind::Whois, path)
    }
}
