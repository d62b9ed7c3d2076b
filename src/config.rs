//! Run configuration: timeouts, external service endpoints, asset locations.
//!
//! Defaults match the public services the report drives; every endpoint is
//! overridable so tests can point a stage at a local mock server.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub endpoints: Endpoints,
    /// Directory holding report templates and fonts.
    pub assets_dir: PathBuf,
    /// Where the browser drops downloaded files; defaults to the working
    /// directory at launch. The browser session and the optimize stage
    /// must agree on this, so resolve it once via
    /// [`Config::resolved_download_dir`].
    pub download_dir: Option<PathBuf>,
}

/// Capture viewport, written `WIDTHxHEIGHT` on the command line or as a
/// `[viewport]` table in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        // The capture size every template crop box was measured against.
        Viewport {
            width: 1280,
            height: 1024,
        }
    }
}

impl FromStr for Viewport {
    type Err = ReportError;

    fn from_str(input: &str) -> Result<Viewport> {
        let parse = |side: &str| side.parse::<u32>().ok().filter(|&px| px > 0);
        input
            .trim()
            .split_once(|c| c == 'x' || c == 'X')
            .and_then(|(w, h)| Some(Viewport { width: parse(w)?, height: parse(h)? }))
            .ok_or_else(|| {
                ReportError::Config(format!(
                    "viewport '{input}' must be WIDTHxHEIGHT with nonzero sides, e.g. 1280x1024"
                ))
            })
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    /// Hard page-load timeout. Applied only where a stage opts in; plain
    /// navigations carry no universal deadline.
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Interval between poll probes while waiting for external analysis.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Upper bound on one external analysis run; `None` waits indefinitely.
    #[serde(with = "humantime_serde")]
    pub analysis: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(400),
            poll_interval: Duration::from_secs(1),
            analysis: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoints {
    pub responsive: String,
    pub performance: String,
    pub backlinks: String,
    pub compressor: String,
    pub geolocation_base: String,
    pub flag_base: String,
    pub favicon_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            responsive: "https://amiresponsive.co.uk/".to_string(),
            performance: "https://gtmetrix.com/".to_string(),
            backlinks: "https://lxrmarketplace.com/seo-inbound-link-checker-tool.html"
                .to_string(),
            compressor: "https://imagecompressor.com/".to_string(),
            geolocation_base: "http://ip-api.com/json".to_string(),
            flag_base: "https://countryflagsapi.com/png".to_string(),
            favicon_base: "http://www.google.com/s2/favicons".to_string(),
        }
    }
}

impl Config {
    /// Loads from an explicit TOML file, or returns defaults when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| {
            ReportError::Config(format!("invalid config {}: {}", path.display(), e))
        })
    }

    /// The effective download directory: the configured one, or the
    /// working directory at the time of the call. Both the browser's
    /// download behavior and the optimize stage's archive wait use this.
    pub fn resolved_download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(env::current_dir()?),
        }
    }
}

/// Login credentials for the performance grader, sourced from the
/// environment only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Option<Credentials> {
        let email = env::var("SITEREPORT_EMAIL").ok()?;
        let password = env::var("SITEREPORT_PASSWORD").ok()?;
        if email.is_empty() || password.is_empty() {
            return None;
        }
        Some(Credentials { email, password })
    }
}
