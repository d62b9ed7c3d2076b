//! Input URL validation and normalization.
//!
//! Accepts scheme-qualified URLs and bare hostnames, rejects malformed
//! input, and exposes the pieces (scheme, host, path) the stages need.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{ReportError, Result};

/// The only schemes a report run accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated report target. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Target {
    raw_input: String,
    scheme: Scheme,
    host: String,
    path: String,
}

fn url_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| {
        // scheme://[www.]host.tld[/path]; host from an alphanumeric-plus
        // @:%._+~#?&/= set, tld 2-6 lowercase letters.
        Regex::new(
            r"^https?://[-a-zA-Z0-9@:%._\+~#?&/=]{2,256}\.[a-z]{2,6}([-a-zA-Z0-9@:%._\+~#?&/=]*)$",
        )
        .expect("url shape regex")
    })
}

impl Target {
    /// Validates `input` and splits it into scheme, host, and path.
    ///
    /// A bare hostname gets an `https://` prefix before matching. A string
    /// that already contains `http` but lacks `://` is ambiguous and is
    /// rejected outright rather than repaired.
    pub fn parse(input: &str) -> Result<Target> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReportError::InvalidUrl("empty input".to_string()));
        }

        let candidate = if trimmed.contains("http") {
            if !trimmed.contains("://") {
                return Err(ReportError::InvalidUrl(format!(
                    "malformed scheme in '{}'",
                    trimmed
                )));
            }
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        if !url_shape().is_match(&candidate) {
            return Err(ReportError::InvalidUrl(format!(
                "'{}' does not look like a website URL",
                trimmed
            )));
        }

        let parsed = Url::parse(&candidate)
            .map_err(|e| ReportError::InvalidUrl(format!("'{}': {}", trimmed, e)))?;

        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(ReportError::InvalidUrl(format!(
                    "unsupported scheme '{}'",
                    other
                )))
            }
        };

        let host = parsed
            .host_str()
            .ok_or_else(|| ReportError::InvalidUrl(format!("'{}' has no host", trimmed)))?
            .to_string();

        Ok(Target {
            raw_input: input.to_string(),
            scheme,
            host,
            path: parsed.path().to_string(),
        })
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Hostname including any `www.` prefix the user supplied.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full normalized URL driven through every external tool.
    pub fn url(&self) -> String {
        let path = if self.path == "/" { "" } else { self.path.as_str() };
        format!("{}://{}{}", self.scheme, self.host, path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_scheme_qualified_urls() {
        let target = Target::parse("https://www.google.com").unwrap();
        assert_eq!(target.scheme(), Scheme::Https);
        assert_eq!(target.host(), "www.google.com");

        let target = Target::parse("http://www.google.com").unwrap();
        assert_eq!(target.scheme(), Scheme::Http);
    }

    #[test]
    fn infers_https_for_bare_hostnames() {
        let target = Target::parse("google.com").unwrap();
        assert_eq!(target.scheme(), Scheme::Https);
        assert_eq!(target.host(), "google.com");

        let target = Target::parse("www.google.com").unwrap();
        assert_eq!(target.host(), "www.google.com");
    }

    #[test]
    fn rejects_malformed_scheme_separator() {
        assert!(Target::parse("https;//www.google.com").is_err());
        assert!(Target::parse("http:/example.com").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Target::parse("").is_err());
        assert!(Target::parse("not a url").is_err());
        assert!(Target::parse("ftp://example.com").is_err());
    }

    #[test]
    fn keeps_path_separate_from_host() {
        let target = Target::parse("https://example.com/pricing").unwrap();
        assert_eq!(target.host(), "example.com");
        assert_eq!(target.path(), "/pricing");
        assert_eq!(target.url(), "https://example.com/pricing");
    }

    #[test]
    fn url_round_trips_scheme_and_host() {
        for input in ["https://example.com", "http://www.example.org"] {
            let target = Target::parse(input).unwrap();
            assert_eq!(target.url(), *input);
        }
    }
}
