//! The RDAP bootstrap registry: suffix sets to candidate service URLs.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{ReportError, Result};

/// Snapshot of the published IANA DNS bootstrap document.
const BUILTIN_BOOTSTRAP: &str = include_str!("../../assets/rdap-dns.json");

/// One bootstrap service entry: a set of TLD/suffix labels and the ordered
/// candidate endpoints serving them.
#[derive(Debug, Clone)]
pub struct BootstrapEntry {
    suffixes: Vec<String>,
    service_urls: Vec<String>,
}

impl BootstrapEntry {
    pub fn new(
        suffixes: impl IntoIterator<Item = impl Into<String>>,
        service_urls: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            service_urls: service_urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains_suffix(&self, suffix: &str) -> bool {
        self.suffixes.iter().any(|s| s.eq_ignore_ascii_case(suffix))
    }

    pub fn primary_url(&self) -> Option<&str> {
        self.service_urls.first().map(String::as_str)
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

/// The full registry, loaded once per process and read-only afterwards.
#[derive(Debug, Clone)]
pub struct BootstrapRegistry {
    entries: Vec<BootstrapEntry>,
}

/// Wire format of the IANA bootstrap document: each service is a pair of
/// `[suffixes, urls]` arrays.
#[derive(Debug, Deserialize)]
struct BootstrapDocument {
    services: Vec<(Vec<String>, Vec<String>)>,
}

impl BootstrapRegistry {
    /// The embedded IANA snapshot, parsed on first use.
    pub fn builtin() -> &'static BootstrapRegistry {
        static REGISTRY: OnceLock<BootstrapRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            BootstrapRegistry::from_json(BUILTIN_BOOTSTRAP)
                .expect("embedded bootstrap snapshot is valid")
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: BootstrapDocument = serde_json::from_str(json)
            .map_err(|e| ReportError::Config(format!("invalid RDAP bootstrap document: {e}")))?;
        Ok(Self {
            entries: doc
                .services
                .into_iter()
                .map(|(suffixes, service_urls)| BootstrapEntry {
                    suffixes,
                    service_urls,
                })
                .collect(),
        })
    }

    pub fn from_entries(entries: Vec<BootstrapEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BootstrapEntry] {
        &self.entries
    }
}

/// Every right-aligned suffix of `domain`, longest first.
///
/// `a.b.example.com` yields `a.b.example.com`, `b.example.com`,
/// `example.com`, `com`.
pub fn candidate_suffixes(domain: &str) -> Vec<String> {
    let labels: Vec<&str> = domain
        .split('.')
        .filter(|label| !label.is_empty())
        .collect();
    (0..labels.len()).map(|i| labels[i..].join(".")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_snapshot_parses_and_covers_common_tlds() {
        let registry = BootstrapRegistry::builtin();
        assert!(!registry.entries().is_empty());
        let com = registry
            .entries()
            .iter()
            .find(|e| e.contains_suffix("com"))
            .expect("com entry");
        assert!(com.primary_url().unwrap().starts_with("https://"));
    }

    #[test]
    fn wire_format_pairs_suffixes_with_urls() {
        let registry = BootstrapRegistry::from_json(
            r#"{"version":"1.0","services":[[["example","test"],["https://rdap.example.net/"]]]}"#,
        )
        .unwrap();
        let entry = &registry.entries()[0];
        assert_eq!(entry.suffixes(), ["example", "test"]);
        assert_eq!(entry.primary_url(), Some("https://rdap.example.net/"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(BootstrapRegistry::from_json("{}").is_err());
        assert!(BootstrapRegistry::from_json("not json").is_err());
    }

    #[test]
    fn suffixes_run_from_full_domain_to_tld() {
        assert_eq!(
            candidate_suffixes("a.b.example.com"),
            ["a.b.example.com", "b.example.com", "example.com", "com"]
        );
        assert_eq!(candidate_suffixes("example.com"), ["example.com", "com"]);
        assert_eq!(candidate_suffixes("com"), ["com"]);
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        let entry = BootstrapEntry::new(["com"], ["https://rdap.example.net/"]);
        assert!(entry.contains_suffix("COM"));
        assert!(!entry.contains_suffix("org"));
    }
}
