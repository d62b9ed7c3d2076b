//! Best-effort RDAP lookup against the bootstrap registry.

use std::collections::HashSet;
use std::time::Duration;

use super::bootstrap::{candidate_suffixes, BootstrapRegistry};
use super::record::RdapRecord;
use crate::error::Result;

/// Resolves the authoritative RDAP endpoint for a domain and fetches its
/// registration record.
#[derive(Debug, Clone)]
pub struct RdapResolver {
    client: reqwest::Client,
    registry: BootstrapRegistry,
}

impl RdapResolver {
    pub fn new(registry: BootstrapRegistry) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { client, registry }
    }

    /// Uses a caller-supplied client, e.g. one pointed at a mock server.
    pub fn with_client(client: reqwest::Client, registry: BootstrapRegistry) -> Self {
        Self { client, registry }
    }

    /// Resolves `domain` to its registration record.
    ///
    /// Candidate suffixes are probed longest first; entries sharing a
    /// suffix length are tried in registry order. A transport or parse
    /// failure, a non-success status, or a body without a non-empty
    /// `ldhName` all mean "no answer from this entry" and the scan
    /// continues. When every candidate misses, the result is an empty
    /// record: callers treat that as unknown, never as failure.
    pub async fn resolve(&self, domain: &str) -> RdapRecord {
        let mut queried: HashSet<usize> = HashSet::new();

        for suffix in candidate_suffixes(domain) {
            for (index, entry) in self.registry.entries().iter().enumerate() {
                if !entry.contains_suffix(&suffix) || !queried.insert(index) {
                    continue;
                }
                let Some(base) = entry.primary_url() else {
                    continue;
                };
                match self.query(base, domain).await {
                    Ok(Some(record)) => return record,
                    Ok(None) => {}
                    Err(_) => {}
                }
            }
        }

        RdapRecord::default()
    }

    /// `GET {base}/domain/{domain}`, authoritative only when the response
    /// succeeds and carries a non-empty `ldhName`.
    async fn query(&self, base: &str, domain: &str) -> Result<Option<RdapRecord>> {
        let url = format!("{}/domain/{}", base.trim_end_matches('/'), domain);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let record: RdapRecord = response.json().await?;
        if record.is_empty() {
            return Ok(None);
        }
        Ok(Some(record))
    }
}
