//! The registration record shape shared by RDAP authorities.

use serde::{Deserialize, Serialize};

/// Rendered in place of any field no authority could fill.
pub const FIELD_PLACEHOLDER: &str = "\u{2014}";

/// A loosely-typed RDAP domain registration record.
///
/// Either fully parsed from one authority response or empty; resolution
/// never leaves a record partially filled. Empty means "unknown", not
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RdapRecord {
    pub ldh_name: Option<String>,
    pub status: Vec<String>,
    pub nameservers: Vec<Nameserver>,
    pub events: Vec<RegistrationEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nameserver {
    pub ldh_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationEvent {
    pub event_action: Option<String>,
    pub event_date: Option<String>,
}

impl RdapRecord {
    /// An authoritative record always carries a canonical domain name.
    pub fn is_empty(&self) -> bool {
        self.ldh_name.as_deref().map_or(true, str::is_empty)
    }

    pub fn status_line(&self) -> String {
        if self.status.is_empty() {
            FIELD_PLACEHOLDER.to_string()
        } else {
            self.status.join(", ")
        }
    }

    /// One nameserver hostname per line, or the placeholder.
    pub fn nameserver_lines(&self) -> String {
        let lines: Vec<&str> = self
            .nameservers
            .iter()
            .filter_map(|ns| ns.ldh_name.as_deref())
            .collect();
        if lines.is_empty() {
            FIELD_PLACEHOLDER.to_string()
        } else {
            lines.join("\n")
        }
    }

    /// `action: date` per registration event, or the placeholder.
    pub fn event_lines(&self) -> String {
        let lines: Vec<String> = self
            .events
            .iter()
            .filter_map(|event| match (&event.event_action, &event.event_date) {
                (Some(action), Some(date)) => Some(format!("{action}: {date}")),
                _ => None,
            })
            .collect();
        if lines.is_empty() {
            FIELD_PLACEHOLDER.to_string()
        } else {
            lines.join("\n")
        }
    }
}
