//! RDAP authority resolution and registration-record lookup.
//!
//! Mirrors the IANA RDAP bootstrap mechanism (RFC 7484): a static registry
//! maps domain suffixes to candidate service endpoints, and a best-effort
//! scan with per-candidate error isolation finds the authoritative record.

mod bootstrap;
mod record;
mod resolver;

pub use bootstrap::{candidate_suffixes, BootstrapEntry, BootstrapRegistry};
pub use record::{Nameserver, RdapRecord, RegistrationEvent, FIELD_PLACEHOLDER};
pub use resolver::RdapResolver;
