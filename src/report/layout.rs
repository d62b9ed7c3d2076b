//! Fixed coordinate tables for the report templates.
//!
//! Each table pairs a field name with the pixel position the template was
//! designed around. The tables are data, not logic: changing a template
//! means editing a coordinate here, nothing else.

use super::canvas::{FontFamily, TextStyle};

/// Where one field lands on its template.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    /// Style for text fields; bitmap fields ignore it.
    pub style: TextStyle,
}

pub type Layout = &'static [(&'static str, Placement)];

const fn text(x: i64, y: i64, style: TextStyle) -> Placement {
    Placement { x, y, style }
}

const fn bitmap(x: i64, y: i64) -> Placement {
    // Style is irrelevant for pasted bitmaps; any value works.
    Placement {
        x,
        y,
        style: BODY,
    }
}

const GREY: [u8; 3] = [90, 90, 90];
const DARK_GREY: [u8; 3] = [70, 70, 70];
const WHITE: [u8; 3] = [255, 255, 255];

const BODY: TextStyle = TextStyle::new(FontFamily::Body, 10.0, GREY);
const DOMAIN: TextStyle = TextStyle::new(FontFamily::Body, 20.0, DARK_GREY);
const WHOIS_TITLE: TextStyle = TextStyle::new(FontFamily::Accent, 10.0, GREY);
const AMP_URL: TextStyle = TextStyle::new(FontFamily::Display, 21.0, WHITE);
const SSL_TEXT: TextStyle = TextStyle::new(FontFamily::Accent, 14.0, WHITE);

pub const WHOIS_LAYOUT: Layout = &[
    ("domain", text(165, 0, DOMAIN)),
    ("status", text(120, 65, BODY)),
    ("nameservers", text(120, 90, BODY)),
    ("events", text(120, 152, BODY)),
    ("ip", text(120, 250, BODY)),
    ("reverse", text(195, 250, BODY)),
    ("location", text(140, 273, BODY)),
    ("flag", bitmap(120, 275)),
    ("title", text(120, 330, WHOIS_TITLE)),
];

pub const AMP_LAYOUT: Layout = &[("url", text(80, 28, AMP_URL))];

pub const SSL_HTTPS_LAYOUT: Layout = &[
    ("favicon", bitmap(17, 8)),
    ("title", text(41, 7, SSL_TEXT)),
    ("url", text(172, 42, SSL_TEXT)),
];

/// The plain-HTTP template leaves room for the "not secure" chrome, which
/// shifts the address text right.
pub const SSL_HTTP_LAYOUT: Layout = &[
    ("favicon", bitmap(17, 8)),
    ("title", text(41, 7, SSL_TEXT)),
    ("url", text(260, 42, SSL_TEXT)),
];
