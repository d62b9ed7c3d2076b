//! Stamps collected field values onto a template at fixed coordinates.

use std::collections::HashMap;

use image::RgbaImage;

use super::canvas::Canvas;
use super::layout::Layout;

/// One piece of report content, ready to place.
pub enum FieldValue {
    Text(String),
    Bitmap(RgbaImage),
}

/// Walks `layout` in order and stamps every field that has a value.
///
/// Fields with no value are skipped silently: missing data renders as a
/// blank spot on the template, never as an error. Values without a layout
/// entry are ignored the same way.
pub fn compose(canvas: &mut dyn Canvas, layout: Layout, fields: &HashMap<&str, FieldValue>) {
    for (name, placement) in layout {
        match fields.get(name) {
            Some(FieldValue::Text(text)) => {
                canvas.draw_text(placement.x, placement.y, text, placement.style);
            }
            Some(FieldValue::Bitmap(bitmap)) => {
                canvas.paste(placement.x, placement.y, bitmap);
            }
            None => {}
        }
    }
}

/// Caps display text at `max_chars`, marking the cut with an ellipsis.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::canvas::TextStyle;
    use super::super::layout::{SSL_HTTPS_LAYOUT, SSL_HTTP_LAYOUT, WHOIS_LAYOUT};
    use super::*;
    use image::Rgba;

    /// Records draw calls instead of rendering them.
    #[derive(Default)]
    struct RecordingCanvas {
        texts: Vec<(i64, i64, String, TextStyle)>,
        pastes: Vec<(i64, i64, (u32, u32))>,
    }

    impl Canvas for RecordingCanvas {
        fn draw_text(&mut self, x: i64, y: i64, text: &str, style: TextStyle) {
            self.texts.push((x, y, text.to_string(), style));
        }

        fn paste(&mut self, x: i64, y: i64, bitmap: &RgbaImage) {
            self.pastes.push((x, y, bitmap.dimensions()));
        }
    }

    fn thumb(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn absent_fields_are_skipped_not_errors() {
        let mut canvas = RecordingCanvas::default();
        let mut fields = HashMap::new();
        fields.insert("domain", FieldValue::Text("example.com".to_string()));
        fields.insert("ip", FieldValue::Text("93.184.216.34".to_string()));

        compose(&mut canvas, WHOIS_LAYOUT, &fields);

        assert_eq!(canvas.texts.len(), 2);
        assert!(canvas.pastes.is_empty());
    }

    #[test]
    fn whois_fields_land_on_their_template_coordinates() {
        let mut canvas = RecordingCanvas::default();
        let mut fields = HashMap::new();
        fields.insert("domain", FieldValue::Text("example.com".to_string()));
        fields.insert("location", FieldValue::Text("Iceland - Reykjavik".to_string()));
        fields.insert("flag", FieldValue::Bitmap(thumb(16, 10)));

        compose(&mut canvas, WHOIS_LAYOUT, &fields);

        assert_eq!(canvas.texts[0].0, 165);
        assert_eq!(canvas.texts[0].1, 0);
        assert_eq!(canvas.texts[1], (140, 273, "Iceland - Reykjavik".to_string(), canvas.texts[1].3));
        assert_eq!(canvas.pastes, vec![(120, 275, (16, 10))]);
    }

    #[test]
    fn layout_order_decides_stacking_order() {
        let mut canvas = RecordingCanvas::default();
        let mut fields = HashMap::new();
        fields.insert("favicon", FieldValue::Bitmap(thumb(16, 16)));
        fields.insert("url", FieldValue::Text("https://example.com".to_string()));
        fields.insert("title", FieldValue::Text("Example".to_string()));

        compose(&mut canvas, SSL_HTTPS_LAYOUT, &fields);

        // Favicon first, then title, then url per the table.
        assert_eq!(canvas.pastes[0], (17, 8, (16, 16)));
        assert_eq!(canvas.texts[0].2, "Example");
        assert_eq!(canvas.texts[1].0, 172);
    }

    #[test]
    fn http_template_shifts_the_address_text() {
        let mut canvas = RecordingCanvas::default();
        let mut fields = HashMap::new();
        fields.insert("url", FieldValue::Text("http://example.com".to_string()));

        compose(&mut canvas, SSL_HTTP_LAYOUT, &fields);

        assert_eq!(canvas.texts[0].0, 260);
        assert_eq!(canvas.texts[0].1, 42);
    }

    #[test]
    fn values_without_a_layout_slot_are_ignored() {
        let mut canvas = RecordingCanvas::default();
        let mut fields = HashMap::new();
        fields.insert("nonexistent", FieldValue::Text("x".to_string()));

        compose(&mut canvas, WHOIS_LAYOUT, &fields);

        assert!(canvas.texts.is_empty());
        assert!(canvas.pastes.is_empty());
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate_with_ellipsis("short", 20), "short");
        assert_eq!(
            truncate_with_ellipsis("exactly-twenty-chars", 20),
            "exactly-twenty-chars"
        );
        assert_eq!(
            truncate_with_ellipsis("a very long page title indeed", 20),
            "a very long page tit..."
        );
    }
}
