//! Report image composition.
//!
//! Stages collect raw material (API records, screenshots, fetched
//! thumbnails) and hand it to [`compose`], which stamps the fields onto a
//! template at fixed coordinates. Drawing goes through the [`Canvas`]
//! trait; the [`ImageCanvas`] implementation renders for real, while tests
//! drive the layout logic with a recording double.

mod canvas;
mod compositor;
mod layout;

pub use canvas::{Canvas, FontFamily, FontSet, ImageCanvas, TextStyle};
pub use compositor::{compose, truncate_with_ellipsis, FieldValue};
pub use layout::{
    Layout, Placement, AMP_LAYOUT, SSL_HTTPS_LAYOUT, SSL_HTTP_LAYOUT, WHOIS_LAYOUT,
};

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::Result;

/// Decodes fetched bytes (any supported format) into an RGBA bitmap.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Cuts a `(left, top, right, bottom)` box out of a screenshot.
pub fn crop_box(image: &RgbaImage, left: u32, top: u32, right: u32, bottom: u32) -> RgbaImage {
    let right = right.min(image.width());
    let bottom = bottom.min(image.height());
    let (left, top) = (left.min(right), top.min(bottom));
    imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
}

/// Scales both dimensions down by an integer divisor, used to turn fetched
/// flag images into inline thumbnails.
pub fn shrink_by_divisor(image: &RgbaImage, divisor: u32) -> RgbaImage {
    let width = (image.width() / divisor).max(1);
    let height = (image.height() / divisor).max(1);
    imageops::resize(image, width, height, FilterType::Triangle)
}
