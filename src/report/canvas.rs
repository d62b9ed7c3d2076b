//! Drawing primitives behind a trait so composition logic stays testable.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::{ReportError, Result};

/// The three typefaces the report templates were designed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    /// Lato Regular, the small-print workhorse.
    Body,
    /// Vazirmatn Regular, used for page titles.
    Accent,
    /// Roboto Medium, used for large single-line headings.
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontFamily,
    pub size: f32,
    pub color: [u8; 3],
}

impl TextStyle {
    pub const fn new(font: FontFamily, size: f32, color: [u8; 3]) -> TextStyle {
        TextStyle { font, size, color }
    }
}

/// A surface fields can be stamped onto.
pub trait Canvas {
    /// Draws `text` with its top-left corner at `(x, y)`. Embedded
    /// newlines start a fresh line below the previous one.
    fn draw_text(&mut self, x: i64, y: i64, text: &str, style: TextStyle);

    /// Alpha-blends `bitmap` onto the surface at `(x, y)`.
    fn paste(&mut self, x: i64, y: i64, bitmap: &RgbaImage);
}

/// The fonts shipped alongside the report templates, loaded from the
/// assets directory at startup.
pub struct FontSet {
    body: FontVec,
    accent: FontVec,
    display: FontVec,
}

impl FontSet {
    pub fn load(assets_dir: &Path) -> Result<FontSet> {
        Ok(FontSet {
            body: load_font(assets_dir, "fonts/Lato-Regular.ttf")?,
            accent: load_font(assets_dir, "fonts/Vazirmatn-Regular.ttf")?,
            display: load_font(assets_dir, "fonts/Roboto-Medium.ttf")?,
        })
    }

    fn get(&self, family: FontFamily) -> &FontVec {
        match family {
            FontFamily::Body => &self.body,
            FontFamily::Accent => &self.accent,
            FontFamily::Display => &self.display,
        }
    }
}

fn load_font(assets_dir: &Path, relative: &str) -> Result<FontVec> {
    let path = assets_dir.join(relative);
    let bytes = std::fs::read(&path).map_err(|e| {
        ReportError::Config(format!("failed to read font {}: {}", path.display(), e))
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| {
        ReportError::Config(format!("{} is not a usable font file", path.display()))
    })
}

/// Real renderer over an RGBA template image.
pub struct ImageCanvas {
    image: RgbaImage,
    fonts: FontSet,
}

impl ImageCanvas {
    /// Opens a template image from disk as the drawing surface.
    pub fn from_template(path: &Path, fonts: FontSet) -> Result<ImageCanvas> {
        let image = image::open(path)
            .map_err(|e| {
                ReportError::Config(format!(
                    "failed to open template {}: {}",
                    path.display(),
                    e
                ))
            })?
            .to_rgba8();
        Ok(ImageCanvas { image, fonts })
    }

    pub fn from_image(image: RgbaImage, fonts: FontSet) -> ImageCanvas {
        ImageCanvas { image, fonts }
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Canvas for ImageCanvas {
    fn draw_text(&mut self, x: i64, y: i64, text: &str, style: TextStyle) {
        let color = Rgba([style.color[0], style.color[1], style.color[2], 255]);
        let scale = PxScale::from(style.size);
        let font = self.fonts.get(style.font);
        // Line spacing follows the nominal glyph height, matching how the
        // templates were laid out.
        let line_height = style.size.ceil() as i64 + 2;
        for (line_index, line) in text.lines().enumerate() {
            let line_y = y + line_index as i64 * line_height;
            draw_text_mut(
                &mut self.image,
                color,
                x as i32,
                line_y as i32,
                scale,
                font,
                line,
            );
        }
    }

    fn paste(&mut self, x: i64, y: i64, bitmap: &RgbaImage) {
        imageops::overlay(&mut self.image, bitmap, x, y);
    }
}
