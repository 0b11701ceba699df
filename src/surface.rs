use std::path::Path;

use crate::error::Error;
use crate::geometry::{Area, PageSize, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
}

impl FontVariant {
    pub const ALL: [FontVariant; 3] = [FontVariant::Regular, FontVariant::Bold, FontVariant::Italic];

    pub(crate) fn index(self) -> usize {
        match self {
            FontVariant::Regular => 0,
            FontVariant::Bold => 1,
            FontVariant::Italic => 2,
        }
    }
}

/// Face variant plus point size: one entry of the typeface stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Typeface {
    pub variant: FontVariant,
    pub size: f32,
}

impl Typeface {
    pub fn new(variant: FontVariant, size: f32) -> Self {
        Self { variant, size }
    }

    pub fn regular(size: f32) -> Self {
        Self::new(FontVariant::Regular, size)
    }

    pub fn bold(size: f32) -> Self {
        Self::new(FontVariant::Bold, size)
    }

    pub fn italic(size: f32) -> Self {
        Self::new(FontVariant::Italic, size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub(crate) fn unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// The low-level output sink the renderer draws into.
///
/// Coordinates are page points with the origin at the top-left corner. Text is
/// placed with its line box top at `at.y`. The surface owns font embedding, glyph
/// measurement, link annotations and serialization; the renderer owns the cursor.
pub trait Surface {
    fn start_document(&mut self, page: PageSize) -> Result<(), Error>;

    fn add_page(&mut self) -> Result<(), Error>;

    fn set_font(&mut self, face: Typeface) -> Result<(), Error>;

    fn set_text_color(&mut self, color: Rgb);

    fn set_stroke_color(&mut self, color: Rgb);

    /// Advance width of `text` in the current font, in points.
    fn measure_text_width(&mut self, text: &str) -> Result<f32, Error>;

    fn place_text(&mut self, text: &str, at: Point) -> Result<(), Error>;

    fn draw_line(&mut self, from: Point, to: Point);

    /// Draw the image file at `path` into `area`. The file may be deleted as soon
    /// as this returns.
    fn draw_image(&mut self, path: &Path, area: Area) -> Result<(), Error>;

    fn add_external_link(&mut self, url: &str, area: Area);

    fn add_internal_link(&mut self, anchor: &str, area: Area);

    /// Register `id` as a link target at `at` on the current page.
    fn set_anchor(&mut self, id: &str, at: Point);

    fn finalize(&mut self) -> Result<Vec<u8>, Error>;
}
