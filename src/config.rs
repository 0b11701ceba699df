use std::path::PathBuf;

use crate::geometry::{PageGeometry, PageSize};
use crate::surface::Rgb;

/// Layout metrics and palette. Every size scales with `zoom`.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub page: PageSize,
    pub zoom: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub heading_sizes: [f32; 6],
    pub margin: f32,
    pub footer_size: f32,

    pub paragraph_gap: f32,
    pub heading_gap_before: f32,
    pub heading_gap_after: f32,
    pub list_gap: f32,
    pub list_indent: f32,
    pub code_gap: f32,
    pub table_gap: f32,
    pub cell_padding: f32,
    pub rule_gap_before: f32,
    pub rule_gap_after: f32,

    pub text_color: Rgb,
    pub link_color: Rgb,
    pub code_span_color: Rgb,
    pub code_block_color: Rgb,
    pub quote_color: Rgb,
}

impl RenderOptions {
    pub fn with_zoom(zoom: f32) -> Self {
        Self {
            page: PageSize::A4,
            zoom,
            font_size: (14.0 * zoom).floor(),
            line_height: 24.0 * zoom,
            heading_sizes: [24.0, 22.0, 20.0, 18.0, 16.0, 14.0].map(|s| s * zoom),
            margin: 60.0 * zoom,
            footer_size: 8.0,
            paragraph_gap: 6.0,
            heading_gap_before: 10.0,
            heading_gap_after: 6.0,
            list_gap: 4.0,
            list_indent: 16.0,
            code_gap: 6.0,
            table_gap: 6.0,
            cell_padding: 4.0,
            rule_gap_before: 14.0,
            rule_gap_after: 12.0,
            text_color: Rgb::BLACK,
            link_color: Rgb(66, 133, 244),
            code_span_color: Rgb(255, 153, 51),
            code_block_color: Rgb(86, 158, 61),
            quote_color: Rgb(106, 115, 125),
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.page, self.margin)
    }

    /// Point size for a heading level; levels outside 1..=6 use the body size.
    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1..=6 => self.heading_sizes[level as usize - 1].round(),
            _ => self.font_size,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::with_zoom(0.75)
    }
}

/// TrueType files for the three faces. `None` selects the built-in Helvetica face.
#[derive(Clone, Debug, Default)]
pub struct FontPaths {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

/// Cover page metadata. Also feeds the running footer.
#[derive(Clone, Debug)]
pub struct Cover {
    pub title: String,
    pub author_label: String,
    pub author: String,
    pub author_link: String,
    pub link_label: String,
    pub link: String,
    pub source_label: String,
    pub source: String,
    pub source_link: String,
    pub license_label: String,
    pub license: String,
    pub license_link: String,
    pub logo_link: String,
    pub logo_title: String,
    pub logo_title_link: String,
}

impl Default for Cover {
    fn default() -> Self {
        Self {
            title: String::new(),
            author_label: "Author: ".into(),
            author: String::new(),
            author_link: String::new(),
            link_label: "Link: ".into(),
            link: String::new(),
            source_label: "Source: ".into(),
            source: String::new(),
            source_link: String::new(),
            license_label: "License: ".into(),
            license: String::new(),
            license_link: String::new(),
            logo_link: String::new(),
            logo_title: String::new(),
            logo_title_link: String::new(),
        }
    }
}

/// Everything one conversion needs besides the tree itself.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub render: RenderOptions,
    pub fonts: FontPaths,
    pub cover: Option<Cover>,
}
