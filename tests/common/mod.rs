#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mdtree_pdf::{
    Area, Cover, Error, ImageResolver, PageSize, Point, RenderOptions, Renderer, ResolvedImage,
    Rgb, Surface, Tree, Typeface,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    StartDocument(PageSize),
    AddPage,
    Text {
        text: String,
        at: Point,
        face: Typeface,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
    },
    Image {
        path: PathBuf,
        area: Area,
    },
    ExternalLink {
        url: String,
        area: Area,
    },
    InternalLink {
        anchor: String,
        area: Area,
    },
    Anchor {
        id: String,
        at: Point,
    },
}

/// A surface that records every call. Every glyph measures `glyph_width`
/// regardless of face or size.
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    pub glyph_width: f32,
    /// `place_text` fails for text containing this string.
    pub fail_on: Option<String>,
    face: Option<Typeface>,
    text_color: Rgb,
    stroke_color: Rgb,
}

impl RecordingSurface {
    pub fn new(glyph_width: f32) -> Self {
        Self {
            ops: Vec::new(),
            glyph_width,
            fail_on: None,
            face: None,
            text_color: Rgb::BLACK,
            stroke_color: Rgb::BLACK,
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn pages(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::AddPage).count()
    }

    /// Placed text runs in order, with their positions.
    pub fn texts(&self) -> Vec<(String, Point)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, at, .. } => Some((text.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of every placed text run.
    pub fn joined_text(&self) -> String {
        self.texts().into_iter().map(|(t, _)| t).collect()
    }

    pub fn text_op(&self, needle: &str) -> Option<&Op> {
        self.ops
            .iter()
            .find(|op| matches!(op, Op::Text { text, .. } if text == needle))
    }

    pub fn position_of(&self, needle: &str) -> Option<usize> {
        self.ops
            .iter()
            .position(|op| matches!(op, Op::Text { text, .. } if text == needle))
    }

    pub fn external_links(&self) -> Vec<(String, Area)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::ExternalLink { url, area } => Some((url.clone(), *area)),
                _ => None,
            })
            .collect()
    }

    pub fn internal_links(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::InternalLink { anchor, .. } => Some(anchor.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn anchors(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Anchor { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn start_document(&mut self, page: PageSize) -> Result<(), Error> {
        self.ops.push(Op::StartDocument(page));
        Ok(())
    }

    fn add_page(&mut self) -> Result<(), Error> {
        self.ops.push(Op::AddPage);
        Ok(())
    }

    fn set_font(&mut self, face: Typeface) -> Result<(), Error> {
        self.face = Some(face);
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke_color = color;
    }

    fn measure_text_width(&mut self, text: &str) -> Result<f32, Error> {
        Ok(text.chars().count() as f32 * self.glyph_width)
    }

    fn place_text(&mut self, text: &str, at: Point) -> Result<(), Error> {
        if let Some(needle) = &self.fail_on
            && text.contains(needle.as_str())
        {
            return Err(Error::Surface(format!("refusing to place {text:?}")));
        }
        let face = self
            .face
            .ok_or_else(|| Error::Surface("no font selected".into()))?;
        self.ops.push(Op::Text {
            text: text.to_string(),
            at,
            face,
            color: self.text_color,
        });
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.ops.push(Op::Line {
            from,
            to,
            color: self.stroke_color,
        });
    }

    fn draw_image(&mut self, path: &Path, area: Area) -> Result<(), Error> {
        self.ops.push(Op::Image {
            path: path.to_path_buf(),
            area,
        });
        Ok(())
    }

    fn add_external_link(&mut self, url: &str, area: Area) {
        self.ops.push(Op::ExternalLink {
            url: url.to_string(),
            area,
        });
    }

    fn add_internal_link(&mut self, anchor: &str, area: Area) {
        self.ops.push(Op::InternalLink {
            anchor: anchor.to_string(),
            area,
        });
    }

    fn set_anchor(&mut self, id: &str, at: Point) {
        self.ops.push(Op::Anchor {
            id: id.to_string(),
            at,
        });
    }

    fn finalize(&mut self) -> Result<Vec<u8>, Error> {
        Ok(b"recorded".to_vec())
    }
}

/// Resolves references through a fixed table and records every request.
/// References registered with `with_temporary` come back as temp files, the
/// way downloads do; their paths are shared through `handed_out`.
#[derive(Default)]
pub struct StubResolver {
    pub files: HashMap<String, PathBuf>,
    pub temporaries: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
    pub handed_out: Rc<RefCell<Vec<PathBuf>>>,
}

impl StubResolver {
    pub fn with(mut self, reference: &str, path: &Path) -> Self {
        self.files.insert(reference.to_string(), path.to_path_buf());
        self
    }

    pub fn with_temporary(mut self, reference: &str, contents: Vec<u8>) -> Self {
        self.temporaries.insert(reference.to_string(), contents);
        self
    }
}

impl ImageResolver for StubResolver {
    fn resolve(&self, reference: &str) -> ResolvedImage {
        self.requests.borrow_mut().push(reference.to_string());
        if let Some(contents) = self.temporaries.get(reference) {
            let mut file = tempfile::NamedTempFile::new().expect("create temp image");
            file.write_all(contents).expect("write temp image");
            let temp = file.into_temp_path();
            self.handed_out.borrow_mut().push(temp.to_path_buf());
            return ResolvedImage::temporary(temp);
        }
        match self.files.get(reference) {
            Some(path) => ResolvedImage::verbatim(&path.to_string_lossy()),
            None => ResolvedImage::verbatim(reference),
        }
    }
}

/// Write a solid PNG of the given pixel size into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
        .save(&path)
        .expect("write png fixture");
    path
}

pub fn parse(xml: &str) -> Tree {
    mdtree_pdf::xml::parse_str(xml).expect("valid document XML")
}

/// Wrap block elements in a CommonMark XML document.
pub fn doc(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE document SYSTEM "CommonMark.dtd">
<document xmlns="http://commonmark.org/xml/1.0">{body}</document>"#
    )
}

pub fn renderer(options: RenderOptions, cover: Option<Cover>) -> Renderer<RecordingSurface> {
    renderer_with(RecordingSurface::new(5.0), options, cover, StubResolver::default())
}

pub fn renderer_with(
    surface: RecordingSurface,
    options: RenderOptions,
    cover: Option<Cover>,
    resolver: StubResolver,
) -> Renderer<RecordingSurface> {
    Renderer::new(surface, options, cover)
        .expect("recording surface starts")
        .with_resolver(Box::new(resolver))
}

pub fn render(xml_body: &str) -> Renderer<RecordingSurface> {
    let tree = parse(&doc(xml_body));
    let mut r = renderer(RenderOptions::default(), None);
    r.render(&tree).expect("render succeeds");
    r
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
