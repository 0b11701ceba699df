mod xobject;

use std::collections::HashMap;
use std::path::Path;

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::config::FontPaths;
use crate::error::Error;
use crate::fonts::FontFace;
use crate::geometry::{Area, PageSize, Point};
use crate::surface::{FontVariant, Rgb, Surface, Typeface};

/// Distance from the top of a line box to the text baseline, as a fraction of
/// the font size.
const BASELINE_RATIO: f32 = 0.8;

const RULE_WIDTH: f32 = 0.8;

enum LinkTarget {
    Uri(String),
    Anchor(String),
}

struct PageLink {
    rect: Rect,
    target: LinkTarget,
}

struct PageRecord {
    page_ref: Ref,
    content_ref: Ref,
    content: Content,
    links: Vec<PageLink>,
}

/// A `Surface` that writes a PDF with `pdf-writer`.
///
/// Images are written as soon as they are drawn so temporary files can go away.
/// Fonts are embedded in `finalize`, once every glyph the document uses is known.
pub struct PdfSurface {
    pdf: Pdf,
    next_id: i32,
    catalog_ref: Ref,
    pages_ref: Ref,
    font_paths: FontPaths,
    title: Option<String>,
    page_size: PageSize,
    faces: Vec<FontFace>,
    used_faces: [bool; 3],
    face: Option<Typeface>,
    text_color: Rgb,
    stroke_color: Rgb,
    pages: Vec<PageRecord>,
    images: Vec<(String, Ref)>,
    anchors: HashMap<String, (usize, Point)>,
}

impl PdfSurface {
    pub fn new(font_paths: FontPaths) -> Self {
        Self {
            pdf: Pdf::new(),
            next_id: 1,
            catalog_ref: Ref::new(1),
            pages_ref: Ref::new(2),
            font_paths,
            title: None,
            page_size: PageSize::A4,
            faces: Vec::new(),
            used_faces: [false; 3],
            face: None,
            text_color: Rgb::BLACK,
            stroke_color: Rgb::BLACK,
            pages: Vec::new(),
            images: Vec::new(),
            anchors: HashMap::new(),
        }
    }

    /// Document title written to the PDF info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    fn current_face(&mut self) -> Result<(Typeface, &mut FontFace), Error> {
        let face = self
            .face
            .ok_or_else(|| Error::Surface("no font selected".into()))?;
        let font = self
            .faces
            .get_mut(face.variant.index())
            .ok_or_else(|| Error::Surface("document not started".into()))?;
        Ok((face, font))
    }

    fn current_page(&mut self) -> Result<&mut PageRecord, Error> {
        self.pages
            .last_mut()
            .ok_or_else(|| Error::Surface("no current page".into()))
    }

    /// Top-down box to a PDF rectangle.
    fn rect(&self, area: Area) -> Rect {
        let h = self.page_size.height;
        Rect::new(area.x, h - area.y - area.height, area.x + area.width, h - area.y)
    }
}

impl Surface for PdfSurface {
    fn start_document(&mut self, page: PageSize) -> Result<(), Error> {
        self.page_size = page;
        self.catalog_ref = self.alloc();
        self.pages_ref = self.alloc();
        let paths = [
            self.font_paths.regular.clone(),
            self.font_paths.bold.clone(),
            self.font_paths.italic.clone(),
        ];
        self.faces = FontVariant::ALL
            .iter()
            .zip(paths)
            .enumerate()
            .map(|(i, (&variant, path))| {
                FontFace::load(path.as_deref(), variant, format!("F{}", i + 1))
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn add_page(&mut self) -> Result<(), Error> {
        let page_ref = self.alloc();
        let content_ref = self.alloc();
        self.pages.push(PageRecord {
            page_ref,
            content_ref,
            content: Content::new(),
            links: Vec::new(),
        });
        log::trace!("Page {} started", self.pages.len());
        Ok(())
    }

    fn set_font(&mut self, face: Typeface) -> Result<(), Error> {
        if self.faces.is_empty() {
            return Err(Error::Surface("document not started".into()));
        }
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
        let (face, font) = self.current_face()?;
        Ok(font.text_width(text, face.size))
    }

    fn place_text(&mut self, text: &str, at: Point) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        let height = self.page_size.height;
        let (r, g, b) = self.text_color.unit();
        let (face, font) = self.current_face()?;
        let bytes = font.encode(text);
        let pdf_name = font.pdf_name.clone();
        self.used_faces[face.variant.index()] = true;

        let content = &mut self.current_page()?.content;
        content.begin_text();
        content.set_font(Name(pdf_name.as_bytes()), face.size);
        content.set_fill_rgb(r, g, b);
        content.next_line(at.x, height - at.y - face.size * BASELINE_RATIO);
        content.show(Str(&bytes));
        content.end_text();
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        let height = self.page_size.height;
        let (r, g, b) = self.stroke_color.unit();
        let Ok(page) = self.current_page() else {
            log::warn!("Line drawn before the first page; ignored");
            return;
        };
        let content = &mut page.content;
        content.save_state();
        content.set_line_width(RULE_WIDTH);
        content.set_stroke_rgb(r, g, b);
        content.move_to(from.x, height - from.y);
        content.line_to(to.x, height - to.y);
        content.stroke();
        content.restore_state();
    }

    fn draw_image(&mut self, path: &Path, area: Area) -> Result<(), Error> {
        if self.pages.is_empty() {
            return Err(Error::Surface("no current page".into()));
        }
        let xobj_ref = self.alloc();
        let mut pdf = std::mem::replace(&mut self.pdf, Pdf::new());
        let mut alloc = || self.alloc();
        let embedded = xobject::embed_image_file(&mut pdf, xobj_ref, path, &mut alloc);
        self.pdf = pdf;
        embedded?;

        let pdf_name = format!("Im{}", self.images.len() + 1);
        self.images.push((pdf_name.clone(), xobj_ref));

        let rect = self.rect(area);
        let content = &mut self.current_page()?.content;
        content.save_state();
        content.transform([area.width, 0.0, 0.0, area.height, rect.x1, rect.y1]);
        content.x_object(Name(pdf_name.as_bytes()));
        content.restore_state();
        Ok(())
    }

    fn add_external_link(&mut self, url: &str, area: Area) {
        let rect = self.rect(area);
        if let Ok(page) = self.current_page() {
            page.links.push(PageLink {
                rect,
                target: LinkTarget::Uri(url.to_string()),
            });
        }
    }

    fn add_internal_link(&mut self, anchor: &str, area: Area) {
        let rect = self.rect(area);
        if let Ok(page) = self.current_page() {
            page.links.push(PageLink {
                rect,
                target: LinkTarget::Anchor(anchor.to_string()),
            });
        }
    }

    fn set_anchor(&mut self, id: &str, at: Point) {
        match self.pages.len() {
            0 => log::warn!("Anchor {id} set before the first page; ignored"),
            n => {
                self.anchors.insert(id.to_string(), (n - 1, at));
            }
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        let mut next_id = self.next_id;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        let mut pdf = std::mem::replace(&mut self.pdf, Pdf::new());
        let height = self.page_size.height;

        let mut font_pairs: Vec<(String, Ref)> = Vec::new();
        for (i, face) in self.faces.iter().enumerate() {
            if !self.used_faces[i] {
                continue;
            }
            let font_ref = alloc();
            face.embed(&mut pdf, font_ref, &mut alloc)?;
            font_pairs.push((face.pdf_name.clone(), font_ref));
        }
        let t_fonts = t0.elapsed();

        let page_refs: Vec<Ref> = self.pages.iter().map(|p| p.page_ref).collect();
        let mut unresolved = 0usize;
        let mut page_annot_refs: Vec<Vec<Ref>> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let mut refs = Vec::with_capacity(page.links.len());
            for link in &page.links {
                let dest = match &link.target {
                    LinkTarget::Uri(_) => None,
                    LinkTarget::Anchor(id) => match self.anchors.get(id) {
                        Some(&(page_idx, at)) => Some((page_refs[page_idx], at)),
                        None => {
                            unresolved += 1;
                            continue;
                        }
                    },
                };
                let annot_ref = alloc();
                let mut annot = pdf.annotation(annot_ref);
                annot
                    .subtype(AnnotationType::Link)
                    .rect(link.rect)
                    .border(0.0, 0.0, 0.0, None);
                match (&link.target, dest) {
                    (LinkTarget::Uri(url), _) => {
                        annot
                            .action()
                            .action_type(ActionType::Uri)
                            .uri(Str(url.as_bytes()));
                    }
                    (LinkTarget::Anchor(_), Some((target, at))) => {
                        annot
                            .action()
                            .action_type(ActionType::GoTo)
                            .destination()
                            .page(target)
                            .xyz(at.x, height - at.y, None);
                    }
                    (LinkTarget::Anchor(_), None) => {}
                }
                refs.push(annot_ref);
            }
            page_annot_refs.push(refs);
        }
        if unresolved > 0 {
            log::warn!("{unresolved} internal link(s) point at missing anchors; dropped");
        }

        for page in std::mem::take(&mut self.pages).into_iter().zip(&page_annot_refs) {
            let (record, annots) = page;
            let raw = record.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(record.content_ref, &compressed)
                .filter(Filter::FlateDecode);

            let mut page = pdf.page(record.page_ref);
            page.media_box(Rect::new(0.0, 0.0, self.page_size.width, height))
                .parent(self.pages_ref)
                .contents(record.content_ref);
            if !annots.is_empty() {
                page.annotations(annots.iter().copied());
            }
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !self.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &self.images {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        pdf.catalog(self.catalog_ref).pages(self.pages_ref);
        pdf.pages(self.pages_ref)
            .kids(page_refs.iter().copied())
            .count(page_refs.len() as i32);

        if let Some(title) = &self.title {
            let info_ref = alloc();
            pdf.document_info(info_ref)
                .title(TextStr(title))
                .producer(TextStr(env!("CARGO_PKG_NAME")));
        }

        log::info!(
            "PDF assembly: {} pages, {} images, fonts={:.1}ms, total={:.1}ms",
            page_refs.len(),
            self.images.len(),
            t_fonts.as_secs_f64() * 1000.0,
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(pdf.finish())
    }
}
