use std::collections::HashMap;
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;
use crate::surface::FontVariant;

/// One of the three faces a document uses: a memory-mapped TrueType file or a
/// built-in base-14 face. Tracks every glyph drawn so the file can be subset
/// when the document is written.
pub(crate) struct FontFace {
    pub(crate) pdf_name: String,
    source: FontSource,
    widths_1000: HashMap<char, f32>,
}

enum FontSource {
    Builtin {
        base_font: &'static str,
        widths: Vec<f32>,
    },
    TrueType(TrueTypeFont),
}

struct TrueTypeFont {
    family: String,
    data: Mmap,
    units: f32,
    remapper: subsetter::GlyphRemapper,
    char_to_gid: HashMap<char, u16>,
    gid_widths: HashMap<u16, f32>,
}

fn builtin_name(variant: FontVariant) -> &'static str {
    match variant {
        FontVariant::Regular => "Helvetica",
        FontVariant::Bold => "Helvetica-Bold",
        FontVariant::Italic => "Helvetica-Oblique",
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

impl FontFace {
    pub(crate) fn builtin(variant: FontVariant, pdf_name: String) -> Self {
        Self {
            pdf_name,
            source: FontSource::Builtin {
                base_font: builtin_name(variant),
                widths: helvetica_widths(),
            },
            widths_1000: HashMap::new(),
        }
    }

    /// Map a TrueType file. Only face 0 of a collection is used.
    pub(crate) fn open(path: &Path, pdf_name: String) -> Result<Self, Error> {
        let t0 = std::time::Instant::now();
        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the face.
        let data = unsafe { Mmap::map(&file) }?;
        let (family, units) = {
            let face = Face::parse(&data, 0)
                .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            let family = font_family_name(&face).unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| pdf_name.clone())
            });
            (family, face.units_per_em() as f32)
        };
        log::debug!(
            "Loaded font {family} from {} in {:.1}ms",
            path.display(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Self {
            pdf_name,
            source: FontSource::TrueType(TrueTypeFont {
                family,
                data,
                units,
                remapper: subsetter::GlyphRemapper::new(),
                char_to_gid: HashMap::new(),
                gid_widths: HashMap::new(),
            }),
            widths_1000: HashMap::new(),
        })
    }

    pub(crate) fn load(
        path: Option<&Path>,
        variant: FontVariant,
        pdf_name: String,
    ) -> Result<Self, Error> {
        match path {
            Some(p) => Self::open(p, pdf_name),
            None => Ok(Self::builtin(variant, pdf_name)),
        }
    }

    /// Advance width of `ch` in 1000-units. Unmappable chars measure 0.
    pub(crate) fn char_width_1000(&mut self, ch: char) -> f32 {
        if let Some(&w) = self.widths_1000.get(&ch) {
            return w;
        }
        let w = match &self.source {
            FontSource::Builtin { widths, .. } => {
                let byte = char_to_winansi(ch);
                if byte >= 32 {
                    widths[(byte - 32) as usize]
                } else {
                    0.0
                }
            }
            FontSource::TrueType(tt) => Face::parse(&tt.data, 0)
                .ok()
                .and_then(|face| {
                    let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
                    face.glyph_hor_advance(gid)
                })
                .map(|adv| adv as f32 / tt.units * 1000.0)
                .unwrap_or(0.0),
        };
        self.widths_1000.insert(ch, w);
        w
    }

    pub(crate) fn text_width(&mut self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * size / 1000.0)
            .sum()
    }

    /// Bytes for a `Tj` operand. TrueType glyphs are registered with the subset
    /// remapper here, so the ids written now stay valid after subsetting.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.source {
            FontSource::Builtin { .. } => to_winansi_bytes(text),
            FontSource::TrueType(tt) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                let face = Face::parse(&tt.data, 0).ok();
                for ch in text.chars() {
                    let gid = match tt.char_to_gid.get(&ch) {
                        Some(&g) => g,
                        None => {
                            let old = face
                                .as_ref()
                                .and_then(|f| f.glyph_index(ch))
                                .unwrap_or(GlyphId(0));
                            let new_gid = tt.remapper.remap(old.0);
                            let adv = face
                                .as_ref()
                                .and_then(|f| f.glyph_hor_advance(old))
                                .map(|a| a as f32 / tt.units * 1000.0)
                                .unwrap_or(0.0);
                            tt.char_to_gid.insert(ch, new_gid);
                            tt.gid_widths.insert(new_gid, adv);
                            new_gid
                        }
                    };
                    out.push((gid >> 8) as u8);
                    out.push((gid & 0xFF) as u8);
                }
                out
            }
        }
    }

    /// Write the font dictionaries at `font_ref`.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<(), Error> {
        match &self.source {
            FontSource::Builtin { base_font, .. } => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(())
            }
            FontSource::TrueType(tt) => embed_truetype(pdf, font_ref, tt, alloc),
        }
    }
}

/// Embed a TrueType font as a CIDFont (Type0 composite) with Identity-H encoding,
/// subset to the glyphs drawn.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    tt: &TrueTypeFont,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let t0 = std::time::Instant::now();
    let face = Face::parse(&tt.data, 0).map_err(|e| Error::Font(format!("{}: {e}", tt.family)))?;
    let units = tt.units;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let subset_data = subsetter::subset(&tt.data, 0, &tt.remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {}: {e}, embedding full font", tt.family);
        tt.data.to_vec()
    });
    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Font(format!("{} is too large to embed", tt.family)))?;

    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = tt.family.replace(' ', "");
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = tt.gid_widths.iter().map(|(&g, &w)| (g, w)).collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &gid) in &tt.char_to_gid {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    log::debug!(
        "Embedded {} ({} glyphs) in {:.1}ms",
        tt.family,
        tt.char_to_gid.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// WinAnsi (Windows-1252) bytes for a built-in face. Unmappable chars are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| match char_to_winansi(c) {
            0 => None,
            b => Some(b),
        })
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J
            77 => 833.0,                          // M
            65..=90 => 667.0,                     // uppercase average
            91..=96 => 333.0,                     // brackets
            102 | 105 | 106 | 108 | 116 => 278.0, // f i j l t
            109 | 119 => 833.0,                   // m w
            97..=122 => 556.0,                    // lowercase average
            0x95 => 350.0,                        // bullet
            _ => 556.0,
        })
        .collect()
}
