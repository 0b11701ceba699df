use std::io::Cursor;
use std::path::Path;

use image::ImageDecoder;
use pdf_writer::{Filter, Pdf, Ref};

use crate::error::Error;

/// Write the image file at `path` as an XObject at `xobj_ref`. JPEG data is
/// passed through as DCT; anything else is decoded and re-encoded as flate RGB
/// with a soft mask when it has transparency.
pub(super) fn embed_image_file(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    path: &Path,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(u32, u32), Error> {
    let data = std::fs::read(path)?;
    let format = image::guess_format(&data)
        .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;

    if format == image::ImageFormat::Jpeg {
        let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(&data))
            .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;
        let (w, h) = decoder.dimensions();
        let gray = decoder.color_type() == image::ColorType::L8;
        let mut xobj = pdf.image_xobject(xobj_ref, &data);
        xobj.filter(Filter::DctDecode);
        xobj.width(w as i32);
        xobj.height(h as i32);
        if gray {
            xobj.color_space().device_gray();
        } else {
            xobj.color_space().device_rgb();
        }
        xobj.bits_per_component(8);
        return Ok((w, h));
    }

    let decoded = image::load_from_memory_with_format(&data, format)
        .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok((w, h))
}
