mod config;
mod error;
mod fonts;
mod geometry;
mod model;
mod pdf;
mod render;
mod resolve;
mod surface;
pub mod xml;

pub use config::{Cover, FontPaths, Options, RenderOptions};
pub use error::Error;
pub use geometry::{Area, PageGeometry, PageSize, Point};
pub use model::{
    Ancestors, CellAlign, Children, ListData, ListMarker, Node, NodeId, NodeKind, Tree, TreeBuilder,
};
pub use pdf::PdfSurface;
pub use render::{Pass, RenderState, Renderer, WalkStatus};
pub use resolve::{HttpImageResolver, ImageResolver, ResolvedImage};
pub use surface::{FontVariant, Rgb, Surface, Typeface};

use std::path::Path;
use std::time::Instant;

/// Render `tree` to PDF bytes: cover page (when configured), body, footnotes.
pub fn render_tree(tree: &Tree, options: &Options) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    let mut surface = PdfSurface::new(options.fonts.clone());
    if let Some(cover) = &options.cover {
        surface = surface.with_title(cover.title.clone());
    }
    let mut renderer = Renderer::new(surface, options.render.clone(), options.cover.clone())?;
    renderer.render_cover()?;
    let t_cover = t0.elapsed();

    renderer.render(tree)?;
    let t_layout = t0.elapsed();

    let bytes = renderer.finish()?;
    let t_total = t0.elapsed();

    log::info!(
        "Render phases: cover={:.1}ms, layout={:.1}ms, assembly={:.1}ms",
        t_cover.as_secs_f64() * 1000.0,
        (t_layout - t_cover).as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}

pub fn convert_xml_to_pdf(input: &Path, output: &Path, options: &Options) -> Result<(), Error> {
    let t0 = Instant::now();

    let tree = xml::parse(input)?;
    let t_parse = t0.elapsed();

    let bytes = render_tree(&tree, options)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

pub fn convert_xml_str_to_pdf(input: &str, output: &Path, options: &Options) -> Result<(), Error> {
    let tree = xml::parse_str(input)?;
    let bytes = render_tree(&tree, options)?;
    std::fs::write(output, &bytes).map_err(Error::Io)?;
    log::info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
