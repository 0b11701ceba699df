use std::path::Path;

use crate::error::Error;
use crate::geometry::{Area, Point};
use crate::model::{NodeId, NodeKind, Tree};
use crate::surface::{FontVariant, Surface, Typeface};

use super::{Renderer, WalkStatus};

/// Image pixels are laid out at 128 dpi.
const IMAGE_DPI: u32 = 128;

/// Layout size in points of the image file at `path`. The format comes from
/// the file's bytes; downloaded files have no extension.
pub(crate) fn image_size(path: &Path) -> Result<(f32, f32), Error> {
    let failed = |e: &dyn std::fmt::Display| Error::Image(format!("{}: {e}", path.display()));
    let (w, h) = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| failed(&e))?
        .into_dimensions()
        .map_err(|e| failed(&e))?;
    Ok(((w * 72 / IMAGE_DPI) as f32, (h * 72 / IMAGE_DPI) as f32))
}

impl<S: Surface> Renderer<S> {
    /// Code spans, inline math and inline HTML: orange text.
    pub(super) fn render_code_span_like(&mut self, content: &str) -> Result<(), Error> {
        self.state.push_color(self.options.code_span_color);
        self.write_text(content)?;
        self.state.pop_color()?;
        Ok(())
    }

    /// `:shortcode:` becomes its emoji. Unknown shortcodes are written as-is.
    pub(super) fn render_emoji_alias(&mut self, tokens: &str) -> Result<WalkStatus, Error> {
        match emojis::get_by_shortcode(tokens.trim_matches(':')) {
            Some(emoji) => self.write_text(emoji.as_str())?,
            None => {
                log::debug!("Unknown emoji shortcode {tokens}");
                self.write_text(tokens)?;
            }
        }
        Ok(WalkStatus::Stop)
    }

    pub(super) fn render_link_text(&mut self, tree: &Tree, id: NodeId) -> Result<WalkStatus, Error> {
        let in_image = tree
            .parent(id)
            .is_some_and(|p| *tree.kind(p) == NodeKind::Image);
        if !in_image {
            self.write_text(tree.tokens(id))?;
        }
        Ok(WalkStatus::Stop)
    }

    /// Emphasis and strong keep the current size and switch the face.
    pub(super) fn open_variant(&mut self, variant: FontVariant) -> Result<WalkStatus, Error> {
        let size = self.state.typeface().size;
        self.state.push_typeface(Typeface::new(variant, size));
        Ok(WalkStatus::Stop)
    }

    pub(super) fn close_variant(&mut self) -> Result<WalkStatus, Error> {
        self.state.pop_typeface()?;
        Ok(WalkStatus::Stop)
    }

    pub(super) fn open_strikethrough(&mut self) -> Result<WalkStatus, Error> {
        let x = self.state.cursor.x;
        self.state.push_x_mark(x);
        Ok(WalkStatus::Stop)
    }

    pub(super) fn close_strikethrough(&mut self) -> Result<WalkStatus, Error> {
        let start = self.state.pop_x_mark()?;
        let y = self.state.cursor.y + self.state.typeface().size / 2.0;
        self.surface.set_stroke_color(self.state.color());
        self.surface
            .draw_line(Point::new(start, y), Point::new(self.state.cursor.x, y));
        self.surface.set_stroke_color(self.options.text_color);
        Ok(WalkStatus::Stop)
    }

    pub(super) fn render_link(&mut self, tree: &Tree, id: NodeId, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            let x = self.state.cursor.x;
            self.state.push_x_mark(x);
            self.state.push_color(self.options.link_color);
            return Ok(WalkStatus::Continue);
        }
        let start = self.state.pop_x_mark()?;
        let dest = tree
            .child_by_kind(id, |k| *k == NodeKind::LinkDest)
            .ok_or_else(|| Error::structure("link without a destination"))?;
        let width = self.state.cursor.x - start;
        let area = Area::new(start, self.state.cursor.y, width, self.options.line_height);
        self.surface.add_external_link(tree.tokens(dest), area);
        self.state.pop_color()?;
        Ok(WalkStatus::Continue)
    }

    /// Draws the image on entering and suppresses its alt text until leaving.
    /// An image that cannot be fetched or measured is skipped.
    pub(super) fn render_image(&mut self, tree: &Tree, id: NodeId, entering: bool) -> Result<WalkStatus, Error> {
        if !entering {
            self.state.disable_depth = self.state.disable_depth.saturating_sub(1);
            return Ok(WalkStatus::Continue);
        }
        if self.state.disable_depth == 0 {
            let dest = tree
                .child_by_kind(id, |k| *k == NodeKind::LinkDest)
                .ok_or_else(|| Error::structure("image without a destination"))?;
            self.place_image(tree.tokens(dest))?;
        }
        self.state.disable_depth += 1;
        Ok(WalkStatus::Continue)
    }

    fn place_image(&mut self, reference: &str) -> Result<(), Error> {
        // Dropping `resolved` removes a downloaded file on every path out.
        let resolved = self.resolver.resolve(reference);
        let (mut width, mut height) = match image_size(resolved.path()) {
            Ok(size) => size,
            Err(e) => {
                log::warn!("Skipping image {reference}: {e}");
                return Ok(());
            }
        };
        let max_width = self.geometry.content_width();
        if width > max_width {
            height *= max_width / width;
            width = max_width;
        }
        if self.state.cursor.y.ceil() + height > self.geometry.content_bottom().floor() {
            self.page_break()?;
        }
        let at = self.state.cursor;
        self.surface
            .draw_image(resolved.path(), Area::new(at.x, at.y, width, height))?;
        self.state.cursor.y += height;
        self.state.last_emitted = None;
        log::debug!("Placed image {reference} ({width:.0}x{height:.0}pt)");
        Ok(())
    }
}
