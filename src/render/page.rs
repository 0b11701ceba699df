use crate::error::Error;
use crate::geometry::{Area, Point};
use crate::surface::{Surface, Typeface};

use super::Renderer;

impl<S: Surface> Renderer<S> {
    /// Close the current page with its footer and continue on a fresh one.
    pub fn page_break(&mut self) -> Result<(), Error> {
        self.render_footer()?;
        self.new_page()?;
        log::debug!("Page break, now on page {}", self.pages);
        Ok(())
    }

    /// Break the page unless `height` more points fit above the content bottom.
    pub(crate) fn ensure_room(&mut self, height: f32) -> Result<(), Error> {
        if self.state.cursor.y + height > self.geometry.content_bottom() {
            self.page_break()?;
        }
        Ok(())
    }

    /// Trailing block spacing. Collapses at the content bottom instead of
    /// pushing the cursor past it.
    pub(crate) fn skip_down(&mut self, gap: f32) {
        let bottom = self.geometry.content_bottom();
        if self.state.cursor.y < bottom {
            self.state.cursor.y = (self.state.cursor.y + gap).min(bottom);
        }
    }

    /// Start a page without a footer on the previous one. The cursor moves to
    /// the top-left of the content box.
    pub(crate) fn new_page(&mut self) -> Result<(), Error> {
        self.surface.add_page()?;
        self.pages += 1;
        self.state.cursor = self.geometry.origin();
        self.apply_style()
    }

    /// `link label + title`, right-aligned in the bottom margin, with the title
    /// linked to the cover's link. Only drawn when cover metadata is configured.
    pub(crate) fn render_footer(&mut self) -> Result<(), Error> {
        let Some(cover) = &self.cover else {
            return Ok(());
        };
        if self.pages == 0 {
            return Ok(());
        }
        let label = cover.link_label.clone();
        let title = cover.title.clone();
        let link = cover.link.clone();
        let size = self.options.footer_size;

        self.surface.set_font(Typeface::regular(size))?;
        self.surface.set_text_color(self.options.text_color);
        let label_width = self.surface.measure_text_width(&label)?;
        let width = self.surface.measure_text_width(&format!("{label}{title}"))?;
        let x = self.geometry.content_right() - width;
        let y = self.geometry.content_bottom() + size;

        self.surface.place_text(&label, Point::new(x, y))?;
        self.surface.set_text_color(self.options.link_color);
        self.surface
            .place_text(&title, Point::new(x + label_width, y))?;
        self.surface
            .add_external_link(&link, Area::new(x + label_width, y, width - label_width, size));

        self.apply_style()
    }
}
