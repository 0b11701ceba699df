use crate::error::Error;
use crate::geometry::{Area, Point};
use crate::surface::{Surface, Typeface};

use super::Renderer;
use super::inline::image_size;

const LOGO_RAISE: f32 = 128.0;
const LOGO_GAP: f32 = 10.0;
const LOGO_TITLE_SIZE: f32 = 20.0;
const LOGO_TITLE_ADVANCE: f32 = 48.0;
const TITLE_SIZE: f32 = 28.0;
const TITLE_LINE_ADVANCE: f32 = 30.0;
const TITLE_GAP: f32 = 45.0;
const META_SIZE: f32 = 12.0;
const META_ROW_ADVANCE: f32 = 22.0;
const META_LAST_ADVANCE: f32 = 20.0;

impl<S: Surface> Renderer<S> {
    /// Lay out the cover page and leave the cursor at the top of a fresh body
    /// page. Does nothing when no cover is configured.
    pub fn render_cover(&mut self) -> Result<(), Error> {
        let Some(cover) = self.cover.clone() else {
            return Ok(());
        };
        self.surface.add_page()?;
        self.pages += 1;

        let page = self.options.page;
        let center = page.width / 2.0;
        let mut y = page.height / 2.0 - self.geometry.margin - LOGO_RAISE;

        if !cover.logo_link.is_empty() {
            let resolved = self.resolver.resolve(&cover.logo_link);
            match image_size(resolved.path()) {
                Ok((w, h)) => {
                    self.surface
                        .draw_image(resolved.path(), Area::new(center - w / 2.0, y, w, h))?;
                    y += h + LOGO_GAP;
                    self.surface.set_font(Typeface::regular(LOGO_TITLE_SIZE))?;
                    self.surface.set_text_color(self.options.text_color);
                    let width = self.surface.measure_text_width(&cover.logo_title)?;
                    let x = center - width / 2.0;
                    self.surface.place_text(&cover.logo_title, Point::new(x, y))?;
                    self.surface.add_external_link(
                        &cover.logo_title_link,
                        Area::new(x, y, width, LOGO_TITLE_SIZE),
                    );
                    y += LOGO_TITLE_ADVANCE;
                }
                Err(e) => log::warn!("Cover logo skipped: {e}"),
            }
        }

        self.surface.set_font(Typeface::regular(TITLE_SIZE))?;
        self.surface.set_text_color(self.options.text_color);
        for line in self.split_lines(&cover.title, self.geometry.content_width())? {
            let width = self.surface.measure_text_width(&line)?;
            self.surface
                .place_text(&line, Point::new(center - width / 2.0, y))?;
            y += TITLE_LINE_ADVANCE;
        }

        y += TITLE_GAP;
        let left = self.geometry.content_left();
        self.surface.set_font(Typeface::regular(META_SIZE))?;
        let rows = [
            (&cover.author_label, &cover.author, &cover.author_link),
            (&cover.link_label, &cover.link, &cover.link),
            (&cover.source_label, &cover.source, &cover.source_link),
            (&cover.license_label, &cover.license, &cover.license_link),
        ];
        let last = rows.len() - 1;
        for (i, (label, value, url)) in rows.into_iter().enumerate() {
            self.surface.set_text_color(self.options.text_color);
            self.surface.place_text(label, Point::new(left, y))?;
            let x = left + self.surface.measure_text_width(label)?;
            self.surface.set_text_color(self.options.link_color);
            let width = self.surface.measure_text_width(value)?;
            self.surface.place_text(value, Point::new(x, y))?;
            self.surface
                .add_external_link(url, Area::new(x, y, width, META_SIZE));
            y += if i == last { META_LAST_ADVANCE } else { META_ROW_ADVANCE };
        }

        self.surface.add_page()?;
        self.pages += 1;
        self.state.cursor = self.geometry.origin();
        self.state.last_emitted = Some('\n');
        self.apply_style()?;
        log::debug!("Cover rendered");
        Ok(())
    }

    /// Break `text` into lines no wider than `width` in the surface's current
    /// font, rune by rune. A line always holds at least one rune.
    fn split_lines(&mut self, text: &str, width: f32) -> Result<Vec<String>, Error> {
        let mut lines = Vec::new();
        let mut line = String::new();
        for ch in text.chars() {
            if ch == '\n' {
                lines.push(std::mem::take(&mut line));
                continue;
            }
            line.push(ch);
            if self.surface.measure_text_width(&line)? > width && line.chars().count() > 1 {
                line.pop();
                lines.push(std::mem::take(&mut line));
                line.push(ch);
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        Ok(lines)
    }
}
