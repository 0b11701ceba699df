use crate::error::Error;
use crate::geometry::Point;
use crate::surface::Surface;

use super::Renderer;

/// Extra leading added to the font size when a line wraps inside a paragraph.
const WRAP_LEADING: f32 = 2.0;

impl<S: Surface> Renderer<S> {
    /// Flow `content` from the cursor, wrapping at rune granularity.
    ///
    /// A `'\n'` is a structural line break (full line height). A rune that would
    /// overflow the right edge, together with the rune after it, wraps onto the
    /// next line at the tighter `font size + 2` spacing and is placed there. The
    /// page breaks before any rune whose line would cross the content bottom.
    pub fn write_text(&mut self, content: &str) -> Result<(), Error> {
        if self.state.disable_depth > 0 || content.is_empty() {
            return Ok(());
        }
        self.apply_style()?;
        let face_size = self.state.typeface().size;
        let line_height = self.options.line_height;
        let left = self.geometry.content_left();
        let right = self.geometry.content_right();
        let bottom = self.geometry.content_bottom();

        let runes: Vec<char> = content.chars().collect();
        let mut line = String::new();
        let mut line_x = self.state.cursor.x;
        let mut i = 0;
        while i < runes.len() {
            let ch = runes[i];
            if ch == '\n' {
                self.flush_line(&mut line, line_x)?;
                self.state.cursor.y += line_height;
                self.state.cursor.x = left;
                line_x = left;
                i += 1;
                continue;
            }

            if self.state.cursor.y + line_height > bottom {
                self.flush_line(&mut line, line_x)?;
                self.page_break()?;
                line_x = self.state.cursor.x;
            }

            let width = self.rune_width(ch)?;
            let next_width = match runes.get(i + 1) {
                Some(&next) if next != '\n' => self.rune_width(next)?,
                _ => 0.0,
            };
            let x = self.state.cursor.x;
            if x + width + next_width > right && x > left {
                self.flush_line(&mut line, line_x)?;
                self.state.cursor.y += face_size + WRAP_LEADING;
                self.state.cursor.x = left;
                line_x = left;
                continue;
            }

            line.push(ch);
            self.state.cursor.x += width;
            i += 1;
        }
        self.flush_line(&mut line, line_x)?;
        self.state.last_emitted = runes.last().copied();
        Ok(())
    }

    /// Break the line unless the last thing written already was a line break.
    pub fn newline(&mut self) {
        if self.state.last_emitted != Some('\n') {
            self.state.cursor.y += self.options.line_height;
            self.state.cursor.x = self.geometry.content_left();
            self.state.last_emitted = Some('\n');
        }
    }

    fn rune_width(&mut self, ch: char) -> Result<f32, Error> {
        let mut buf = [0u8; 4];
        self.surface.measure_text_width(ch.encode_utf8(&mut buf))
    }

    fn flush_line(&mut self, line: &mut String, x: f32) -> Result<(), Error> {
        if line.is_empty() {
            return Ok(());
        }
        self.surface
            .place_text(line, Point::new(x, self.state.cursor.y))?;
        line.clear();
        Ok(())
    }

    /// Advance width of `text` in the current typeface.
    pub(crate) fn text_width(&mut self, text: &str) -> Result<f32, Error> {
        self.surface.set_font(self.state.typeface())?;
        self.surface.measure_text_width(text)
    }
}
