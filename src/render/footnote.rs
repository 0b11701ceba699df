use crate::error::Error;
use crate::geometry::{Area, Point};
use crate::model::{NodeId, Tree};
use crate::surface::{Surface, Typeface};

use super::state::RenderState;
use super::{Pass, Renderer, WalkStatus, footnote_def_anchor, footnote_ref_anchor};

/// Footnote reference numbers are set at this fraction of the current size.
const SUPERSCRIPT_SCALE: f32 = 0.6;

impl<S: Surface> Renderer<S> {
    /// Definitions are collected during the body walk and laid out afterwards.
    pub(super) fn render_footnotes_def(&mut self, id: NodeId, label: &str, pass: Pass) -> Result<WalkStatus, Error> {
        match pass {
            Pass::Body => {
                self.state.collect_footnote(label, id);
                Ok(WalkStatus::Stop)
            }
            Pass::FootnoteBody => Ok(WalkStatus::Continue),
        }
    }

    pub(super) fn render_footnotes_ref(&mut self, label: &str) -> Result<WalkStatus, Error> {
        let Some(ordinal) = self.index.footnote_ordinal(label) else {
            log::warn!("Footnote reference [^{label}] has no definition");
            self.write_text(&format!("[^{label}]"))?;
            return Ok(WalkStatus::Stop);
        };
        let size = (self.state.typeface().size * SUPERSCRIPT_SCALE).round();
        self.ensure_room(self.options.line_height)?;
        let start = self.state.cursor;
        self.surface.set_anchor(&footnote_ref_anchor(label), start);

        self.state.push_typeface(Typeface::regular(size));
        self.state.push_color(self.options.link_color);
        self.write_text(&ordinal.to_string())?;
        self.state.pop_color()?;
        self.state.pop_typeface()?;

        let width = self.state.cursor.x - start.x;
        self.surface.add_internal_link(
            &footnote_def_anchor(label),
            Area::new(start.x, self.state.cursor.y, width, size),
        );
        self.apply_style()?;
        Ok(WalkStatus::Stop)
    }

    /// The footnote section: a fresh page, a separator rule, then every
    /// collected definition numbered in collection order. A definition that
    /// fails to render ends the section; what was already drawn stays.
    pub(crate) fn render_footnotes(&mut self, tree: &Tree) -> Result<(), Error> {
        let defs = self.state.take_footnote_defs();
        if defs.is_empty() {
            return Ok(());
        }
        self.new_page()?;

        let y = self.state.cursor.y;
        self.surface.set_stroke_color(self.options.quote_color);
        self.surface.draw_line(
            Point::new(self.geometry.content_left(), y),
            Point::new(self.geometry.content_right(), y),
        );
        self.surface.set_stroke_color(self.options.text_color);
        self.state.cursor.y += self.options.rule_gap_after;
        self.state.last_emitted = Some('\n');

        let mut rendered = 0usize;
        for (i, (label, id)) in defs.iter().enumerate() {
            if let Err(e) = self.render_footnote_entry(tree, i + 1, label, *id) {
                log::warn!("Footnote [^{label}] failed, ending footnote section: {e}");
                break;
            }
            rendered += 1;
        }
        log::debug!("Rendered {rendered} of {} footnotes", defs.len());

        self.render_footer()
    }

    fn render_footnote_entry(&mut self, tree: &Tree, ordinal: usize, label: &str, id: NodeId) -> Result<(), Error> {
        self.ensure_room(self.options.line_height)?;
        let start = self.state.cursor;
        self.surface.set_anchor(&footnote_def_anchor(label), start);

        self.state.push_color(self.options.link_color);
        self.write_text(&format!("{ordinal}. "))?;
        self.state.pop_color()?;
        self.surface.add_internal_link(
            &footnote_ref_anchor(label),
            Area::new(start.x, start.y, self.state.cursor.x - start.x, self.options.line_height),
        );

        self.render_footnote_body(tree, id)?;
        self.newline();
        Ok(())
    }

    /// Walk one definition with its own `RenderState`; only the cursor carries
    /// over in either direction.
    fn render_footnote_body(&mut self, tree: &Tree, id: NodeId) -> Result<(), Error> {
        let mut body = RenderState::new(
            Typeface::regular(self.options.font_size),
            self.options.text_color,
            self.state.cursor,
        );
        body.last_emitted = self.state.last_emitted;
        let outer = std::mem::replace(&mut self.state, body);
        let result = self.walk(tree, id, Pass::FootnoteBody);
        let body = std::mem::replace(&mut self.state, outer);
        self.state.cursor = body.cursor;
        self.state.last_emitted = body.last_emitted;
        self.apply_style()?;
        result
    }
}
