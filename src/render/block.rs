use crate::error::Error;
use crate::geometry::{Area, Point};
use crate::model::{ListData, ListMarker, NodeId, NodeKind, Tree};
use crate::surface::{Rgb, Surface, Typeface};

use super::{Pass, Renderer, WalkStatus, heading_anchor};

impl<S: Surface> Renderer<S> {
    pub(super) fn render_paragraph(
        &mut self,
        tree: &Tree,
        id: NodeId,
        entering: bool,
        pass: Pass,
    ) -> Result<WalkStatus, Error> {
        let grandparent = tree.parent(id).and_then(|p| tree.parent(p));
        let list = grandparent.and_then(|g| match tree.kind(g) {
            NodeKind::List(data) => Some(*data),
            _ => None,
        });
        if list.is_some_and(|data| data.tight) {
            return Ok(WalkStatus::Continue);
        }

        if entering {
            // The first paragraph of a footnote continues the "N. " label line.
            let opens_footnote = pass == Pass::FootnoteBody
                && tree.previous(id).is_none()
                && tree
                    .parent(id)
                    .is_some_and(|p| matches!(tree.kind(p), NodeKind::FootnotesDef { .. }));
            if list.is_none() && !opens_footnote {
                self.newline();
                self.ensure_room(self.options.paragraph_gap + self.options.line_height)?;
                self.state.cursor.y += self.options.paragraph_gap;
            }
        } else {
            self.newline();
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_heading(&mut self, id: NodeId, level: u8, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            self.newline();
            // The anchor must land on the page the heading text starts on.
            self.ensure_room(self.options.heading_gap_before + self.options.line_height)?;
            self.state.cursor.y += self.options.heading_gap_before;
            let size = self.options.heading_size(level);
            self.state.push_typeface(Typeface::bold(size));
            if let Some(&index) = self.index.heading_ordinals.get(&id) {
                let at = self.state.cursor;
                self.surface.set_anchor(&heading_anchor(level, index), at);
            }
        } else {
            self.state.pop_typeface()?;
            self.newline();
            self.skip_down(self.options.heading_gap_after);
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_blockquote(&mut self, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            self.newline();
            self.state.push_color(self.options.quote_color);
            let x = self.state.cursor.x;
            self.state.push_x_mark(x);
        } else {
            let start = self.state.pop_x_mark()?;
            self.state.cursor.x = self.state.cursor.x - start + self.geometry.content_left();
            self.state.pop_color()?;
            self.newline();
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_list(&mut self, tree: &Tree, id: NodeId, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            self.newline();
            self.ensure_room(self.options.list_gap + self.options.line_height)?;
            self.state.cursor.y += self.options.list_gap;
            let depth = tree.container_depth(id);
            self.state.cursor.x += depth as f32 * self.options.list_indent;
        } else {
            self.newline();
            self.skip_down(self.options.list_gap);
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_list_item(
        &mut self,
        tree: &Tree,
        id: NodeId,
        data: ListData,
        entering: bool,
    ) -> Result<WalkStatus, Error> {
        if !entering {
            self.newline();
            return Ok(WalkStatus::Continue);
        }
        if tree.previous(id).is_some() {
            let depth = tree.container_depth(id).saturating_sub(1);
            self.state.cursor.x += depth as f32 * self.options.list_indent;
        }

        let task = tree
            .first_child(id)
            .and_then(|c| tree.first_child(c))
            .and_then(|m| match tree.kind(m) {
                NodeKind::TaskListItemMarker { checked } => Some(*checked),
                _ => None,
            });
        let marker = match (task, data.marker) {
            (Some(true), _) => "[x] ".to_string(),
            (Some(false), _) => "[ ] ".to_string(),
            (None, ListMarker::Bullet(_)) => "\u{2022} ".to_string(),
            (None, ListMarker::Ordered { number, delimiter }) => format!("{number}{delimiter} "),
        };
        self.write_text(&marker)?;
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_thematic_break(&mut self) -> Result<WalkStatus, Error> {
        self.newline();
        self.ensure_room(self.options.rule_gap_before + self.options.rule_gap_after)?;
        self.state.cursor.y += self.options.rule_gap_before;
        let inset = self.options.font_size;
        let y = self.state.cursor.y;
        self.surface.set_stroke_color(self.options.quote_color);
        self.surface.draw_line(
            Point::new(self.state.cursor.x + inset, y),
            Point::new(self.geometry.content_right() - inset, y),
        );
        self.surface.set_stroke_color(Rgb::BLACK);
        self.state.cursor.y += self.options.rule_gap_after;
        self.newline();
        Ok(WalkStatus::Stop)
    }

    pub(super) fn render_code_block(&mut self, tree: &Tree, id: NodeId, fenced: bool) -> Result<WalkStatus, Error> {
        if fenced {
            return Ok(WalkStatus::Continue);
        }
        self.render_code_block_like(tree.tokens(id))?;
        Ok(WalkStatus::Stop)
    }

    pub(super) fn render_math_block(&mut self, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            self.newline();
        }
        Ok(WalkStatus::Continue)
    }

    /// Code, math and HTML blocks: green text set off by a gap on both sides.
    pub(super) fn render_code_block_like(&mut self, content: &str) -> Result<(), Error> {
        self.newline();
        self.ensure_room(self.options.code_gap + self.options.line_height)?;
        self.state.cursor.y += self.options.code_gap;
        self.state.push_color(self.options.code_block_color);
        self.write_text(content)?;
        self.state.pop_color()?;
        self.newline();
        self.skip_down(self.options.code_gap);
        Ok(())
    }

    /// One linked line per heading, indented by level.
    pub(super) fn render_toc(&mut self, tree: &Tree) -> Result<WalkStatus, Error> {
        if self.index.headings.is_empty() {
            return Ok(WalkStatus::Stop);
        }
        self.newline();
        let headings = self.index.headings.clone();
        let line_height = self.options.line_height;
        for (i, heading) in headings.into_iter().enumerate() {
            let level = match tree.kind(heading) {
                NodeKind::Heading { level } => *level,
                _ => continue,
            };
            let indent = (level.saturating_sub(1)) as f32 * 2.0 * self.options.font_size;
            self.state.cursor.x = self.geometry.content_left() + indent;
            let start = self.state.cursor;
            self.state.push_color(self.options.link_color);
            self.write_text(&tree.text_content(heading))?;
            self.state.pop_color()?;
            let width = if self.state.cursor.y == start.y {
                self.state.cursor.x - start.x
            } else {
                self.geometry.content_right() - start.x
            };
            self.surface.add_internal_link(
                &heading_anchor(level, i),
                Area::new(start.x, start.y, width, line_height),
            );
            self.newline();
        }
        Ok(WalkStatus::Stop)
    }
}
