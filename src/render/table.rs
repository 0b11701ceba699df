use crate::error::Error;
use crate::model::{NodeId, Tree};
use crate::surface::{Surface, Typeface};

use super::{Renderer, WalkStatus};

// Tables are laid out in a single pass with equal-width columns. A cell starts
// one column width after where the previous cell in the row started, using the
// width that cell actually rendered; rows never influence each other.

impl<S: Surface> Renderer<S> {
    /// Width allotted to every column of the table enclosing `cell`.
    pub fn column_width(&self, tree: &Tree, cell: NodeId) -> f32 {
        match tree.table_columns(cell) {
            0 => self.geometry.content_width(),
            cols => self.geometry.content_width() / cols as f32,
        }
    }

    pub(super) fn render_table(&mut self, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            self.ensure_room(self.options.table_gap + self.options.cell_padding + self.options.line_height)?;
            self.state.cursor.y += self.options.table_gap;
        } else {
            self.newline();
            self.skip_down(self.options.table_gap);
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_table_head(&mut self, entering: bool) -> Result<WalkStatus, Error> {
        if entering {
            let size = self.state.typeface().size;
            self.state.push_typeface(Typeface::bold(size));
        } else {
            self.state.pop_typeface()?;
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_table_row(&mut self, entering: bool) -> Result<WalkStatus, Error> {
        self.newline();
        if entering {
            // A row of empty cells emits nothing, so `newline` alone cannot be
            // trusted to bring x back.
            self.state.cursor.x = self.geometry.content_left();
            self.state.last_cell_width = 0.0;
            self.ensure_room(self.options.cell_padding + self.options.line_height)?;
        }
        Ok(WalkStatus::Continue)
    }

    pub(super) fn render_table_cell(&mut self, tree: &Tree, id: NodeId, entering: bool) -> Result<WalkStatus, Error> {
        let padding = self.options.cell_padding;
        if entering {
            if tree.previous(id).is_some() {
                let column = self.column_width(tree, id);
                self.state.cursor.x += column - self.state.last_cell_width;
            }
            let x = self.state.cursor.x;
            self.state.push_x_mark(x);
            self.state.cursor.x += padding;
            self.state.cursor.y += padding;
        } else {
            self.state.cursor.x -= padding;
            self.state.cursor.y -= padding;
            let start = self.state.pop_x_mark()?;
            self.state.last_cell_width = self.state.cursor.x - start;
        }
        Ok(WalkStatus::Continue)
    }
}
