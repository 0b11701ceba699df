use crate::error::Error;
use crate::geometry::Point;
use crate::model::NodeId;
use crate::surface::{Rgb, Typeface};

/// Mutable per-pass layout state: cursor, style stacks and collected footnotes.
///
/// The typeface and color stacks always hold their base entry; popping it is an
/// error rather than a silent reset.
#[derive(Clone, Debug)]
pub struct RenderState {
    pub cursor: Point,
    base_typeface: Typeface,
    typefaces: Vec<Typeface>,
    base_color: Rgb,
    colors: Vec<Rgb>,
    x_marks: Vec<f32>,
    /// Last character handed to the text flow; `Some('\n')` after a line break.
    pub last_emitted: Option<char>,
    footnote_defs: Vec<(String, NodeId)>,
    /// Text emission is suppressed while this is non-zero (image alt text).
    pub disable_depth: u32,
    /// Width the previous table cell used, measured when it closed.
    pub last_cell_width: f32,
}

impl RenderState {
    pub fn new(base_typeface: Typeface, base_color: Rgb, cursor: Point) -> Self {
        Self {
            cursor,
            base_typeface,
            typefaces: Vec::new(),
            base_color,
            colors: Vec::new(),
            x_marks: Vec::new(),
            last_emitted: Some('\n'),
            footnote_defs: Vec::new(),
            disable_depth: 0,
            last_cell_width: 0.0,
        }
    }

    pub fn typeface(&self) -> Typeface {
        self.typefaces.last().copied().unwrap_or(self.base_typeface)
    }

    pub fn push_typeface(&mut self, face: Typeface) {
        self.typefaces.push(face);
    }

    pub fn pop_typeface(&mut self) -> Result<Typeface, Error> {
        self.typefaces
            .pop()
            .ok_or_else(|| Error::structure("typeface stack underflow"))
    }

    /// Entries on the typeface stack, base included.
    pub fn typeface_depth(&self) -> usize {
        self.typefaces.len() + 1
    }

    pub fn color(&self) -> Rgb {
        self.colors.last().copied().unwrap_or(self.base_color)
    }

    pub fn push_color(&mut self, color: Rgb) {
        self.colors.push(color);
    }

    pub fn pop_color(&mut self) -> Result<Rgb, Error> {
        self.colors
            .pop()
            .ok_or_else(|| Error::structure("color stack underflow"))
    }

    pub fn color_depth(&self) -> usize {
        self.colors.len() + 1
    }

    pub fn push_x_mark(&mut self, x: f32) {
        self.x_marks.push(x);
    }

    pub fn pop_x_mark(&mut self) -> Result<f32, Error> {
        self.x_marks
            .pop()
            .ok_or_else(|| Error::structure("span close without a matching open"))
    }

    pub fn x_mark_depth(&self) -> usize {
        self.x_marks.len()
    }

    /// Record a footnote definition. Returns false when `label` was already collected.
    pub fn collect_footnote(&mut self, label: &str, id: NodeId) -> bool {
        if self.footnote_defs.iter().any(|(l, _)| l == label) {
            return false;
        }
        self.footnote_defs.push((label.to_string(), id));
        true
    }

    pub fn footnote_defs(&self) -> &[(String, NodeId)] {
        &self.footnote_defs
    }

    pub(crate) fn take_footnote_defs(&mut self) -> Vec<(String, NodeId)> {
        std::mem::take(&mut self.footnote_defs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RenderState {
        RenderState::new(Typeface::regular(10.0), Rgb::BLACK, Point::new(45.0, 45.0))
    }

    #[test]
    fn base_entries_cannot_be_popped() {
        let mut s = state();
        assert!(matches!(s.pop_typeface(), Err(Error::Structure(_))));
        assert!(matches!(s.pop_color(), Err(Error::Structure(_))));
        assert!(matches!(s.pop_x_mark(), Err(Error::Structure(_))));
        assert_eq!(s.typeface(), Typeface::regular(10.0));
        assert_eq!(s.color(), Rgb::BLACK);
    }

    #[test]
    fn push_pop_restores_previous_top() {
        let mut s = state();
        s.push_typeface(Typeface::bold(18.0));
        s.push_typeface(Typeface::italic(18.0));
        assert_eq!(s.typeface_depth(), 3);
        assert_eq!(s.pop_typeface().unwrap(), Typeface::italic(18.0));
        assert_eq!(s.typeface(), Typeface::bold(18.0));
        s.push_color(Rgb(1, 2, 3));
        assert_eq!(s.color(), Rgb(1, 2, 3));
        s.pop_color().unwrap();
        assert_eq!(s.color_depth(), 1);
    }

    #[test]
    fn footnotes_are_collected_once_per_label() {
        let mut s = state();
        assert!(s.collect_footnote("a", NodeId(3)));
        assert!(s.collect_footnote("b", NodeId(5)));
        assert!(!s.collect_footnote("a", NodeId(9)));
        let labels: Vec<&str> = s.footnote_defs().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
        assert_eq!(s.take_footnote_defs().len(), 2);
        assert!(s.footnote_defs().is_empty());
    }
}
