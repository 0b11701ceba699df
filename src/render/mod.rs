//! The tree-walking layout engine.
//!
//! `Renderer` walks a [`Tree`] in document order and turns every node into
//! cursor movement and drawing calls on a [`Surface`]. Block handlers live in
//! `block.rs`, inline ones in `inline.rs`; tables, the cover page and the
//! footnote section each have their own file.

mod block;
mod cover;
mod footnote;
mod inline;
mod page;
mod state;
mod table;
mod text;

use std::collections::HashMap;

use crate::config::{Cover, RenderOptions};
use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::model::{NodeId, NodeKind, Tree};
use crate::resolve::{HttpImageResolver, ImageResolver};
use crate::surface::{Surface, Typeface};

pub use state::RenderState;

/// What the walker does after a handler ran on the entering phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Visit the children, then call the handler again on leaving.
    Continue,
    /// Skip the children but still call the handler on leaving.
    SkipChildren,
    /// Skip the children and the leaving call.
    Stop,
}

/// Which traversal a handler is running in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// The main walk over the document body.
    Body,
    /// A footnote definition's subtree, walked in the deferred footnote section.
    FootnoteBody,
}

/// Lookups computed once per document before the walk starts.
#[derive(Debug, Default)]
struct DocumentIndex {
    headings: Vec<NodeId>,
    heading_ordinals: HashMap<NodeId, usize>,
    footnote_labels: Vec<String>,
}

impl DocumentIndex {
    fn build(tree: &Tree) -> Self {
        let headings = tree.headings();
        let heading_ordinals = headings.iter().enumerate().map(|(i, &h)| (h, i)).collect();
        Self {
            headings,
            heading_ordinals,
            footnote_labels: tree.footnote_labels(),
        }
    }

    /// 1-based footnote number for `label`.
    fn footnote_ordinal(&self, label: &str) -> Option<usize> {
        self.footnote_labels.iter().position(|l| l == label).map(|i| i + 1)
    }
}

pub(crate) fn heading_anchor(level: u8, index: usize) -> String {
    format!("toc_h{level}_{index}")
}

pub(crate) fn footnote_def_anchor(label: &str) -> String {
    format!("footnote-def-{label}")
}

pub(crate) fn footnote_ref_anchor(label: &str) -> String {
    format!("footnote-ref-{label}")
}

pub struct Renderer<S: Surface> {
    surface: S,
    options: RenderOptions,
    geometry: PageGeometry,
    cover: Option<Cover>,
    resolver: Box<dyn ImageResolver>,
    state: RenderState,
    index: DocumentIndex,
    pages: usize,
}

impl<S: Surface> Renderer<S> {
    /// Start a document on `surface`. Fails when the surface cannot load its fonts.
    pub fn new(mut surface: S, options: RenderOptions, cover: Option<Cover>) -> Result<Self, Error> {
        surface.start_document(options.page)?;
        let geometry = options.geometry();
        let state = RenderState::new(
            Typeface::regular(options.font_size),
            options.text_color,
            geometry.origin(),
        );
        Ok(Self {
            surface,
            options,
            geometry,
            cover,
            resolver: Box::new(HttpImageResolver::new()),
            state,
            index: DocumentIndex::default(),
            pages: 0,
        })
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ImageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Pages created so far, cover included.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Lay out the document body, then the footer and the footnote section.
    pub fn render(&mut self, tree: &Tree) -> Result<(), Error> {
        let t0 = std::time::Instant::now();
        self.index = DocumentIndex::build(tree);
        if self.pages == 0 {
            self.new_page()?;
        }
        self.walk(tree, tree.root(), Pass::Body)?;
        log::info!(
            "Laid out {} nodes on {} pages in {:.1}ms",
            tree.len(),
            self.pages,
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        self.surface.finalize()
    }

    /// Visit `id` entering, its children, then `id` leaving, as the handler's
    /// status allows.
    pub(crate) fn walk(&mut self, tree: &Tree, id: NodeId, pass: Pass) -> Result<(), Error> {
        match self.visit(tree, id, true, pass)? {
            WalkStatus::Stop => return Ok(()),
            WalkStatus::SkipChildren => {}
            WalkStatus::Continue => {
                for child in tree.children(id) {
                    self.walk(tree, child, pass)?;
                }
            }
        }
        self.visit(tree, id, false, pass)?;
        Ok(())
    }

    fn visit(&mut self, tree: &Tree, id: NodeId, entering: bool, pass: Pass) -> Result<WalkStatus, Error> {
        use NodeKind::*;
        match tree.kind(id) {
            Document => self.render_document(tree, entering, pass),
            Paragraph => self.render_paragraph(tree, id, entering, pass),
            Heading { level } => self.render_heading(id, *level, entering),
            Blockquote => self.render_blockquote(entering),
            List(_) => self.render_list(tree, id, entering),
            ListItem(data) => self.render_list_item(tree, id, *data, entering),
            ThematicBreak => self.render_thematic_break(),
            CodeBlock { fenced } => self.render_code_block(tree, id, *fenced),
            CodeBlockCode | MathBlockContent | HtmlBlock => {
                self.render_code_block_like(tree.tokens(id))?;
                Ok(WalkStatus::Stop)
            }
            MathBlock => self.render_math_block(entering),
            Table { .. } => self.render_table(entering),
            TableHead => self.render_table_head(entering),
            TableRow => self.render_table_row(entering),
            TableCell { .. } => self.render_table_cell(tree, id, entering),
            FootnotesDef { label } => self.render_footnotes_def(id, label, pass),
            Toc => self.render_toc(tree),
            FrontMatter => Ok(WalkStatus::Stop),

            Text | BackslashContent | HtmlEntity | EmojiUnicode => {
                self.write_text(tree.tokens(id))?;
                Ok(WalkStatus::Stop)
            }
            EmojiAlias => self.render_emoji_alias(tree.tokens(id)),
            LinkText => self.render_link_text(tree, id),
            CodeSpanContent | InlineMathContent | InlineHtml => {
                self.render_code_span_like(tree.tokens(id))?;
                Ok(WalkStatus::Stop)
            }
            HardBreak | SoftBreak => {
                self.newline();
                Ok(WalkStatus::Stop)
            }
            EmOpenMarker => self.open_variant(crate::surface::FontVariant::Italic),
            StrongOpenMarker => self.open_variant(crate::surface::FontVariant::Bold),
            EmCloseMarker | StrongCloseMarker => self.close_variant(),
            StrikethroughOpenMarker => self.open_strikethrough(),
            StrikethroughCloseMarker => self.close_strikethrough(),
            Link => self.render_link(tree, id, entering),
            Image => self.render_image(tree, id, entering),
            FootnotesRef { label } => self.render_footnotes_ref(label),

            Emphasis | Strong | Strikethrough | CodeSpan | InlineMath | Emoji | Backslash => {
                Ok(WalkStatus::Continue)
            }
            HeadingC8hMarker
            | BlockquoteMarker
            | TaskListItemMarker { .. }
            | CodeSpanOpenMarker
            | CodeSpanCloseMarker
            | CodeBlockFenceOpenMarker
            | CodeBlockFenceInfoMarker
            | CodeBlockFenceCloseMarker
            | MathBlockOpenMarker
            | MathBlockCloseMarker
            | InlineMathOpenMarker
            | InlineMathCloseMarker
            | Bang
            | OpenBracket
            | CloseBracket
            | OpenParen
            | CloseParen
            | LinkDest
            | LinkSpace
            | LinkTitle
            | EmojiImg => Ok(WalkStatus::Stop),
        }
    }

    /// Push the current typeface and color to the surface.
    pub(crate) fn apply_style(&mut self) -> Result<(), Error> {
        self.surface.set_font(self.state.typeface())?;
        self.surface.set_text_color(self.state.color());
        Ok(())
    }

    fn render_document(&mut self, tree: &Tree, entering: bool, pass: Pass) -> Result<WalkStatus, Error> {
        if entering || pass != Pass::Body {
            return Ok(WalkStatus::Continue);
        }
        self.render_footer()?;
        if !self.state.footnote_defs().is_empty() {
            self.render_footnotes(tree)?;
        }
        Ok(WalkStatus::Continue)
    }
}
