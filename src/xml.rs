//! Loads a document tree serialized as CommonMark XML (`cmark-gfm -t xml`).
//!
//! The XML vocabulary models spans as plain containers; the loader adds the
//! open/close marker children and link/image bracket children the renderer
//! dispatches on.

use std::path::Path;

use roxmltree::ParsingOptions;

use crate::error::Error;
use crate::model::{CellAlign, ListData, ListMarker, NodeKind, Tree, TreeBuilder};

pub fn parse(path: &Path) -> Result<Tree, Error> {
    let xml = std::fs::read_to_string(path)?;
    parse_str(&xml)
}

pub fn parse_str(xml: &str) -> Result<Tree, Error> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, opts)?;
    let root = doc.root_element();
    if root.tag_name().name() != "document" {
        return Err(Error::Structure(format!(
            "expected <document> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut loader = Loader {
        builder: TreeBuilder::new(),
        pending_task: None,
    };
    for child in root.children().filter(|n| n.is_element()) {
        loader.element(child)?;
    }
    let tree = loader.builder.finish()?;
    log::debug!("Loaded document tree: {} nodes", tree.len());
    Ok(tree)
}

struct Loader {
    builder: TreeBuilder,
    /// Checkbox state of a task item whose marker has not been placed yet.
    pending_task: Option<bool>,
}

/// Tabs have no glyph; expand them before layout.
fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

fn element_text(node: roxmltree::Node) -> String {
    let raw: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    detab(&raw)
}

fn bool_attr(node: roxmltree::Node, name: &str) -> Option<bool> {
    node.attribute(name).map(|v| v == "true" || v == "1")
}

fn parse_align(val: Option<&str>) -> CellAlign {
    match val {
        Some("left") => CellAlign::Left,
        Some("center") => CellAlign::Center,
        Some("right") => CellAlign::Right,
        _ => CellAlign::None,
    }
}

fn footnote_label(node: roxmltree::Node) -> String {
    node.attribute("label")
        .or_else(|| node.attribute("name"))
        .unwrap_or_default()
        .to_string()
}

impl Loader {
    fn children(&mut self, node: roxmltree::Node) -> Result<(), Error> {
        for child in node.children().filter(|n| n.is_element()) {
            self.element(child)?;
        }
        Ok(())
    }

    fn container(&mut self, kind: NodeKind, node: roxmltree::Node) -> Result<(), Error> {
        self.builder.open(kind);
        self.children(node)?;
        self.builder.close()?;
        Ok(())
    }

    /// `Open marker, children, close marker` wrapped in a span node.
    fn span(
        &mut self,
        kind: NodeKind,
        open: NodeKind,
        close: NodeKind,
        marker: &str,
        node: roxmltree::Node,
    ) -> Result<(), Error> {
        self.builder.open(kind);
        self.builder.leaf(open, marker);
        self.children(node)?;
        self.builder.leaf(close, marker);
        self.builder.close()?;
        Ok(())
    }

    /// `Open marker, content leaf, close marker` wrapped in a node.
    fn delimited(
        &mut self,
        kind: NodeKind,
        open: NodeKind,
        content: NodeKind,
        close: NodeKind,
        marker: &str,
        text: &str,
    ) -> Result<(), Error> {
        self.builder.open(kind);
        self.builder.leaf(open, marker);
        self.builder.leaf(content, text);
        self.builder.leaf(close, marker);
        self.builder.close()?;
        Ok(())
    }

    fn link_tail(&mut self, node: roxmltree::Node) {
        self.builder.leaf(NodeKind::CloseBracket, "]");
        self.builder.leaf(NodeKind::OpenParen, "(");
        self.builder
            .leaf(NodeKind::LinkDest, node.attribute("destination").unwrap_or_default());
        if let Some(title) = node.attribute("title").filter(|t| !t.is_empty()) {
            self.builder.leaf(NodeKind::LinkSpace, " ");
            self.builder.leaf(NodeKind::LinkTitle, title);
        }
        self.builder.leaf(NodeKind::CloseParen, ")");
    }

    fn element(&mut self, node: roxmltree::Node) -> Result<(), Error> {
        let name = node.tag_name().name();
        match name {
            "paragraph" => {
                self.builder.open(NodeKind::Paragraph);
                if let Some(checked) = self.pending_task.take() {
                    self.builder.leaf(NodeKind::TaskListItemMarker { checked }, "");
                }
                self.children(node)?;
                self.builder.close()?;
            }
            "heading" => {
                let level = node
                    .attribute("level")
                    .and_then(|v| v.parse::<u8>().ok())
                    .unwrap_or(1)
                    .clamp(1, 6);
                self.builder.open(NodeKind::Heading { level });
                self.builder
                    .leaf(NodeKind::HeadingC8hMarker, &"#".repeat(level as usize));
                self.children(node)?;
                self.builder.close()?;
            }
            "text" => {
                self.builder.text(&element_text(node));
            }
            "softbreak" => {
                self.builder.leaf(NodeKind::SoftBreak, "\n");
            }
            "linebreak" => {
                self.builder.leaf(NodeKind::HardBreak, "\n");
            }
            "thematic_break" => {
                self.builder.leaf(NodeKind::ThematicBreak, "---");
            }
            "emph" => self.span(
                NodeKind::Emphasis,
                NodeKind::EmOpenMarker,
                NodeKind::EmCloseMarker,
                "*",
                node,
            )?,
            "strong" => self.span(
                NodeKind::Strong,
                NodeKind::StrongOpenMarker,
                NodeKind::StrongCloseMarker,
                "**",
                node,
            )?,
            "strikethrough" => self.span(
                NodeKind::Strikethrough,
                NodeKind::StrikethroughOpenMarker,
                NodeKind::StrikethroughCloseMarker,
                "~~",
                node,
            )?,
            "code" => self.delimited(
                NodeKind::CodeSpan,
                NodeKind::CodeSpanOpenMarker,
                NodeKind::CodeSpanContent,
                NodeKind::CodeSpanCloseMarker,
                "`",
                &element_text(node),
            )?,
            "math" => self.delimited(
                NodeKind::InlineMath,
                NodeKind::InlineMathOpenMarker,
                NodeKind::InlineMathContent,
                NodeKind::InlineMathCloseMarker,
                "$",
                &element_text(node),
            )?,
            "math_block" => self.delimited(
                NodeKind::MathBlock,
                NodeKind::MathBlockOpenMarker,
                NodeKind::MathBlockContent,
                NodeKind::MathBlockCloseMarker,
                "$$",
                &element_text(node),
            )?,
            "code_block" => {
                let text = element_text(node);
                let info = node.attribute("info");
                let fenced = info.is_some() || bool_attr(node, "fenced").unwrap_or(false);
                if fenced {
                    self.builder.open(NodeKind::CodeBlock { fenced: true });
                    self.builder.leaf(NodeKind::CodeBlockFenceOpenMarker, "```");
                    self.builder
                        .leaf(NodeKind::CodeBlockFenceInfoMarker, info.unwrap_or_default());
                    self.builder.leaf(NodeKind::CodeBlockCode, &text);
                    self.builder.leaf(NodeKind::CodeBlockFenceCloseMarker, "```");
                    self.builder.close()?;
                } else {
                    self.builder.leaf(NodeKind::CodeBlock { fenced: false }, &text);
                }
            }
            "html_block" => {
                self.builder.leaf(NodeKind::HtmlBlock, &element_text(node));
            }
            "html_inline" => {
                self.builder.leaf(NodeKind::InlineHtml, &element_text(node));
            }
            "block_quote" => {
                self.builder.open(NodeKind::Blockquote);
                self.builder.leaf(NodeKind::BlockquoteMarker, ">");
                self.children(node)?;
                self.builder.close()?;
            }
            "list" => self.list(node)?,
            "item" => {
                return Err(Error::structure("<item> outside of a <list>"));
            }
            "link" => {
                self.builder.open(NodeKind::Link);
                self.builder.leaf(NodeKind::OpenBracket, "[");
                self.children(node)?;
                self.link_tail(node);
                self.builder.close()?;
            }
            "image" => {
                self.builder.open(NodeKind::Image);
                self.builder.leaf(NodeKind::Bang, "!");
                self.builder.leaf(NodeKind::OpenBracket, "[");
                self.builder.leaf(NodeKind::LinkText, &element_text(node));
                self.link_tail(node);
                self.builder.close()?;
            }
            "table" => self.table(node)?,
            "table_header" => {
                self.builder.open(NodeKind::TableHead);
                let has_rows = node
                    .children()
                    .any(|c| c.is_element() && c.tag_name().name() == "table_row");
                if has_rows {
                    self.children(node)?;
                } else {
                    self.container(NodeKind::TableRow, node)?;
                }
                self.builder.close()?;
            }
            "table_row" => self.container(NodeKind::TableRow, node)?,
            "table_cell" => {
                let align = parse_align(node.attribute("align"));
                self.container(NodeKind::TableCell { align }, node)?;
            }
            "footnote_definition" => {
                let label = footnote_label(node);
                self.container(NodeKind::FootnotesDef { label }, node)?;
            }
            "footnote_reference" => {
                let label = footnote_label(node);
                self.builder.leaf(NodeKind::FootnotesRef { label: label.clone() }, &label);
            }
            "emoji" => {
                self.builder.open(NodeKind::Emoji);
                let text = element_text(node);
                if let Some(src) = node.attribute("src") {
                    self.builder.leaf(NodeKind::EmojiImg, src);
                } else if !text.is_empty() {
                    self.builder.leaf(NodeKind::EmojiUnicode, &text);
                } else if let Some(alias) = node.attribute("alias") {
                    self.builder.leaf(NodeKind::EmojiAlias, &format!(":{alias}:"));
                }
                self.builder.close()?;
            }
            "toc" => {
                self.builder.leaf(NodeKind::Toc, "[toc]");
            }
            "backslash" => {
                self.builder.open(NodeKind::Backslash);
                self.builder.leaf(NodeKind::BackslashContent, &element_text(node));
                self.builder.close()?;
            }
            "html_entity" => {
                self.builder.leaf(NodeKind::HtmlEntity, &element_text(node));
            }
            "front_matter" => {
                self.builder.leaf(NodeKind::FrontMatter, &element_text(node));
            }
            other => {
                return Err(Error::Structure(format!("unsupported element <{other}>")));
            }
        }
        Ok(())
    }

    fn list(&mut self, node: roxmltree::Node) -> Result<(), Error> {
        let ordered = node.attribute("type") == Some("ordered");
        let tight = bool_attr(node, "tight").unwrap_or(false);
        let start = node
            .attribute("start")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);
        let delimiter = match node.attribute("delim") {
            Some("paren") => ')',
            _ => '.',
        };
        let bullet = node
            .attribute("bullet_char")
            .and_then(|v| v.chars().next())
            .unwrap_or('-');
        let marker_at = |i: u32| {
            if ordered {
                ListMarker::Ordered {
                    number: start + i,
                    delimiter,
                }
            } else {
                ListMarker::Bullet(bullet)
            }
        };

        self.builder.open(NodeKind::List(ListData {
            marker: marker_at(0),
            tight,
        }));
        let items = node
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "item");
        for (i, item) in (0u32..).zip(items) {
            let data = ListData {
                marker: marker_at(i),
                tight,
            };
            self.builder.open(NodeKind::ListItem(data));
            self.pending_task = bool_attr(item, "checked");
            let starts_with_para = item
                .children()
                .find(|c| c.is_element())
                .is_some_and(|c| c.tag_name().name() == "paragraph");
            if !starts_with_para && let Some(checked) = self.pending_task.take() {
                self.builder.leaf(NodeKind::TaskListItemMarker { checked }, "");
            }
            self.children(item)?;
            self.pending_task = None;
            self.builder.close()?;
        }
        self.builder.close()?;
        Ok(())
    }

    fn table(&mut self, node: roxmltree::Node) -> Result<(), Error> {
        // Alignments come from the first row's cells, wherever that row lives.
        let first_row_cells: Vec<roxmltree::Node> = node
            .descendants()
            .find(|n| {
                n.is_element()
                    && matches!(n.tag_name().name(), "table_header" | "table_row")
                    && n.children()
                        .any(|c| c.is_element() && c.tag_name().name() == "table_cell")
            })
            .map(|row| {
                row.children()
                    .filter(|c| c.is_element() && c.tag_name().name() == "table_cell")
                    .collect()
            })
            .unwrap_or_default();
        let aligns = first_row_cells
            .iter()
            .map(|c| parse_align(c.attribute("align")))
            .collect();
        self.container(NodeKind::Table { aligns }, node)
    }
}
