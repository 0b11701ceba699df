use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellAlign {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListMarker {
    Bullet(char),
    Ordered { number: u32, delimiter: char },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListData {
    pub marker: ListMarker,
    pub tight: bool,
}

/// The closed set of node types a document tree can contain.
///
/// Inline spans are containers whose first and last children are the open and
/// close markers (`Emphasis` holds `EmOpenMarker .. EmCloseMarker`), so the
/// renderer sees both edges of every span as separate nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading { level: u8 },
    HeadingC8hMarker,
    Text,

    Emphasis,
    EmOpenMarker,
    EmCloseMarker,
    Strong,
    StrongOpenMarker,
    StrongCloseMarker,
    Strikethrough,
    StrikethroughOpenMarker,
    StrikethroughCloseMarker,

    CodeSpan,
    CodeSpanOpenMarker,
    CodeSpanContent,
    CodeSpanCloseMarker,
    CodeBlock { fenced: bool },
    CodeBlockFenceOpenMarker,
    CodeBlockFenceInfoMarker,
    CodeBlockCode,
    CodeBlockFenceCloseMarker,

    MathBlock,
    MathBlockOpenMarker,
    MathBlockContent,
    MathBlockCloseMarker,
    InlineMath,
    InlineMathOpenMarker,
    InlineMathContent,
    InlineMathCloseMarker,

    Blockquote,
    BlockquoteMarker,
    List(ListData),
    ListItem(ListData),
    TaskListItemMarker { checked: bool },
    ThematicBreak,
    HardBreak,
    SoftBreak,
    HtmlBlock,
    InlineHtml,

    Link,
    Image,
    Bang,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    LinkText,
    LinkDest,
    LinkSpace,
    LinkTitle,

    Table { aligns: Vec<CellAlign> },
    TableHead,
    TableRow,
    TableCell { align: CellAlign },

    Emoji,
    EmojiUnicode,
    EmojiImg,
    EmojiAlias,

    FootnotesDef { label: String },
    FootnotesRef { label: String },
    Toc,
    Backslash,
    BackslashContent,
    HtmlEntity,
    FrontMatter,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub tokens: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

/// A parsed document: an arena of nodes rooted at a `Document` node.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn tokens(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tokens
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Parent, grandparent, ... up to the root. Excludes `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn child_by_kind(&self, id: NodeId, matches: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.children(id).find(|&c| matches(self.kind(c)))
    }

    /// Concatenated tokens of every text-bearing descendant, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text
            | NodeKind::CodeSpanContent
            | NodeKind::InlineMathContent
            | NodeKind::LinkText
            | NodeKind::BackslashContent
            | NodeKind::HtmlEntity
            | NodeKind::EmojiUnicode => out.push_str(self.tokens(id)),
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Headings reachable from the top level through lists, list items and
    /// blockquotes, in document order. Headings inside footnote definitions are
    /// not part of the body and are left out.
    pub fn headings(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in self.children(self.root()) {
            self.collect_headings(child, &mut out);
        }
        out
    }

    fn collect_headings(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.kind(id) {
            NodeKind::Heading { .. } => out.push(id),
            NodeKind::List(_) | NodeKind::ListItem(_) | NodeKind::Blockquote => {
                for child in self.children(id) {
                    self.collect_headings(child, out);
                }
            }
            _ => {}
        }
    }

    /// Footnote definition labels in document order, each label once.
    /// Position `i` in the result is footnote number `i + 1`.
    pub fn footnote_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for id in self.descendants(self.root()) {
            if let NodeKind::FootnotesDef { label } = self.kind(id)
                && !labels.iter().any(|l| l == label)
            {
                labels.push(label.clone());
            }
        }
        labels
    }

    /// Pre-order traversal including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut kids: Vec<NodeId> = self.children(n).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Column count of the nearest enclosing table, 0 outside tables.
    pub fn table_columns(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .find_map(|a| match self.kind(a) {
                NodeKind::Table { aligns } => Some(aligns.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Number of enclosing lists and blockquotes. Walks the ancestor chain each call.
    pub fn container_depth(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .filter(|&a| matches!(self.kind(a), NodeKind::List(_) | NodeKind::Blockquote))
            .count()
    }
}

pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.next(cur);
        Some(cur)
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.parent(cur);
        Some(cur)
    }
}

/// Builds a tree top-down: `open` a container, add `leaf`s, `close` it.
pub struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Document,
            tokens: String::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        };
        Self {
            nodes: vec![root],
            open: vec![NodeId(0)],
        }
    }

    fn append(&mut self, kind: NodeKind, tokens: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        // The root is never closed, so `open` is non-empty here.
        let parent = *self.open.last().unwrap_or(&NodeId(0));
        let prev = self.nodes[parent.0].last_child;
        self.nodes.push(Node {
            kind,
            tokens: tokens.to_string(),
            parent: Some(parent),
            first_child: None,
            last_child: None,
            prev,
            next: None,
        });
        match prev {
            Some(p) => self.nodes[p.0].next = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }

    pub fn open(&mut self, kind: NodeKind) -> NodeId {
        let id = self.append(kind, "");
        self.open.push(id);
        id
    }

    pub fn leaf(&mut self, kind: NodeKind, tokens: &str) -> NodeId {
        self.append(kind, tokens)
    }

    pub fn text(&mut self, tokens: &str) -> NodeId {
        self.leaf(NodeKind::Text, tokens)
    }

    /// Set the tokens of a node that is already in the tree.
    pub fn set_tokens(&mut self, id: NodeId, tokens: &str) {
        self.nodes[id.0].tokens = tokens.to_string();
    }

    pub fn close(&mut self) -> Result<NodeId, Error> {
        if self.open.len() <= 1 {
            return Err(Error::structure("close without a matching open"));
        }
        self.open
            .pop()
            .ok_or_else(|| Error::structure("close without a matching open"))
    }

    pub fn finish(self) -> Result<Tree, Error> {
        if self.open.len() != 1 {
            let id = self.open[self.open.len() - 1];
            return Err(Error::Structure(format!(
                "unclosed {:?} node at end of document",
                self.nodes[id.0].kind
            )));
        }
        Ok(Tree { nodes: self.nodes })
    }
}
