//! Document tree of nested sections.
//!
//! Nodes live in a flat arena owned by [`Document`]. Index `0` is the root;
//! every other node is either a section (one heading plus everything nested
//! under it) or a content node wrapping a single non-heading block. Tree
//! navigation goes through lightweight [`Node`] views.

use std::cell::OnceCell;
use std::fmt;

use crate::markdown::{Block, CmarkConverter, Converter};
use crate::title::extract_title;

/// Deepest heading level plus one slot for the root.
const LEVELS: usize = 7;

/// Error reading a node attribute.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Section markup does not contain a single heading element.
    #[error("heading markup does not match a single <hN> element: {0}")]
    MalformedHeading(String),
    /// Attribute requested from a node kind that does not have it.
    #[error("{kind} node has no {attribute}")]
    MissingAttribute {
        attribute: &'static str,
        kind: NodeKind,
    },
}

/// Stable index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The document root.
    pub const ROOT: Self = Self(0);

    /// Position in document order (root is `0`).
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Section,
    Content,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Section => "section",
            Self::Content => "content",
        })
    }
}

struct NodeData {
    kind: NodeKind,
    block: Option<Block>,
    children: Vec<NodeId>,
    /// Converter output for the node's own block.
    block_html: OnceCell<String>,
    /// Composite HTML of a section or the root.
    html: OnceCell<String>,
    title: OnceCell<String>,
}

impl NodeData {
    fn new(kind: NodeKind, block: Option<Block>) -> Self {
        Self {
            kind,
            block,
            children: Vec::new(),
            block_html: OnceCell::new(),
            html: OnceCell::new(),
            title: OnceCell::new(),
        }
    }
}

/// Parsed markdown document.
///
/// Built in one linear pass and immutable afterwards. HTML, titles and
/// section markup are rendered lazily on first access and cached, so the
/// converter runs at most once per block.
pub struct Document {
    converter: Box<dyn Converter>,
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse markdown with the default GFM converter.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, CmarkConverter::new())
    }

    /// Parse markdown with a custom converter.
    ///
    /// A heading of level `L` attaches to the most recent open section of a
    /// shallower level (the root when there is none). Any other block
    /// attaches to the most recently opened section, or to the root before
    /// the first heading.
    #[must_use]
    pub fn parse_with(text: &str, converter: impl Converter + 'static) -> Self {
        let blocks = converter.blocks(text);
        let mut doc = Self {
            converter: Box::new(converter),
            nodes: Vec::with_capacity(blocks.len() + 1),
        };
        doc.nodes.push(NodeData::new(NodeKind::Root, None));

        let mut last_at_level: [Option<NodeId>; LEVELS] = [None; LEVELS];
        last_at_level[0] = Some(NodeId::ROOT);
        let mut current = NodeId::ROOT;

        for block in blocks {
            if let Some(level) = block.heading_level() {
                let level = usize::from(level).clamp(1, LEVELS - 1);
                let parent = last_at_level[..level]
                    .iter()
                    .rev()
                    .find_map(|id| *id)
                    .unwrap_or(NodeId::ROOT);
                let id = doc.push(NodeKind::Section, block, parent);
                last_at_level[level] = Some(id);
                for slot in &mut last_at_level[level + 1..] {
                    *slot = None;
                }
                current = id;
            } else {
                doc.push(NodeKind::Content, block, current);
            }
        }

        doc
    }

    fn push(&mut self, kind: NodeKind, block: Block, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind, Some(block)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Root view of the document.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            doc: self,
            id: NodeId::ROOT,
        }
    }

    /// View of the node with the given id, if it belongs to this document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { doc: self, id })
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// HTML of the whole document.
    #[must_use]
    pub fn to_html(&self) -> &str {
        self.root().to_html()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .field("node_count", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Borrowed view of one node in a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl<'d> Node<'d> {
    fn data(&self) -> &'d NodeData {
        &self.doc.nodes[self.id.0]
    }

    fn require(&self, attribute: &'static str, kind: NodeKind) -> Result<(), TreeError> {
        let actual = self.kind();
        if actual == kind {
            Ok(())
        } else {
            Err(TreeError::MissingAttribute {
                attribute,
                kind: actual,
            })
        }
    }

    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn document(&self) -> &'d Document {
        self.doc
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Whether this node is a heading-anchored section. The root is not.
    #[must_use]
    pub fn is_section(&self) -> bool {
        self.kind() == NodeKind::Section
    }

    /// Heading slug of a section.
    #[must_use]
    pub fn id(&self) -> Option<&'d str> {
        self.data().block.as_ref().and_then(Block::heading_id)
    }

    /// Heading level: `0` for the root, `1..=6` for sections, `None` for content.
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        match self.kind() {
            NodeKind::Root => Some(0),
            NodeKind::Section => self.data().block.as_ref().and_then(Block::heading_level),
            NodeKind::Content => None,
        }
    }

    /// The wrapped markdown block (absent for the root).
    #[must_use]
    pub fn block(&self) -> Option<&'d Block> {
        self.data().block.as_ref()
    }

    /// Children in document order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'d>> + use<'d> {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| Node { doc, id })
    }

    /// Children that are sections, in document order.
    pub fn sections(&self) -> impl Iterator<Item = Node<'d>> + use<'d> {
        self.nodes().filter(|node| node.is_section())
    }

    /// Rendered heading element of a section, e.g. `<h2 id="setup">Setup</h2>`.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::MissingAttribute` for the root and content nodes.
    pub fn title_html(&self) -> Result<&'d str, TreeError> {
        self.require("title_html", NodeKind::Section)?;
        Ok(self.block_html())
    }

    /// Inner HTML of the section heading, inline markup preserved.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::MissingAttribute` for the root and content nodes,
    /// and `TreeError::MalformedHeading` when the heading markup cannot be
    /// matched.
    pub fn title(&self) -> Result<&'d str, TreeError> {
        self.require("title", NodeKind::Section)?;
        let data = self.data();
        if let Some(title) = data.title.get() {
            return Ok(title.as_str());
        }
        let title = extract_title(self.block_html())?.to_owned();
        Ok(data.title.get_or_init(|| title).as_str())
    }

    /// HTML of this node and everything nested under it.
    #[must_use]
    pub fn to_html(&self) -> &'d str {
        let data = self.data();
        match data.kind {
            NodeKind::Content => self.block_html(),
            NodeKind::Section => data.html.get_or_init(|| {
                let mut html = self.block_html().to_owned();
                for node in self.nodes() {
                    html.push('\n');
                    html.push_str(node.to_html());
                }
                html
            }),
            NodeKind::Root => data.html.get_or_init(|| {
                let mut html = String::new();
                for node in self.nodes() {
                    html.push_str(node.to_html());
                    html.push('\n');
                }
                html
            }),
        }
    }

    fn block_html(&self) -> &'d str {
        let data = self.data();
        data.block_html.get_or_init(|| {
            data.block
                .as_ref()
                .map(|block| self.doc.converter.convert(block))
                .unwrap_or_default()
        })
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        let count = data.children.len();
        match data.kind {
            NodeKind::Root => write!(f, "<Root [{count} nodes]>"),
            NodeKind::Section => write!(
                f,
                "<Section:H{}#{} [{count} nodes]>",
                self.level().unwrap_or_default(),
                self.id().unwrap_or_default()
            ),
            NodeKind::Content => write!(
                f,
                "<Content:{}>",
                data.block.as_ref().map_or("block", Block::name)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = "A\n\n# T\nS\n\n## Sec1\nX\n\n### Sub\nY\n\n## Sec2\nZ";

    fn shape(node: Node<'_>) -> Vec<String> {
        node.nodes().map(|n| format!("{n:?}")).collect()
    }

    /// Converter that counts how often blocks are rendered.
    struct CountingConverter {
        inner: CmarkConverter,
        calls: Rc<Cell<usize>>,
    }

    impl Converter for CountingConverter {
        fn blocks(&self, text: &str) -> Vec<Block> {
            self.inner.blocks(text)
        }

        fn convert(&self, block: &Block) -> String {
            self.calls.set(self.calls.get() + 1);
            self.inner.convert(block)
        }
    }

    fn counting(text: &str) -> (Document, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let converter = CountingConverter {
            inner: CmarkConverter::new(),
            calls: Rc::clone(&calls),
        };
        (Document::parse_with(text, converter), calls)
    }

    #[test]
    fn test_tree_shape() {
        let doc = Document::parse(SAMPLE);
        let root = doc.root();
        assert_eq!(
            shape(root),
            vec!["<Content:paragraph>", "<Section:H1#t [3 nodes]>"]
        );

        let t = root.sections().next().unwrap();
        assert_eq!(
            shape(t),
            vec![
                "<Content:paragraph>",
                "<Section:H2#sec1 [2 nodes]>",
                "<Section:H2#sec2 [1 nodes]>"
            ]
        );

        let sec1 = t.sections().next().unwrap();
        assert_eq!(
            shape(sec1),
            vec!["<Content:paragraph>", "<Section:H3#sub [1 nodes]>"]
        );
        assert_eq!(sec1.nodes().next().unwrap().to_html(), "<p>X</p>\n");
    }

    #[test]
    fn test_orphan_content_attaches_to_root() {
        let doc = Document::parse("Orphan text\n\n# First");
        let first = doc.root().nodes().next().unwrap();
        assert_eq!(first.kind(), NodeKind::Content);
        assert_eq!(first.to_html(), "<p>Orphan text</p>\n");
    }

    #[test]
    fn test_content_only_document() {
        let doc = Document::parse("One\n\nTwo");
        assert_eq!(doc.root().nodes().count(), 2);
        assert_eq!(doc.root().sections().count(), 0);
        assert_eq!(doc.to_html(), "<p>One</p>\n\n<p>Two</p>\n\n");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("");
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.to_html(), "");
        assert_eq!(format!("{:?}", doc.root()), "<Root [0 nodes]>");
    }

    #[test]
    fn test_shallower_heading_closes_deeper_sections() {
        let doc = Document::parse("# A\n## B\n### C\n## D\n# E\n### F");
        let root = doc.root();
        let ids: Vec<_> = root.sections().filter_map(|n| n.id()).collect();
        assert_eq!(ids, vec!["a", "e"]);

        let a = root.sections().next().unwrap();
        let ids: Vec<_> = a.sections().filter_map(|n| n.id()).collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn test_skipped_level_attaches_to_nearest_shallower_section() {
        let doc = Document::parse("# A\n### C\ntext");
        let a = doc.root().sections().next().unwrap();
        let c = a.sections().next().unwrap();
        assert_eq!(c.id(), Some("c"));
        assert_eq!(c.level(), Some(3));
        assert_eq!(c.nodes().count(), 1);
    }

    #[test]
    fn test_skipped_level_without_open_section_attaches_to_root() {
        let doc = Document::parse("## Only\n\nbody");
        let only = doc.root().sections().next().unwrap();
        assert_eq!(only.id(), Some("only"));
        assert_eq!(only.level(), Some(2));
    }

    #[test]
    fn test_same_level_heading_is_sibling() {
        let doc = Document::parse("## One\n## Two");
        assert_eq!(doc.root().sections().count(), 2);
    }

    #[test]
    fn test_title_with_inline_markup() {
        let doc = Document::parse("# This is the `title` {#x}");
        let section = doc.root().sections().next().unwrap();
        assert_eq!(
            section.title_html().unwrap(),
            "<h1 id=\"x\">This is the <code>title</code></h1>\n"
        );
        assert_eq!(section.title().unwrap(), "This is the <code>title</code>");
        assert_eq!(section.title().unwrap(), "This is the <code>title</code>");
    }

    #[test]
    fn test_root_and_content_have_no_title() {
        let doc = Document::parse("text\n\n# T");
        let root = doc.root();
        assert!(matches!(
            root.title(),
            Err(TreeError::MissingAttribute {
                attribute: "title",
                kind: NodeKind::Root
            })
        ));

        let content = root.nodes().next().unwrap();
        assert!(matches!(
            content.title_html(),
            Err(TreeError::MissingAttribute {
                kind: NodeKind::Content,
                ..
            })
        ));
        assert_eq!(content.id(), None);
        assert_eq!(content.level(), None);
        assert_eq!(root.level(), Some(0));
        assert!(!root.is_section());
    }

    #[test]
    fn test_section_html_composition() {
        let doc = Document::parse("# T\nS\n## U\nV");
        let t = doc.root().sections().next().unwrap();
        assert_eq!(
            t.to_html(),
            "<h1 id=\"t\">T</h1>\n\n<p>S</p>\n\n<h2 id=\"u\">U</h2>\n\n<p>V</p>\n"
        );
        assert_eq!(doc.to_html(), format!("{}\n", t.to_html()));
    }

    #[test]
    fn test_html_is_memoized() {
        let (doc, calls) = counting("# T\nS\n\n## U\nV");
        let first = doc.to_html().to_owned();
        let after_first = calls.get();
        assert_eq!(after_first, 4);

        assert_eq!(doc.to_html(), first);
        let t = doc.root().sections().next().unwrap();
        let _ = t.title().unwrap();
        let _ = t.title_html().unwrap();
        for node in t.nodes() {
            let _ = node.to_html();
        }
        assert_eq!(calls.get(), after_first);
    }

    #[test]
    fn test_parse_does_not_render() {
        let (_doc, calls) = counting(SAMPLE);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_idempotent_reparse() {
        let first = Document::parse(SAMPLE);
        let second = Document::parse(SAMPLE);
        assert_eq!(first.to_html(), second.to_html());
    }

    #[test]
    fn test_get_node_by_id() {
        let doc = Document::parse(SAMPLE);
        let t = doc.root().sections().next().unwrap();
        assert_eq!(doc.get(t.node_id()), Some(t));
        assert_eq!(doc.get(NodeId(doc.node_count())), None);
        assert_eq!(doc.get(NodeId::ROOT), Some(doc.root()));
    }

    #[test]
    fn test_node_ids_follow_document_order() {
        let doc = Document::parse(SAMPLE);
        let t = doc.root().sections().next().unwrap();
        let indices: Vec<_> = t.nodes().map(|n| n.node_id().index()).collect();
        assert_eq!(indices, vec![3, 4, 8]);
    }
}
