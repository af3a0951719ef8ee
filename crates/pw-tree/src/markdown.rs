//! Markdown conversion backed by `pulldown-cmark`.
//!
//! The document tree never looks inside a block. It asks a [`Converter`] to
//! split text into top-level [`Block`]s and later to turn a single block into
//! HTML.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag};

/// Kind of a top-level block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Heading with its level (1-6) and document-unique slug.
    Heading { level: u8, id: String },
    /// Any other block, named after its markdown construct.
    Other(&'static str),
}

/// One top-level block of a parsed document.
///
/// Holds the owned event stream of the block so it can be converted to HTML
/// lazily, after the whole document has been split.
#[derive(Clone, Debug)]
pub struct Block {
    kind: BlockKind,
    events: Vec<Event<'static>>,
}

impl Block {
    /// Create a block from its kind and events.
    #[must_use]
    pub fn new(kind: BlockKind, events: Vec<Event<'static>>) -> Self {
        Self { kind, events }
    }

    #[must_use]
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    #[must_use]
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Heading level, if this block is a heading.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading { level, .. } => Some(level),
            BlockKind::Other(_) => None,
        }
    }

    /// Heading slug, if this block is a heading.
    #[must_use]
    pub fn heading_id(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Heading { id, .. } => Some(id),
            BlockKind::Other(_) => None,
        }
    }

    /// Short name of the markdown construct (e.g. "paragraph", "heading").
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            BlockKind::Heading { .. } => "heading",
            BlockKind::Other(name) => name,
        }
    }
}

/// Markdown converter used to build a [`Document`](crate::Document).
///
/// Implementations split source text into top-level blocks (assigning a
/// unique slug to every heading) and render a single block to HTML.
pub trait Converter {
    /// Split markdown text into top-level blocks in document order.
    fn blocks(&self, text: &str) -> Vec<Block>;

    /// Render one block to HTML.
    fn convert(&self, block: &Block) -> String;
}

/// [`Converter`] backed by `pulldown-cmark`.
#[derive(Clone, Debug)]
pub struct CmarkConverter {
    gfm: bool,
}

impl CmarkConverter {
    /// Create a converter with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Blockquote alerts (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    ///
    /// Explicit heading ids (`# Title {#custom}`) are always parsed; they share
    /// the document-unique slug namespace with generated ids.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let base = Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            base
        }
    }
}

impl Default for CmarkConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for CmarkConverter {
    fn blocks(&self, text: &str) -> Vec<Block> {
        let mut slugs = SlugRegistry::default();
        let mut blocks = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        for event in Parser::new_ext(text, self.parser_options()) {
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            current.push(event.into_static());
            if depth == 0 {
                blocks.push(finish_block(std::mem::take(&mut current), &mut slugs));
            }
        }

        blocks
    }

    fn convert(&self, block: &Block) -> String {
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, block.events().iter().cloned());
        html
    }
}

/// Close a top-level block, assigning a slug when it is a heading.
fn finish_block(mut events: Vec<Event<'static>>, slugs: &mut SlugRegistry) -> Block {
    let text = heading_text(&events);

    if let Some(Event::Start(Tag::Heading { level, id, .. })) = events.first_mut() {
        let slug = match id.as_deref() {
            Some(explicit) => slugs.claim(explicit),
            None => slugs.unique(&text),
        };
        *id = Some(CowStr::from(slug.clone()));
        let level = heading_level_to_num(*level);
        return Block::new(BlockKind::Heading { level, id: slug }, events);
    }

    let name = events.first().map_or("block", block_name);
    Block::new(BlockKind::Other(name), events)
}

/// Plain text of a heading: text and inline code, markup dropped.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        if let Event::Text(t) | Event::Code(t) = event {
            text.push_str(t);
        }
    }
    text
}

fn block_name(event: &Event<'_>) -> &'static str {
    match event {
        Event::Start(Tag::Paragraph) => "paragraph",
        Event::Start(Tag::CodeBlock(_)) => "code_block",
        Event::Start(Tag::List(_)) => "list",
        Event::Start(Tag::BlockQuote(_)) => "blockquote",
        Event::Start(Tag::Table(_)) => "table",
        Event::Start(Tag::HtmlBlock) | Event::Html(_) => "html",
        Event::Start(Tag::FootnoteDefinition(_)) => "footnote",
        Event::Start(Tag::DefinitionList) => "definition_list",
        Event::Start(Tag::MetadataBlock(_)) => "metadata",
        Event::Rule => "rule",
        _ => "block",
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Turn heading text into a URL-safe slug.
///
/// Lowercases, keeps alphanumerics, `-` and `_`, turns whitespace runs into a
/// single `-` and drops everything else. Empty results become `section`.
///
/// # Examples
///
/// ```
/// use pw_tree::slugify;
///
/// assert_eq!(slugify("This is the title"), "this-is-the-title");
/// assert_eq!(slugify("Subsection 1.A"), "subsection-1a");
/// assert_eq!(slugify("???"), "section");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Hands out document-unique slugs (`faq`, `faq-1`, `faq-2`, ...).
///
/// Explicit ids share the same namespace as generated slugs, so a later
/// `{#faq}` becomes `faq-1` rather than shadowing an earlier heading.
#[derive(Default)]
struct SlugRegistry {
    used: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl SlugRegistry {
    /// Register an explicit id.
    ///
    /// Separators that would split or escape a page path (`/`, `\`, `.`,
    /// whitespace) become `-`.
    fn claim(&mut self, id: &str) -> String {
        let id: String = id
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | '.' => '-',
                c if c.is_whitespace() => '-',
                c => c,
            })
            .collect();
        if id.is_empty() {
            return self.reserve("section".to_owned());
        }
        self.reserve(id)
    }

    fn unique(&mut self, text: &str) -> String {
        self.reserve(slugify(text))
    }

    fn reserve(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut suffix = self.suffixes.get(&base).copied().unwrap_or(0);
        loop {
            suffix += 1;
            let candidate = format!("{base}-{suffix}");
            if self.used.insert(candidate.clone()) {
                self.suffixes.insert(base, suffix);
                return candidate;
            }
        }
    }
}
