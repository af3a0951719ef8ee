//! Site builder, build runs and the page wrapper templates work with.
//!
//! [`SiteBuilder`] owns the parsed document and resolves the hierarchical
//! path of every node once, parent to child. [`SiteBuilder::visit`] starts a
//! build run: the theme's entry template renders the root at `""`, and every
//! [`Page::build`] call inside a template links another node into the same
//! run. A path is claimed with a placeholder before its template runs, so
//! reentrant and repeated links return the path without rendering again.

use std::cell::RefCell;
use std::fmt;

use pw_tree::{Document, Node, NodeId, NodeKind, TreeError};

use crate::info::Info;
use crate::page_map::PageMap;
use crate::template::{Template, Theme};

/// Error during a build run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("content node under '{parent}' has no path of its own, build it at an explicit path")]
    Unaddressable { parent: String },
}

/// Document plus the resolved path of every node.
pub struct SiteBuilder {
    document: Document,
    info: Info,
    /// Indexed by `NodeId::index()`. Content nodes share their parent's path.
    paths: Vec<String>,
}

impl SiteBuilder {
    /// Wrap a document, resolving node paths from the root down.
    ///
    /// The root's path is `""`; a section's path is its parent's path
    /// followed by `/` and its own slug.
    #[must_use]
    pub fn new(document: Document, info: Info) -> Self {
        let mut paths = vec![String::new(); document.node_count()];
        let mut stack = vec![document.root()];

        while let Some(node) = stack.pop() {
            let base = paths[node.node_id().index()].clone();
            for child in node.nodes() {
                paths[child.node_id().index()] = match child.id() {
                    Some(id) if child.is_section() => format!("{base}/{id}"),
                    _ => base.clone(),
                };
                stack.push(child);
            }
        }

        Self {
            document,
            info,
            paths,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Resolved path of a node.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> Option<&str> {
        self.paths.get(id.index()).map(String::as_str)
    }

    /// Run a build: render the root with the theme's entry template and
    /// return every page reached through `build` links.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any template; the partial run is
    /// discarded.
    pub fn visit(&self, theme: &Theme) -> Result<PageMap, BuildError> {
        let run = BuildRun {
            site: self,
            theme,
            pages: RefCell::new(PageMap::new()),
        };
        run.link(self.document.root(), "", theme.entry())?;

        let pages = run.pages.into_inner();
        tracing::debug!(pages = pages.len(), "Build run finished");
        Ok(pages)
    }
}

impl fmt::Debug for SiteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteBuilder")
            .field("document", &self.document)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// State of one `visit` call. Owns the page map for its duration.
struct BuildRun<'s> {
    site: &'s SiteBuilder,
    theme: &'s Theme,
    pages: RefCell<PageMap>,
}

impl BuildRun<'_> {
    fn link(&self, node: Node<'_>, path: &str, template: &Template) -> Result<String, BuildError> {
        {
            let mut pages = self.pages.borrow_mut();
            if let Some(source) = pages.source_of(path) {
                if source == node.node_id() {
                    tracing::trace!(path, "Page already built");
                } else {
                    tracing::warn!(
                        path,
                        first = ?source,
                        second = ?node.node_id(),
                        "Path already claimed by another node, keeping the first page"
                    );
                }
                return Ok(path.to_owned());
            }
            pages.claim(path, node.node_id());
        }

        tracing::debug!(path, node = ?node, "Rendering page");
        let page = Page { run: self, node };
        let content = template.call(&page)?;
        self.pages.borrow_mut().fill(path, content);

        Ok(path.to_owned())
    }
}

/// A document node as seen by templates, bound to the running build.
#[derive(Clone, Copy)]
pub struct Page<'r> {
    run: &'r BuildRun<'r>,
    node: Node<'r>,
}

impl<'r> Page<'r> {
    fn wrap(&self, node: Node<'r>) -> Page<'r> {
        Page { run: self.run, node }
    }

    /// The wrapped tree node.
    #[must_use]
    pub fn node(&self) -> Node<'r> {
        self.node
    }

    /// Resolved path: `""` for the root, `/a/b` for sections.
    ///
    /// Content nodes report the path of the section that contains them.
    #[must_use]
    pub fn path(&self) -> &'r str {
        self.run.site.paths[self.node.node_id().index()].as_str()
    }

    #[must_use]
    pub fn id(&self) -> Option<&'r str> {
        self.node.id()
    }

    #[must_use]
    pub fn level(&self) -> Option<u8> {
        self.node.level()
    }

    #[must_use]
    pub fn is_section(&self) -> bool {
        self.node.is_section()
    }

    /// # Errors
    ///
    /// Fails for the root and content nodes, or on malformed heading markup.
    pub fn title(&self) -> Result<&'r str, BuildError> {
        Ok(self.node.title()?)
    }

    /// # Errors
    ///
    /// Fails for the root and content nodes.
    pub fn title_html(&self) -> Result<&'r str, BuildError> {
        Ok(self.node.title_html()?)
    }

    #[must_use]
    pub fn to_html(&self) -> &'r str {
        self.node.to_html()
    }

    pub fn nodes(&self) -> impl Iterator<Item = Page<'r>> + use<'r> {
        let run = self.run;
        self.node.nodes().map(move |node| Page { run, node })
    }

    pub fn sections(&self) -> impl Iterator<Item = Page<'r>> + use<'r> {
        self.nodes().filter(|page| page.is_section())
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> Page<'r> {
        self.wrap(self.run.site.document.root())
    }

    #[must_use]
    pub fn info(&self) -> &'r Info {
        &self.run.site.info
    }

    /// Build this node at its own path with a named template.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownTemplate` for an unregistered name,
    /// `BuildError::Unaddressable` for content nodes, and any error raised
    /// while rendering.
    pub fn build(&self, template: &str) -> Result<String, BuildError> {
        self.build_with(self.run.theme.template(template)?)
    }

    /// Build this node at its own path with the given template.
    ///
    /// # Errors
    ///
    /// See [`Page::build`].
    pub fn build_with(&self, template: &Template) -> Result<String, BuildError> {
        if self.node.kind() == NodeKind::Content {
            return Err(BuildError::Unaddressable {
                parent: self.path().to_owned(),
            });
        }
        self.run.link(self.node, self.path(), template)
    }

    /// Build this node at an explicit path with a named template.
    ///
    /// # Errors
    ///
    /// See [`Page::build`].
    pub fn build_at(&self, path: &str, template: &str) -> Result<String, BuildError> {
        self.build_at_with(path, self.run.theme.template(template)?)
    }

    /// Build this node at an explicit path with the given template.
    ///
    /// Paths are root-relative: a missing leading `/` is added, so `"intro"`
    /// and `"/intro"` name the same page. `""` is the home page.
    ///
    /// # Errors
    ///
    /// Returns any error raised while rendering.
    pub fn build_at_with(&self, path: &str, template: &Template) -> Result<String, BuildError> {
        if path.is_empty() || path.starts_with('/') {
            self.run.link(self.node, path, template)
        } else {
            self.run.link(self.node, &format!("/{path}"), template)
        }
    }

    /// Render a named template for this node without creating a page.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownTemplate` for an unregistered name and any
    /// error raised while rendering.
    pub fn render(&self, template: &str) -> Result<String, BuildError> {
        self.run.theme.template(template)?.call(self)
    }
}

impl fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Page '{}' {:?}>", self.path(), self.node)
    }
}
