//! Markdown document tree for Pagewright.
//!
//! Parses a single markdown document into a tree of nested sections: every
//! heading opens a section that owns the blocks and deeper headings after
//! it, up to the next heading of equal or shallower level.
//!
//! ```
//! use pw_tree::Document;
//!
//! let doc = Document::parse("# Guide\nIntro\n\n## Setup\nSteps");
//! let guide = doc.root().sections().next().unwrap();
//! assert_eq!(guide.title().unwrap(), "Guide");
//! assert_eq!(guide.sections().next().unwrap().id(), Some("setup"));
//! ```

mod document;
mod markdown;
mod title;

pub use document::{Document, Node, NodeId, NodeKind, TreeError};
pub use markdown::{Block, BlockKind, CmarkConverter, Converter, slugify};
