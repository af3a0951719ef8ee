//! Page graph builder for Pagewright.
//!
//! Walks a parsed [`pw_tree::Document`] through a [`Theme`] and collects
//! every reachable page into a [`PageMap`]. Templates link to other nodes
//! with [`Page::build`]; each distinct path is rendered at most once per
//! build run, no matter how many templates reference it.
//!
//! ```
//! use pw_builder::{Info, SiteBuilder, Template, Theme};
//! use pw_tree::Document;
//!
//! let page = Template::new(|page, _| Ok(page.to_html().to_owned()));
//! let home = Template::new(|page, _| {
//!     let mut links = Vec::new();
//!     for section in page.sections() {
//!         links.push(section.build("page")?);
//!     }
//!     Ok(links.join(","))
//! });
//! let theme = Theme::new(home).with_template("page", page);
//!
//! let site = SiteBuilder::new(Document::parse("# Intro\n\n# Usage"), Info::default());
//! let pages = site.visit(&theme).unwrap();
//! assert_eq!(pages.get(""), Some("/intro,/usage"));
//! assert_eq!(pages.len(), 3);
//! ```

mod builder;
pub mod html;
mod info;
mod page_map;
mod template;
pub mod themes;

pub use builder::{BuildError, Page, SiteBuilder};
pub use info::Info;
pub use page_map::{Iter, PageMap};
pub use template::{RenderFn, SlotFn, Slots, SlotsBuilder, Template, Theme};
