//! Built-in themes.
//!
//! Both themes share one page shell (top menu, sidebar, main column) and a
//! stylesheet built at [`STYLESHEET_PATH`]. They differ in how the document
//! is split: `single-page` renders everything on the home page and links
//! sections by anchor, `multi-page` builds a page per section.

mod multi_page;
mod shell;
mod single_page;

use crate::template::Theme;

pub use shell::STYLESHEET_PATH;

/// Name of the theme used when none is configured.
pub const DEFAULT_THEME: &str = single_page::NAME;

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &[single_page::NAME, multi_page::NAME];

/// The whole document on one page with in-page anchor navigation.
#[must_use]
pub fn single_page() -> Theme {
    single_page::theme()
}

/// One page per section, linked through the menu and section listings.
#[must_use]
pub fn multi_page() -> Theme {
    multi_page::theme()
}

/// Look up a built-in theme by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Theme> {
    match name {
        single_page::NAME => Some(single_page()),
        multi_page::NAME => Some(multi_page()),
        _ => None,
    }
}
