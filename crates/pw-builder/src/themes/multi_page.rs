//! One page per section.
//!
//! The home page lists the top sections' content with links to their
//! subsections; every section page links to its own subsections. All links
//! go through `build`, so the reachable tree is materialized page by page.

use std::fmt::Write;

use super::shell::{self, LAYOUT, MENU, STYLES, TITLE_SLOT};
use crate::builder::{BuildError, Page};
use crate::html::{escape_html, href, strip_tags};
use crate::template::{MAIN_SLOT, Template, Theme};

pub(super) const NAME: &str = "multi-page";

const PAGE: &str = "page";

pub(super) fn theme() -> Theme {
    let layout = shell::layout();
    let page = layout.define_slots(|slots| {
        slots.slot(TITLE_SLOT, |page| Ok(strip_tags(page.title()?)));
        slots.slot(MAIN_SLOT, section_page);
    });

    Theme::new(layout.define(home))
        .with_template(LAYOUT, layout)
        .with_template(MENU, Template::new(|page, _| shell::render_menu(page, link)))
        .with_template(PAGE, page)
        .with_template(STYLES, shell::styles())
}

fn link(section: &Page<'_>) -> Result<String, BuildError> {
    Ok(href(&section.build(PAGE)?).to_owned())
}

/// `<ul>` of links to each section's page.
fn push_index<'r>(
    html: &mut String,
    sections: impl Iterator<Item = Page<'r>>,
) -> Result<(), BuildError> {
    let mut sections = sections.peekable();
    if sections.peek().is_none() {
        return Ok(());
    }
    html.push_str("<ul class=\"section-index\">\n");
    for section in sections {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&link(&section)?),
            section.title()?
        );
    }
    html.push_str("</ul>\n");
    Ok(())
}

fn home(page: &Page<'_>) -> Result<String, BuildError> {
    let mut html = String::new();
    for node in page.nodes() {
        if !node.is_section() {
            html.push_str(node.to_html());
            continue;
        }
        html.push_str(node.title_html()?);
        for child in node.nodes().filter(|child| !child.is_section()) {
            html.push_str(child.to_html());
        }
        push_index(&mut html, node.sections())?;
    }
    Ok(html)
}

fn section_page(page: &Page<'_>) -> Result<String, BuildError> {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<article id=\"{}\" class=\"section\">",
        escape_html(page.id().unwrap_or_default())
    );
    let _ = writeln!(html, "<h1>{}</h1>", page.title()?);

    for node in page.nodes() {
        if node.is_section() {
            let _ = writeln!(
                html,
                "<h2><a href=\"{}\">{}</a></h2>",
                escape_html(&link(&node)?),
                node.title()?
            );
        } else {
            html.push_str(node.to_html());
        }
    }

    html.push_str("</article>\n");
    Ok(html)
}
