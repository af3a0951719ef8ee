//! The whole document on one page.
//!
//! Second-level sections become `<section>` elements and their subsections
//! `<article>`s; the menu links to them by anchor.

use std::fmt::Write;

use super::shell::{self, LAYOUT, MENU, STYLES};
use crate::builder::{BuildError, Page};
use crate::html::escape_html;
use crate::template::{Template, Theme};

pub(super) const NAME: &str = "single-page";

const SECTION: &str = "section";

pub(super) fn theme() -> Theme {
    let layout = shell::layout();
    Theme::new(layout.define(home))
        .with_template(LAYOUT, layout)
        .with_template(MENU, Template::new(|page, _| shell::render_menu(page, anchor)))
        .with_template(SECTION, Template::new(|page, _| section(page)))
        .with_template(STYLES, shell::styles())
}

fn anchor(section: &Page<'_>) -> Result<String, BuildError> {
    Ok(format!("#{}", section.id().unwrap_or_default()))
}

/// The first `#` heading is the page header and is not repeated; later
/// top-level headings stay in place. A top-level section below `#` is
/// rendered like any second-level section.
fn home(page: &Page<'_>) -> Result<String, BuildError> {
    let mut html = String::new();
    let mut header_seen = false;
    for node in page.nodes() {
        if !node.is_section() {
            html.push_str(node.to_html());
            continue;
        }
        if node.level() != Some(1) {
            html.push_str(&node.render(SECTION)?);
            continue;
        }
        if header_seen {
            html.push_str(node.title_html()?);
        }
        header_seen = true;
        for child in node.nodes() {
            if child.is_section() {
                html.push_str(&child.render(SECTION)?);
            } else {
                html.push_str(child.to_html());
            }
        }
    }
    Ok(html)
}

fn section(page: &Page<'_>) -> Result<String, BuildError> {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<section id=\"{}\" class=\"section\">",
        escape_html(page.id().unwrap_or_default())
    );
    let _ = writeln!(html, "<h2>{}</h2>", page.title()?);

    for node in page.nodes() {
        if node.is_section() {
            let _ = writeln!(
                html,
                "<article id=\"{}\" class=\"subsection\">",
                escape_html(node.id().unwrap_or_default())
            );
            let _ = writeln!(html, "<h3>{}</h3>", node.title()?);
            for child in node.nodes() {
                html.push_str(child.to_html());
            }
            html.push_str("</article>\n");
        } else {
            html.push_str(node.to_html());
        }
    }

    html.push_str("</section>\n");
    Ok(html)
}
