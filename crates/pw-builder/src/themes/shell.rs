//! Page shell shared by the built-in themes.

use std::fmt::Write;

use crate::builder::{BuildError, Page};
use crate::html::{escape_html, href};
use crate::template::{MAIN_SLOT, Slots, Template};

/// Path the stylesheet page is built at.
pub const STYLESHEET_PATH: &str = "/styles.css";

/// Template name of the stylesheet.
pub(super) const STYLES: &str = "styles";

/// Template name of the navigation menu each theme registers.
pub(super) const MENU: &str = "menu";

/// Template name of the bare shell.
pub(super) const LAYOUT: &str = "layout";

/// Slot holding the plain-text document title.
pub(super) const TITLE_SLOT: &str = "title";

const STYLESHEET: &str = include_str!("../../assets/default.css");

const HIGHLIGHT_CDN: &str = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0";

const GITHUB_ICON: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"20\" height=\"20\" \
     viewBox=\"0 0 24 24\" fill=\"currentColor\"><path d=\"M12 0c-6.626 0-12 5.373-12 12 0 \
     5.302 3.438 9.8 8.207 11.387.599.111.793-.261.793-.577v-2.234c-3.338.726-4.033-1.416-4.033-1.416\
     -.546-1.387-1.333-1.756-1.333-1.756-1.089-.745.083-.729.083-.729 1.205.084 1.839 1.237 1.839 \
     1.237 1.07 1.834 2.807 1.304 3.492.997.107-.775.418-1.305.762-1.604-2.665-.305-5.467-1.334\
     -5.467-5.931 0-1.311.469-2.381 1.236-3.221-.124-.303-.535-1.524.117-3.176 0 0 1.008-.322 \
     3.301 1.23.957-.266 1.983-.399 3.003-.404 1.02.005 2.047.138 3.006.404 2.291-1.552 3.297-1.23 \
     3.297-1.23.653 1.653.242 2.874.118 3.176.77.84 1.235 1.911 1.235 3.221 0 4.609-2.807 \
     5.624-5.479 5.921.43.372.823 1.102.823 2.222v3.293c0 .319.192.694.801.576 4.765-1.589 \
     8.199-6.086 8.199-11.386 0-6.627-5.373-12-12-12z\"/></svg>";

/// Highlights the menu entry of the section currently in view.
const ACTIVE_SECTION_SCRIPT: &str = r"<script>
const linkMap = new Map();
const navLinks = document.querySelectorAll('.nav-menu a');
navLinks.forEach(link => {
  const href = link.getAttribute('href');
  if (href && href.startsWith('#')) linkMap.set(href, link);
});
const observer = new IntersectionObserver(entries => {
  entries.forEach(entry => {
    if (!entry.isIntersecting) return;
    const id = entry.target.getAttribute('id');
    const active = linkMap.get(`#${id}`);
    if (!active) return;
    navLinks.forEach(link => link.classList.remove('active'));
    active.classList.add('active');
    if (history.replaceState) history.replaceState(null, null, `#${id}`);
  });
}, { root: null, rootMargin: '-20% 0px -60% 0px', threshold: 0 });
document.querySelectorAll('section[id], article[id]').forEach(s => observer.observe(s));
</script>
";

/// The bare shell; themes derive page templates from it with `define`.
pub(super) fn layout() -> Template {
    Template::new(render_layout)
}

pub(super) fn styles() -> Template {
    Template::text(STYLESHEET)
}

fn render_layout(page: &Page<'_>, slots: &Slots) -> Result<String, BuildError> {
    let stylesheet = page.root().build_at(STYLESHEET_PATH, STYLES)?;
    let menu = page.render(MENU)?;
    let info = page.info();
    let name = escape_html(&info.name);
    let description = escape_html(&info.description);

    let mut html = String::with_capacity(8192);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    match slots.get(TITLE_SLOT) {
        // Slot values are already HTML.
        Some(title) => {
            let _ = writeln!(html, "<title>{title} - {name}</title>");
        }
        None => {
            let _ = writeln!(
                html,
                "<title>{name} - {}</title>",
                escape_html(&info.summary)
            );
        }
    }
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape_html(&stylesheet));
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{HIGHLIGHT_CDN}/styles/atom-one-dark.min.css\">"
    );
    html.push_str("</head>\n<body>\n");

    // Top menu
    html.push_str("<nav class=\"top-menu\">\n<div class=\"top-menu-content\">\n");
    let _ = writeln!(
        html,
        "<a class=\"top-menu-brand\" href=\"/\"><span class=\"brand-name\">{name}</span>\
         <span class=\"brand-tagline\">{description}</span></a>"
    );
    if let Some(repo_url) = &info.repo_url {
        let _ = writeln!(
            html,
            "<a href=\"{}\" target=\"_blank\" class=\"github-link\" \
             aria-label=\"View source\">{GITHUB_ICON}<span>GitHub</span></a>",
            escape_html(repo_url)
        );
    }
    html.push_str("</div>\n</nav>\n");

    // Sidebar
    html.push_str("<div class=\"container\">\n<nav class=\"sidebar\">\n");
    let _ = writeln!(
        html,
        "<div class=\"logo\"><h2><a href=\"{}\">{name}</a></h2>\
         <p class=\"tagline\">{description}</p></div>",
        href(page.root().path())
    );
    html.push_str(&menu);
    html.push_str("</nav>\n");

    // Main column
    html.push_str("<main class=\"content\">\n<header class=\"page-header\">\n");
    let _ = writeln!(html, "<h1>{name}</h1>");
    let _ = writeln!(html, "<p class=\"subtitle\">{}</p>", escape_html(&info.summary));
    html.push_str("</header>\n");
    html.push_str(slots.get_or(MAIN_SLOT, ""));
    html.push_str("\n</main>\n</div>\n");

    let _ = writeln!(html, "<script src=\"{HIGHLIGHT_CDN}/highlight.min.js\"></script>");
    html.push_str("<script>hljs.highlightAll();</script>\n");
    html.push_str(ACTIVE_SECTION_SCRIPT);
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

/// Two-level navigation list over the sections below the top headings.
///
/// `link` turns a section into its link target.
pub(super) fn render_menu<F>(page: &Page<'_>, mut link: F) -> Result<String, BuildError>
where
    F: FnMut(&Page<'_>) -> Result<String, BuildError>,
{
    let mut html = String::from("<ul class=\"nav-menu\">\n");
    for top in page.root().sections() {
        for section in top.sections() {
            html.push_str("<li>\n");
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&link(&section)?),
                section.title()?
            );

            let mut subsections = section.sections().peekable();
            if subsections.peek().is_some() {
                html.push_str("<ul>\n");
                for subsection in subsections {
                    let _ = writeln!(
                        html,
                        "<li class=\"nav-submenu\"><a href=\"{}\">{}</a></li>",
                        escape_html(&link(&subsection)?),
                        subsection.title()?
                    );
                }
                html.push_str("</ul>\n");
            }
            html.push_str("</li>\n");
        }
    }
    html.push_str("</ul>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use pw_tree::Document;

    use super::*;
    use crate::{Info, SiteBuilder, Theme};

    fn anchor(section: &Page<'_>) -> Result<String, BuildError> {
        Ok(format!("#{}", section.id().unwrap_or_default()))
    }

    fn theme(home: Template) -> Theme {
        Theme::new(home)
            .with_template(STYLES, styles())
            .with_template(MENU, Template::new(|page, _| render_menu(page, anchor)))
    }

    #[test]
    fn test_layout_builds_stylesheet() {
        let site = SiteBuilder::new(Document::parse("# T"), Info::default());
        let pages = site.visit(&theme(layout())).unwrap();
        assert_eq!(pages.paths().collect::<Vec<_>>(), vec!["", STYLESHEET_PATH]);
        assert_eq!(pages.get(STYLESHEET_PATH), Some(STYLESHEET));
        assert!(
            pages
                .get("")
                .unwrap()
                .contains("<link rel=\"stylesheet\" href=\"/styles.css\">")
        );
    }

    #[test]
    fn test_layout_shows_info_escaped() {
        let info = Info::new("A & B").with_summary("Docs <fast>");
        let site = SiteBuilder::new(Document::parse(""), info);
        let pages = site.visit(&theme(layout())).unwrap();
        let home = pages.get("").unwrap();
        assert!(home.contains("<title>A &amp; B - Docs &lt;fast&gt;</title>"));
        assert!(home.contains("<h1>A &amp; B</h1>"));
        assert!(!home.contains("github-link"));
    }

    #[test]
    fn test_layout_links_repository() {
        let info = Info::default().with_repo_url("https://example.com/repo");
        let site = SiteBuilder::new(Document::parse(""), info);
        let pages = site.visit(&theme(layout())).unwrap();
        assert!(pages.get("").unwrap().contains("href=\"https://example.com/repo\""));
    }

    #[test]
    fn test_title_slot_overrides_summary() {
        let home = layout().define_slots(|slots| {
            slots.text(TITLE_SLOT, "Setup");
        });
        let site = SiteBuilder::new(Document::parse(""), Info::default());
        let pages = site.visit(&theme(home)).unwrap();
        assert!(pages.get("").unwrap().contains("<title>Setup - Documentation</title>"));
    }

    #[test]
    fn test_menu_lists_second_and_third_levels() {
        let site = SiteBuilder::new(
            Document::parse("# Top\n## One\n### One A\n#### Deep\n## Two"),
            Info::default(),
        );
        let pages = site.visit(&theme(layout())).unwrap();
        let home = pages.get("").unwrap();
        assert!(home.contains("<a href=\"#one\">One</a>"));
        assert!(home.contains("<li class=\"nav-submenu\"><a href=\"#one-a\">One A</a></li>"));
        assert!(home.contains("<a href=\"#two\">Two</a>"));
        assert!(!home.contains("#deep"));
        assert!(!home.contains("href=\"#top\""));
    }
}
