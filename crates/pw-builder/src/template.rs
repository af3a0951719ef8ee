//! Templates with named slots, and themes that register them by name.
//!
//! A [`Template`] is a base layout plus a set of slot renderers. Calling a
//! template renders every slot against the page first, then hands the slot
//! values to the layout. Deriving a template with [`Template::define`] or
//! [`Template::define_slots`] returns a new template sharing the same layout;
//! the original is never modified.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::builder::{BuildError, Page};

/// Layout renderer: page plus pre-rendered slot values.
pub type RenderFn = dyn Fn(&Page<'_>, &Slots) -> Result<String, BuildError> + Send + Sync;

/// Slot renderer: sees the page but no slot values.
pub type SlotFn = dyn Fn(&Page<'_>) -> Result<String, BuildError> + Send + Sync;

/// Slot name used by [`Template::define`].
pub const MAIN_SLOT: &str = "main";

/// `{{ name }}` placeholder in string layouts.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Rendered slot values passed to a layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slots {
    values: HashMap<String, String>,
}

impl Slots {
    /// Value of a slot, `None` when the template does not define it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a slot, or `default` when it is not defined.
    #[must_use]
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Collects named slot renderers for [`Template::define_slots`].
#[derive(Default)]
pub struct SlotsBuilder {
    slots: Vec<(String, Arc<SlotFn>)>,
}

impl SlotsBuilder {
    /// Define a slot rendered by `render`.
    pub fn slot<F>(&mut self, name: impl Into<String>, render: F) -> &mut Self
    where
        F: Fn(&Page<'_>) -> Result<String, BuildError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.slots.retain(|(existing, _)| *existing != name);
        self.slots.push((name, Arc::new(render)));
        self
    }

    /// Define a slot with static content.
    pub fn text(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        let content = content.into();
        self.slot(name, move |_| Ok(content.clone()))
    }
}

/// Reusable rendering unit: a layout and the slots it is specialized with.
#[derive(Clone)]
pub struct Template {
    layout: Arc<RenderFn>,
    slots: Vec<(String, Arc<SlotFn>)>,
}

impl Template {
    /// Create a template from a layout function.
    pub fn new<F>(layout: F) -> Self
    where
        F: Fn(&Page<'_>, &Slots) -> Result<String, BuildError> + Send + Sync + 'static,
    {
        Self {
            layout: Arc::new(layout),
            slots: Vec::new(),
        }
    }

    /// Create a template from a layout string with `{{ name }}` placeholders.
    ///
    /// Placeholders are replaced by slot values; undefined slots render empty.
    #[must_use]
    pub fn from_layout(layout: impl Into<String>) -> Self {
        let layout = layout.into();
        Self::new(move |_, slots| {
            let rendered = PLACEHOLDER_RE.replace_all(&layout, |caps: &Captures<'_>| {
                slots.get(&caps[1]).unwrap_or_default().to_owned()
            });
            Ok(rendered.into_owned())
        })
    }

    /// Create a template that always renders `content` (stylesheets, assets).
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(move |_, _| Ok(content.clone()))
    }

    /// Derive a template that fills the `main` slot.
    #[must_use]
    pub fn define<F>(&self, main: F) -> Self
    where
        F: Fn(&Page<'_>) -> Result<String, BuildError> + Send + Sync + 'static,
    {
        self.define_slots(|slots| {
            slots.slot(MAIN_SLOT, main);
        })
    }

    /// Derive a template that fills several named slots.
    #[must_use]
    pub fn define_slots(&self, define: impl FnOnce(&mut SlotsBuilder)) -> Self {
        let mut builder = SlotsBuilder::default();
        define(&mut builder);
        Self {
            layout: Arc::clone(&self.layout),
            slots: builder.slots,
        }
    }

    /// Names of the slots this template fills.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    /// Render the template for `page`.
    ///
    /// Slots are rendered first, without access to other slot values; the
    /// layout is then rendered with all of them.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a slot or the layout.
    pub fn call(&self, page: &Page<'_>) -> Result<String, BuildError> {
        let mut slots = Slots::default();
        for (name, render) in &self.slots {
            let value = render(page)?;
            slots.values.insert(name.clone(), value);
        }
        (self.layout)(page, &slots)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("slots", &self.slot_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A set of named templates with one designated entry template.
///
/// The entry template renders the document root. Templates find each other
/// by name through [`Page::build`] and [`Page::render`].
#[derive(Clone, Debug)]
pub struct Theme {
    entry: Template,
    templates: HashMap<String, Template>,
}

impl Theme {
    #[must_use]
    pub fn new(entry: Template) -> Self {
        Self {
            entry,
            templates: HashMap::new(),
        }
    }

    /// Register a named template, replacing any previous one with that name.
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, template: Template) -> Self {
        self.templates.insert(name.into(), template);
        self
    }

    #[must_use]
    pub fn entry(&self) -> &Template {
        &self.entry
    }

    /// Look up a registered template.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownTemplate` if no template has that name.
    pub fn template(&self, name: &str) -> Result<&Template, BuildError> {
        self.templates
            .get(name)
            .ok_or_else(|| BuildError::UnknownTemplate(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pw_tree::Document;

    use super::*;
    use crate::{Info, SiteBuilder};

    fn render_home(markdown: &str, entry: Template) -> String {
        let site = SiteBuilder::new(Document::parse(markdown), Info::default());
        let pages = site.visit(&Theme::new(entry)).unwrap();
        pages.get("").unwrap_or_default().to_owned()
    }

    fn layout() -> Template {
        Template::new(|_, slots| {
            Ok(format!(
                "<title>{}</title><main>{}</main>",
                slots.get_or("doc_title", "Home"),
                slots.get_or(MAIN_SLOT, "")
            ))
        })
    }

    #[test]
    fn test_layout_without_slots_uses_defaults() {
        assert_eq!(
            render_home("text", layout()),
            "<title>Home</title><main></main>"
        );
    }

    #[test]
    fn test_define_fills_main_slot() {
        let home = layout().define(|page| Ok(page.root().to_html().trim().to_owned()));
        assert_eq!(
            render_home("text", home),
            "<title>Home</title><main><p>text</p></main>"
        );
    }

    #[test]
    fn test_define_slots_fills_named_slots() {
        let page = layout().define_slots(|slots| {
            slots.text("doc_title", "Guide");
            slots.slot(MAIN_SLOT, |page| Ok(page.info().name.clone()));
        });
        assert_eq!(
            render_home("", page),
            "<title>Guide</title><main>Documentation</main>"
        );
    }

    #[test]
    fn test_derived_template_leaves_original_untouched() {
        let base = layout();
        let derived = base.define(|_| Ok("derived".to_owned()));
        assert_eq!(base.slot_names().count(), 0);
        assert_eq!(derived.slot_names().collect::<Vec<_>>(), vec![MAIN_SLOT]);
        assert_eq!(render_home("", base), "<title>Home</title><main></main>");
    }

    #[test]
    fn test_slots_render_before_layout() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let layout_order = Arc::clone(&order);
        let slot_order = Arc::clone(&order);

        let base = Template::new(move |_, slots| {
            layout_order.lock().unwrap().push("layout");
            Ok(slots.get_or(MAIN_SLOT, "").to_owned())
        });
        let home = base.define(move |_| {
            slot_order.lock().unwrap().push("main");
            Ok("body".to_owned())
        });

        assert_eq!(render_home("", home), "body");
        assert_eq!(*order.lock().unwrap(), vec!["main", "layout"]);
    }

    #[test]
    fn test_from_layout_substitutes_placeholders() {
        let home = Template::from_layout("<h1>{{ title }}</h1>{{main}}{{ missing }}")
            .define_slots(|slots| {
                slots.text("title", "Docs");
                slots.text(MAIN_SLOT, "<p>body</p>");
            });
        assert_eq!(render_home("", home), "<h1>Docs</h1><p>body</p>");
    }

    #[test]
    fn test_text_template() {
        assert_eq!(render_home("# Ignored", Template::text("body {}")), "body {}");
    }

    #[test]
    fn test_later_slot_definition_wins() {
        let home = layout().define_slots(|slots| {
            slots.text(MAIN_SLOT, "first").text(MAIN_SLOT, "second");
        });
        assert_eq!(
            render_home("", home),
            "<title>Home</title><main>second</main>"
        );
    }

    #[test]
    fn test_slots_get() {
        let mut slots = Slots::default();
        assert!(slots.is_empty());
        slots.values.insert("main".to_owned(), "x".to_owned());
        assert_eq!(slots.get("main"), Some("x"));
        assert_eq!(slots.get("other"), None);
        assert_eq!(slots.get_or("other", "fallback"), "fallback");
    }

    #[test]
    fn test_unknown_template() {
        let theme = Theme::new(Template::text(""));
        assert!(matches!(
            theme.template("missing"),
            Err(BuildError::UnknownTemplate(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_template_debug_lists_slots() {
        let template = layout().define(|_| Ok(String::new()));
        assert_eq!(
            format!("{template:?}"),
            "Template { slots: [\"main\"], .. }"
        );
    }
}
