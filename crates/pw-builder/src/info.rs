/// Static site metadata shared read-only with every template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Info {
    /// Project name, shown in the page header and menus.
    pub name: String,
    /// One-line summary.
    pub summary: String,
    /// Longer description, shown as the tagline.
    pub description: String,
    /// Source repository link.
    pub repo_url: Option<String>,
}

impl Info {
    /// Create metadata with the given name and default summary/description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_repo_url(mut self, repo_url: impl Into<String>) -> Self {
        self.repo_url = Some(repo_url.into());
        self
    }
}

impl Default for Info {
    fn default() -> Self {
        Self {
            name: "Documentation".to_owned(),
            summary: "Project docs".to_owned(),
            description: "Project docs".to_owned(),
            repo_url: None,
        }
    }
}
