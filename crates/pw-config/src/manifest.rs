//! Package metadata read from a Cargo manifest.
//!
//! Only literal string fields of `[package]` are used. Fields inherited from
//! the workspace (`description.workspace = true`) are tables and are ignored.

use std::path::Path;

use crate::ConfigError;

/// Subset of `[package]` used to describe the site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub homepage: Option<String>,
}

impl PackageMetadata {
    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the text is not valid TOML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let manifest: toml::Table = toml::from_str(content)?;
        let Some(package) = manifest.get("package").and_then(toml::Value::as_table) else {
            return Ok(Self::default());
        };

        let field = |name: &str| {
            package
                .get(name)
                .and_then(toml::Value::as_str)
                .map(str::to_owned)
        };

        Ok(Self {
            name: field("name"),
            description: field("description"),
            repository: field("repository"),
            homepage: field("homepage"),
        })
    }

    /// Load metadata from a manifest file.
    ///
    /// Returns `None` (and logs a warning) when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "No package manifest found, using default site info");
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map(Some)
    }

    /// Repository link, falling back to the homepage.
    #[must_use]
    pub fn repo_url(&self) -> Option<&str> {
        self.repository.as_deref().or(self.homepage.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_package_fields() {
        let metadata = PackageMetadata::parse(
            r#"
[package]
name = "pagewright"
version = "0.1.0"
description = "Static sites from a README"
repository = "https://github.com/example/pagewright"
homepage = "https://pagewright.example.com"
"#,
        )
        .unwrap();

        assert_eq!(metadata.name.as_deref(), Some("pagewright"));
        assert_eq!(metadata.description.as_deref(), Some("Static sites from a README"));
        assert_eq!(metadata.repo_url(), Some("https://github.com/example/pagewright"));
    }

    #[test]
    fn test_homepage_fallback() {
        let metadata = PackageMetadata::parse(
            r#"
[package]
name = "pagewright"
homepage = "https://pagewright.example.com"
"#,
        )
        .unwrap();
        assert_eq!(metadata.repo_url(), Some("https://pagewright.example.com"));
    }

    #[test]
    fn test_workspace_inherited_fields_ignored() {
        let metadata = PackageMetadata::parse(
            r#"
[package]
name = "pagewright"
description.workspace = true
repository = { workspace = true }
"#,
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("pagewright"));
        assert_eq!(metadata.description, None);
        assert_eq!(metadata.repo_url(), None);
    }

    #[test]
    fn test_virtual_manifest_has_no_package() {
        let metadata = PackageMetadata::parse("[workspace]\nmembers = [\"crates/*\"]\n").unwrap();
        assert_eq!(metadata, PackageMetadata::default());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = PackageMetadata::parse("[package\nname = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let result = PackageMetadata::load(&temp_dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_load_manifest_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Cargo.toml");
        std::fs::write(&path, "[package]\nname = \"demo\"\n").unwrap();

        let metadata = PackageMetadata::load(&path).unwrap().unwrap();
        assert_eq!(metadata.name.as_deref(), Some("demo"));
    }
}
