//! Configuration management for Pagewright.
//!
//! Parses `pagewright.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in `[site]` support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;
mod manifest;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use pw_builder::{Info, themes};

pub use manifest::PackageMetadata;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the markdown source file.
    pub readme: Option<PathBuf>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the theme name.
    pub theme: Option<String>,
    /// Override the overwrite flag.
    pub overwrite: Option<bool>,
    /// Override the GFM flag.
    pub gfm: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagewright.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site metadata overrides.
    pub site: SiteConfig,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site metadata. Unset fields fall back to the package manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    readme: Option<String>,
    output_dir: Option<String>,
    overwrite: Option<bool>,
    theme: Option<String>,
    gfm: Option<bool>,
    manifest: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug)]
pub struct BuildConfig {
    /// Markdown source file.
    pub readme: PathBuf,
    /// Directory pages are written to.
    pub output_dir: PathBuf,
    /// Whether existing files are replaced.
    pub overwrite: bool,
    /// Built-in theme name.
    pub theme: String,
    /// Whether GitHub Flavored Markdown is enabled.
    pub gfm: bool,
    /// Package manifest used for site metadata.
    pub manifest: PathBuf,
}

impl BuildConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            readme: base.join("README.md"),
            output_dir: base.join("docs"),
            overwrite: false,
            theme: themes::DEFAULT_THEME.to_owned(),
            gfm: true,
            manifest: base.join("Cargo.toml"),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.repo_url`").
        field: String,
        /// Error message (e.g., "${`REPO_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagewright.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated after the overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(readme) = &settings.readme {
            self.build_resolved.readme.clone_from(readme);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(theme) = &settings.theme {
            self.build_resolved.theme.clone_from(theme);
        }
        if let Some(overwrite) = settings.overwrite {
            self.build_resolved.overwrite = overwrite;
        }
        if let Some(gfm) = settings.gfm {
            self.build_resolved.gfm = gfm;
        }
    }

    /// Resolve site metadata.
    ///
    /// Each field comes from `[site]` first, then from the package manifest,
    /// then from the defaults of [`Info`].
    ///
    /// # Errors
    ///
    /// Returns error if the manifest exists but cannot be read or parsed.
    pub fn resolve_info(&self) -> Result<Info, ConfigError> {
        let package = PackageMetadata::load(&self.build_resolved.manifest)?.unwrap_or_default();
        Ok(self.merge_info(&package))
    }

    fn merge_info(&self, package: &PackageMetadata) -> Info {
        let defaults = Info::default();
        let site = &self.site;
        Info {
            name: site
                .name
                .clone()
                .or_else(|| package.name.clone())
                .unwrap_or(defaults.name),
            summary: site
                .summary
                .clone()
                .or_else(|| package.description.clone())
                .unwrap_or(defaults.summary),
            description: site
                .description
                .clone()
                .or_else(|| package.description.clone())
                .unwrap_or(defaults.description),
            repo_url: site
                .repo_url
                .clone()
                .or_else(|| package.repo_url().map(str::to_owned)),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            build: BuildConfigRaw::default(),
            build_resolved: BuildConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        if let Some(ref repo_url) = self.site.repo_url {
            require_non_empty(repo_url, "site.repo_url")?;
            require_http_url(repo_url, "site.repo_url")?;
        }
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        let build = &self.build_resolved;
        require_non_empty(&build.readme.to_string_lossy(), "build.readme")?;
        require_non_empty(&build.output_dir.to_string_lossy(), "build.output_dir")?;

        if !themes::NAMES.contains(&build.theme.as_str()) {
            return Err(ConfigError::Validation(format!(
                "build.theme must be one of {}, got '{}'",
                themes::NAMES.join(", "),
                build.theme
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in `[site]` strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let site = &mut self.site;
        for (value, field) in [
            (&mut site.name, "site.name"),
            (&mut site.summary, "site.summary"),
            (&mut site.description, "site.description"),
            (&mut site.repo_url, "site.repo_url"),
        ] {
            if let Some(raw) = value.as_deref() {
                *value = Some(expand::expand_env(raw, field)?);
            }
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.build_resolved = BuildConfig {
            readme: resolve(self.build.readme.as_deref(), "README.md"),
            output_dir: resolve(self.build.output_dir.as_deref(), "docs"),
            overwrite: self.build.overwrite.unwrap_or(false),
            theme: self
                .build
                .theme
                .clone()
                .unwrap_or_else(|| themes::DEFAULT_THEME.to_owned()),
            gfm: self.build.gfm.unwrap_or(true),
            manifest: resolve(self.build.manifest.as_deref(), "Cargo.toml"),
        };
    }
}
