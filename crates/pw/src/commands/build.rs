//! Build command implementation.

use std::path::PathBuf;

use clap::Args;
use pw_builder::{SiteBuilder, themes};
use pw_config::{CliSettings, Config};
use pw_tree::{CmarkConverter, Document};
use pw_writer::Writer;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover pagewright.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown file to build the site from (overrides config).
    #[arg(short, long)]
    readme: Option<PathBuf>,

    /// Directory to write the site to (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Built-in theme: single-page or multi-page (overrides config).
    #[arg(short, long)]
    theme: Option<String>,

    /// Replace files that already exist in the output directory.
    #[arg(long)]
    overwrite: bool,

    /// Parse plain `CommonMark` instead of GitHub Flavored Markdown.
    #[arg(long)]
    no_gfm: bool,

    /// Show the files that would be written without writing them.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the markdown file cannot
    /// be read, rendering fails or pages cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            readme: self.readme.clone(),
            output_dir: self.output_dir.clone(),
            theme: self.theme.clone(),
            overwrite: self.overwrite.then_some(true),
            gfm: self.no_gfm.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }
        let build = &config.build_resolved;

        let theme = themes::by_name(&build.theme)
            .ok_or_else(|| CliError::Validation(format!("Unknown theme: {}", build.theme)))?;
        let info = config.resolve_info()?;

        output.step(&format!("Reading {}...", build.readme.display()));
        let markdown = std::fs::read_to_string(&build.readme).map_err(|source| CliError::Read {
            path: build.readme.clone(),
            source,
        })?;

        output.step("Parsing markdown...");
        let document = Document::parse_with(&markdown, CmarkConverter::new().with_gfm(build.gfm));
        tracing::info!(nodes = document.node_count(), gfm = build.gfm, "Parsed document");

        output.step(&format!("Rendering with {} theme...", build.theme));
        let site = SiteBuilder::new(document, info);
        let pages = site.visit(&theme)?;

        let writer = Writer::new(build.output_dir.clone()).with_overwrite(build.overwrite);

        if self.dry_run {
            output.step("Dry run, nothing written:");
            for (path, _) in &pages {
                output.file("Would write", &writer.target_path(path)?);
            }
            return Ok(());
        }

        let report = writer.write(&pages)?;
        for target in report.written() {
            output.file("Wrote file", target);
        }

        let skipped = report.skipped().count();
        if skipped > 0 {
            for target in report.skipped() {
                output.kept(target);
            }
            output.warning(&format!(
                "{skipped} file(s) already existed, use --overwrite to replace them"
            ));
        }

        output.success(&format!(
            "Built {} page(s) into {}",
            pages.len(),
            build.output_dir.display()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const README: &str = "# Widget\n\nIntro.\n\n# Guide\n\n## Install\n\nRun it.\n\n## Usage\n\nUse it.\n";

    fn project(config: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pagewright.toml"), config).unwrap();
        fs::write(dir.path().join("README.md"), README).unwrap();
        dir
    }

    fn args(dir: &Path) -> BuildArgs {
        BuildArgs {
            config: Some(dir.join("pagewright.toml")),
            readme: None,
            output_dir: None,
            theme: None,
            overwrite: false,
            no_gfm: false,
            dry_run: false,
            verbose: false,
        }
    }

    #[test]
    fn test_build_single_page() {
        let dir = project("[site]\nname = \"Widget\"\n");
        args(dir.path()).execute().unwrap();

        let index = fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
        assert!(index.contains("<title>Widget - Project docs</title>"));
        assert!(index.contains("<a href=\"#install\">Install</a>"));
        assert!(dir.path().join("docs/styles.css").exists());
        assert!(!dir.path().join("docs/guide").exists());
    }

    #[test]
    fn test_build_multi_page() {
        let dir = project("[build]\ntheme = \"multi-page\"\noutput_dir = \"site\"\n");
        args(dir.path()).execute().unwrap();

        let site = dir.path().join("site");
        assert!(site.join("index.html").exists());
        assert!(site.join("styles.css").exists());
        let usage = fs::read_to_string(site.join("guide/usage/index.html")).unwrap();
        assert!(usage.contains("Use it."));
    }

    #[test]
    fn test_build_keeps_existing_files_without_overwrite() {
        let dir = project("");
        let index = dir.path().join("docs/index.html");
        fs::create_dir_all(index.parent().unwrap()).unwrap();
        fs::write(&index, "hand-written").unwrap();

        args(dir.path()).execute().unwrap();
        assert_eq!(fs::read_to_string(&index).unwrap(), "hand-written");
        assert!(dir.path().join("docs/styles.css").exists());

        let mut args = args(dir.path());
        args.overwrite = true;
        args.execute().unwrap();
        assert!(fs::read_to_string(&index).unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = project("[build]\noutput_dir = \"site\"\n");
        let mut args = args(dir.path());
        args.output_dir = Some(dir.path().join("out"));
        args.theme = Some("multi-page".to_owned());
        args.execute().unwrap();

        assert!(dir.path().join("out/guide/install/index.html").exists());
        assert!(!dir.path().join("site").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = project("");
        let mut args = args(dir.path());
        args.dry_run = true;
        args.execute().unwrap();
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn test_missing_readme() {
        let dir = project("[build]\nreadme = \"MISSING.md\"\n");
        let err = args(dir.path()).execute().unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().contains("MISSING.md"));
    }

    #[test]
    fn test_unknown_theme_rejected() {
        let dir = project("");
        let mut args = args(dir.path());
        args.theme = Some("fancy".to_owned());
        assert!(matches!(args.execute(), Err(CliError::Config(_))));
    }
}
