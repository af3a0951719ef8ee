//! Filesystem writer for built pages.
//!
//! Page paths are root-relative: `""` is the home page and every other path
//! starts with `/`. A path without an extension becomes a directory holding
//! `index.html`; a path with an extension (a stylesheet) is written as is:
//!
//! ```text
//! ""              -> {output_dir}/index.html
//! "/guide/setup"  -> {output_dir}/guide/setup/index.html
//! "/styles.css"   -> {output_dir}/styles.css
//! ```
//!
//! Existing files are left alone unless overwriting is enabled.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Error writing pages.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Page path escapes the output directory or is not root-relative.
    #[error("Invalid page path: '{0}'")]
    InvalidPath(String),
    /// I/O error on a specific file or directory.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome for one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteEntry {
    /// Logical page path.
    pub path: String,
    /// File the page maps to.
    pub target: PathBuf,
    /// Whether the file was written (false when an existing file was kept).
    pub written: bool,
}

/// Per-page outcome of [`Writer::write`], in page order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    entries: Vec<WriteEntry>,
}

impl WriteReport {
    #[must_use]
    pub fn entries(&self) -> &[WriteEntry] {
        &self.entries
    }

    /// Files that were written.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|entry| entry.written)
            .map(|entry| entry.target.as_path())
    }

    /// Files that already existed and were kept.
    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|entry| !entry.written)
            .map(|entry| entry.target.as_path())
    }
}

/// Writes pages under an output directory.
#[derive(Clone, Debug)]
pub struct Writer {
    output_dir: PathBuf,
    overwrite: bool,
}

impl Writer {
    /// Create a writer that keeps existing files.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
        }
    }

    /// Replace existing files instead of keeping them.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File a page path maps to.
    ///
    /// # Errors
    ///
    /// Returns `WriteError::InvalidPath` if the path contains `..` or would
    /// otherwise leave the output directory.
    pub fn target_path(&self, path: &str) -> Result<PathBuf, WriteError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut target = self.output_dir.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(WriteError::InvalidPath(path.to_owned()));
                }
            }
        }

        if relative.extension().is_none() {
            target.push("index.html");
        }
        Ok(target)
    }

    /// Write pages, creating directories as needed.
    ///
    /// Every path is resolved before the first file is touched, so an invalid
    /// path leaves the output directory unchanged.
    ///
    /// # Errors
    ///
    /// Returns `WriteError::InvalidPath` for the first path that cannot be
    /// mapped into the output directory, or the first I/O failure.
    pub fn write<'a, I>(&self, pages: I) -> Result<WriteReport, WriteError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let resolved = pages
            .into_iter()
            .map(|(path, content)| Ok((path, self.target_path(path)?, content)))
            .collect::<Result<Vec<_>, WriteError>>()?;

        let mut report = WriteReport::default();
        for (path, target, content) in resolved {
            let written = self.write_page(&target, content)?;
            report.entries.push(WriteEntry {
                path: path.to_owned(),
                target,
                written,
            });
        }
        Ok(report)
    }

    fn write_page(&self, target: &Path, content: &str) -> Result<bool, WriteError> {
        if !self.overwrite && target.exists() {
            tracing::debug!(path = %target.display(), "Keeping existing file");
            return Ok(false);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(target, content).map_err(|source| WriteError::Io {
            path: target.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %target.display(), bytes = content.len(), "Wrote file");
        Ok(true)
    }
}
