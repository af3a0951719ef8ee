//! Progress reporting on stderr.

use std::path::Path;

use console::{Style, Term};

/// Styled progress lines for the build command.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// A pipeline step, e.g. "Parsing markdown...".
    pub(crate) fn step(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// One output file, indented under the step that produced it.
    pub(crate) fn file(&self, action: &str, path: &Path) {
        let line = format!("  {action} {}", self.dim.apply_to(path.display()));
        let _ = self.term.write_line(&line);
    }

    /// A file that was left as it was.
    pub(crate) fn kept(&self, path: &Path) {
        let line = format!("  {}", self.yellow.apply_to(format!("Kept {}", path.display())));
        let _ = self.term.write_line(&line);
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
