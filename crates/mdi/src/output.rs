//! Terminal reporting for mdi commands.
//!
//! Converted markup and block listings go to stdout; everything here goes to
//! stderr so it never mixes with piped output.

use std::error::Error;
use std::fmt::Write;
use std::path::Path;

use console::{Style, Term};

/// Status reporter on stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Report converted markup written to `path` (green).
    pub(crate) fn wrote(&self, path: &Path, bytes: usize) {
        let msg = format!("Wrote {bytes} bytes to {}", path.display());
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Report a failed command with its causes (red).
    pub(crate) fn failure(&self, err: &dyn Error) {
        let _ = self
            .term
            .write_line(&self.red.apply_to(error_report(err)).to_string());
    }

    /// Header above the block listing (cyan bold).
    pub(crate) fn block_header(&self, block_types: usize) {
        let msg = format!("{block_types} block node types");
        let _ = self.term.write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Footer below the block listing (dim).
    pub(crate) fn block_footer(&self, extensions: usize) {
        let msg = format!("{extensions} extensions registered");
        let _ = self.term.write_line(&self.dim.apply_to(msg).to_string());
    }
}

/// `err` followed by each cause its message does not already include.
fn error_report(err: &dyn Error) -> String {
    let mut report = format!("Error: {err}");
    let mut previous = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !previous.contains(&text) {
            write!(report, "\n  caused by: {text}").unwrap();
        }
        previous = text;
        source = cause.source();
    }
    report
}
