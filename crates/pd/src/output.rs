//! Terminal output utilities.
//!
//! Results go to stdout so they can be piped; messages go to stderr.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    data: Term,
    term: Term,
    green: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            data: Term::stdout(),
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Write a result to stdout.
    pub(crate) fn data(&self, text: &str) {
        let _ = self.data.write_line(text);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
