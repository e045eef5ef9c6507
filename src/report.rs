//! Console messages, prefixed with the name of the running tool.

use std::{
    fmt::Display,
    io::{self, Write},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    tool: &'static str,
}

impl Reporter {
    pub fn new(tool: &'static str) -> Self {
        Self { tool }
    }

    /// Print a complete line.
    pub fn info(&self, message: impl Display) {
        println!("{}", self.line(message));
    }

    /// Start a line that [`finish`](Self::finish) completes.
    pub fn begin(&self, message: impl Display) {
        print!("{} ... ", self.line(message));
        let _ = io::stdout().flush();
    }

    pub fn finish(&self, message: impl Display) {
        println!("{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        eprintln!("{}", self.line(format_args!("WARNING: {}", message)));
    }

    pub fn error(&self, message: impl Display) {
        eprintln!("{}", self.line(format_args!("ERROR: {}", message)));
    }

    fn line(&self, message: impl Display) -> String {
        format!("{}: {}", self.tool, message)
    }
}

#[cfg(test)]
mod test {
    use super::Reporter;

    #[test]
    fn lines_are_prefixed_with_tool() {
        let reporter = Reporter::new("mask");
        assert_eq!("mask: Loading \"a.png\"", reporter.line("Loading \"a.png\""));
        assert_eq!(
            "export: ERROR: bad",
            Reporter::new("export").line(format_args!("ERROR: {}", "bad"))
        );
    }
}
