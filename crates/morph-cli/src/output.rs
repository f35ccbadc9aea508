//! Colored diagnostics for CLI commands.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer over stdout and stderr.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn spec(color: Option<Color>, bold: bool) -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        spec
    }

    /// Write a line to stdout with a specific color and style.
    pub fn writeln_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let _ = self.stdout.set_color(&Self::spec(color, bold));
        let _ = writeln!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Bold heading line.
    pub fn heading(&mut self, text: &str) {
        self.writeln_styled(text, None, true);
    }

    /// Cyan label followed by a plain value.
    pub fn field(&mut self, label: &str, value: &str) {
        let _ = self.stdout.set_color(&Self::spec(Some(Color::Cyan), false));
        let _ = write!(self.stdout, "{:<11}", label);
        let _ = self.stdout.reset();
        let _ = writeln!(self.stdout, "{}", value);
    }

    /// Plain line on stdout.
    pub fn plain(&mut self, text: &str) {
        let _ = writeln!(self.stdout, "{}", text);
    }

    /// `error: <message>` on stderr.
    pub fn error(&mut self, message: &str) {
        self.diagnostic("error", Color::Red, message);
    }

    /// `warning: <message>` on stderr.
    pub fn warning(&mut self, message: &str) {
        self.diagnostic("warning", Color::Yellow, message);
    }

    fn diagnostic(&mut self, label: &str, color: Color, message: &str) {
        let _ = self.stdout.flush();
        let _ = self.stderr.set_color(&Self::spec(Some(color), true));
        let _ = write!(self.stderr, "{}", label);
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", message);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
        let _ = self.stderr.flush();
    }
}
