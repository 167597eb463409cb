//! Display quoting for logged command lines
//!
//! The quoted text is only ever shown to humans; processes are always
//! launched with the raw argument vector.

use std::ffi::OsStr;

/// Shell quoting convention used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `sh`-like: double quotes, backslash escapes
    Posix,
    /// `cmd.exe`-like: double quotes, caret escapes
    Windows,
}

impl QuoteStyle {
    /// Convention of the platform we are running on
    pub fn native() -> Self {
        if cfg!(windows) {
            QuoteStyle::Windows
        } else {
            QuoteStyle::Posix
        }
    }

    fn needs_quotes(&self, c: char) -> bool {
        match self {
            QuoteStyle::Posix => matches!(c, ' ' | '<' | '>' | '|' | '?' | '*' | '(' | ')' | '&'),
            QuoteStyle::Windows => matches!(
                c,
                ' ' | '/' | '^' | '|' | '<' | '>' | '&' | '?' | '*' | '(' | ')' | '%' | '"' | '\'' | '!'
            ),
        }
    }

    fn needs_escape(&self, c: char) -> bool {
        match self {
            QuoteStyle::Posix => matches!(c, '\\' | '\'' | '"'),
            QuoteStyle::Windows => matches!(c, '^' | '"' | '%'),
        }
    }

    fn escape_char(&self) -> char {
        match self {
            QuoteStyle::Posix => '\\',
            QuoteStyle::Windows => '^',
        }
    }

    /// Quote a single argument
    pub fn quote(&self, arg: &str) -> String {
        let quoted = arg.chars().any(|c| self.needs_quotes(c));
        let mut out = String::with_capacity(arg.len() + 2);
        if quoted {
            out.push('"');
        }
        for c in arg.chars() {
            if self.needs_escape(c) {
                out.push(self.escape_char());
            }
            out.push(c);
        }
        if quoted {
            out.push('"');
        }
        out
    }
}

/// Render an argument vector as one display string using `style`
pub fn format_argv_with<I, S>(style: QuoteStyle, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .map(|arg| style.quote(&arg.as_ref().to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render an argument vector as one display string for this platform
pub fn format_argv<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    format_argv_with(QuoteStyle::native(), args)
}
