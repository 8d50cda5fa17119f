//! Shell dialect resolution and argument quoting
//!
//! All shell-injection concerns live here: a [`ShellDialect`] knows how to
//! quote a single argument for its conventions and which launcher runs a
//! quoted command line. Both runners share this policy through
//! [`crate::exec::Executor`] configuration.

use std::borrow::Cow;

/// A shell dialect used for quoting arguments and launching command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellDialect {
    /// POSIX `sh` conventions (single-quote wrapping).
    Sh,
    /// Windows `cmd.exe` conventions (double-quote wrapping).
    Cmd,
}

impl ShellDialect {
    /// The dialect of the current platform, used when none is configured.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(windows) { Self::Cmd } else { Self::Sh }
    }

    /// Quote a single argument for this dialect.
    ///
    /// Arguments that need no quoting are returned unchanged; everything else
    /// is wrapped so the shell reproduces the original argument verbatim.
    #[must_use]
    pub fn quote(&self, arg: &str) -> String {
        match self {
            Self::Sh => shell_escape::unix::escape(Cow::Borrowed(arg)).into_owned(),
            Self::Cmd => shell_escape::windows::escape(Cow::Borrowed(arg)).into_owned(),
        }
    }

    /// The shell executable and its command-string flag for this dialect.
    pub(crate) fn launcher(&self) -> (&'static str, &'static str) {
        match self {
            Self::Sh => ("sh", "-c"),
            Self::Cmd => ("cmd", "/C"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_default() {
        let dialect = ShellDialect::platform_default();
        #[cfg(windows)]
        assert_eq!(dialect, ShellDialect::Cmd);
        #[cfg(not(windows))]
        assert_eq!(dialect, ShellDialect::Sh);
    }

    #[test]
    fn test_sh_quote_plain_word_unchanged() {
        assert_eq!(ShellDialect::Sh.quote("hello"), "hello");
        assert_eq!(ShellDialect::Sh.quote("--flag=value"), "--flag=value");
    }

    #[test]
    fn test_sh_quote_wraps_whitespace() {
        let quoted = ShellDialect::Sh.quote("hello world");
        assert_eq!(quoted, "'hello world'");
    }

    #[test]
    fn test_sh_quote_neutralizes_metacharacters() {
        for raw in ["$(whoami)", "`id`", "a;b", "a|b", "a&&b", "${HOME}"] {
            let quoted = ShellDialect::Sh.quote(raw);
            let parsed = shell_words::split(&quoted).expect("quoted arg must parse");
            assert_eq!(parsed, vec![raw.to_string()], "round-trip failed for {raw}");
        }
    }

    #[test]
    fn test_sh_quote_embedded_single_quote() {
        let quoted = ShellDialect::Sh.quote("it's");
        let parsed = shell_words::split(&quoted).expect("quoted arg must parse");
        assert_eq!(parsed, vec!["it's".to_string()]);
    }

    #[test]
    fn test_cmd_quote_wraps_whitespace() {
        let quoted = ShellDialect::Cmd.quote("hello world");
        assert!(quoted.starts_with('"') && quoted.ends_with('"'), "got {quoted}");
    }

    #[test]
    fn test_launcher_programs() {
        assert_eq!(ShellDialect::Sh.launcher(), ("sh", "-c"));
        assert_eq!(ShellDialect::Cmd.launcher(), ("cmd", "/C"));
    }
}
