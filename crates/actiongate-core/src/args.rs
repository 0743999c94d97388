//! Argument merging for invoked actions.
//!
//! An action's configured default arguments come first, followed by every
//! query-string value of the request in arrival order.

use crate::error::{ActionError, Result};

/// Default args from configuration plus per-request extras.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationArgs {
    defaults: String,
    extra: Vec<String>,
}

impl InvocationArgs {
    pub fn new(defaults: impl Into<String>, extra: Vec<String>) -> Self {
        Self {
            defaults: defaults.into(),
            extra,
        }
    }

    /// Build from raw `(key, value)` query pairs; only the values are kept.
    pub fn from_query(defaults: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self::new(defaults, query.into_iter().map(|(_, v)| v).collect())
    }

    /// Defaults then extras, single-space joined and trimmed.
    pub fn joined(&self) -> String {
        let mut parts = Vec::with_capacity(self.extra.len() + 1);
        parts.push(self.defaults.as_str());
        parts.extend(self.extra.iter().map(String::as_str));
        parts.join(" ").trim().to_string()
    }

    /// Argument vector for direct execution.
    ///
    /// Defaults are split with POSIX shell word rules; each extra is one
    /// argument no matter what it contains.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = shlex::split(&self.defaults)
            .unwrap_or_else(|| self.defaults.split_whitespace().map(str::to_string).collect());
        argv.extend(self.extra.iter().cloned());
        argv
    }

    /// Text appended to a shell command line.
    ///
    /// Defaults are inserted verbatim; extras are quoted for the platform
    /// shell so each reaches the command as a single literal word. An extra
    /// the shell cannot carry (NUL bytes, or line breaks under `cmd`) fails
    /// the whole invocation.
    pub fn shell_suffix(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(self.extra.len() + 1);
        parts.push(self.defaults.clone());
        for value in &self.extra {
            let quoted = shell_quote(value)
                .ok_or_else(|| ActionError::UnquotableArgument(value.clone()))?;
            parts.push(quoted);
        }
        Ok(parts.join(" ").trim().to_string())
    }
}

#[cfg(not(windows))]
fn shell_quote(word: &str) -> Option<String> {
    quote_posix(word)
}

#[cfg(windows)]
fn shell_quote(word: &str) -> Option<String> {
    quote_cmd(word)
}

/// POSIX `sh` quoting.
pub fn quote_posix(word: &str) -> Option<String> {
    shlex::try_quote(word).ok().map(|q| q.into_owned())
}

/// Quoting for a word on a `cmd /C` line that the program then splits into
/// argv with the MSVC runtime rules.
///
/// The word is double-quoted. Embedded quotes become `""`, and `%` is
/// emitted outside the quotes as `^%` so `cmd` does not expand variables.
/// Backslashes that end up in front of a quote are doubled.
pub fn quote_cmd(word: &str) -> Option<String> {
    if word.contains(['\0', '\r', '\n']) {
        return None;
    }
    let plain = !word.is_empty()
        && !word
            .chars()
            .any(|c| c.is_whitespace() || "\"^&|<>()%!,;=".contains(c));
    if plain {
        return Some(word.to_string());
    }

    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');
    let mut backslashes = 0;
    for c in word.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                out.push(c);
                continue;
            }
            '"' => {
                out.push_str(&"\\".repeat(backslashes));
                out.push_str("\"\"");
            }
            '%' => {
                out.push_str(&"\\".repeat(backslashes));
                out.push_str("\"^%\"");
            }
            _ => out.push(c),
        }
        backslashes = 0;
    }
    out.push_str(&"\\".repeat(backslashes));
    out.push('"');
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_first_then_query_values_in_order() {
        let args = InvocationArgs::from_query("-a", query(&[("b", "2"), ("c", "3")]));
        assert_eq!(args.joined(), "-a 2 3");
    }

    #[test]
    fn empty_defaults_are_trimmed_away() {
        let args = InvocationArgs::from_query("", query(&[("x", "file.txt")]));
        assert_eq!(args.joined(), "file.txt");
        assert_eq!(InvocationArgs::default().joined(), "");
    }

    #[test]
    fn repeated_keys_keep_every_value() {
        let args = InvocationArgs::from_query("", query(&[("f", "1"), ("f", "2")]));
        assert_eq!(args.joined(), "1 2");
    }

    #[test]
    fn argv_splits_defaults_but_not_extras() {
        let args = InvocationArgs::new(r#"--title "two words""#, vec!["a b".into()]);
        assert_eq!(args.argv(), vec!["--title", "two words", "a b"]);
    }

    #[test]
    fn argv_falls_back_on_unbalanced_quotes() {
        let args = InvocationArgs::new(r#"--name "oops"#, vec![]);
        assert_eq!(args.argv(), vec!["--name", "\"oops"]);
    }

    #[cfg(unix)]
    #[test]
    fn shell_suffix_quotes_only_extras() {
        let args = InvocationArgs::new("| tr a-z A-Z", vec!["hi; rm -rf /".into()]);
        assert_eq!(args.shell_suffix().unwrap(), "| tr a-z A-Z 'hi; rm -rf /'");
    }

    #[cfg(windows)]
    #[test]
    fn shell_suffix_uses_cmd_quoting() {
        let args = InvocationArgs::new("/b", vec!["a b".into(), "50%".into()]);
        assert_eq!(args.shell_suffix().unwrap(), r#"/b "a b" "50"^%"""#);
    }

    #[test]
    fn shell_suffix_leaves_plain_words_alone() {
        let args = InvocationArgs::new("hi", vec!["there".into()]);
        assert_eq!(args.shell_suffix().unwrap(), "hi there");
    }

    #[test]
    fn shell_suffix_rejects_nul_instead_of_dropping_it() {
        let args = InvocationArgs::new("hi", vec!["ok".into(), "bad\0value".into()]);
        match args.shell_suffix().unwrap_err() {
            ActionError::UnquotableArgument(v) => assert_eq!(v, "bad\0value"),
            other => panic!("expected unquotable argument, got {other:?}"),
        }
    }

    #[test]
    fn cmd_quoting_wraps_spaces_and_doubles_quotes() {
        assert_eq!(quote_cmd("plain").as_deref(), Some("plain"));
        assert_eq!(quote_cmd("a b").as_deref(), Some(r#""a b""#));
        assert_eq!(quote_cmd(r#"say "hi""#).as_deref(), Some(r#""say ""hi""""#));
        assert_eq!(quote_cmd("").as_deref(), Some(r#""""#));
    }

    #[test]
    fn cmd_quoting_keeps_metacharacters_inside_quotes() {
        assert_eq!(quote_cmd("a & del x").as_deref(), Some(r#""a & del x""#));
        assert_eq!(quote_cmd("%PATH%").as_deref(), Some(r#"""^%"PATH"^%"""#));
    }

    #[test]
    fn cmd_quoting_doubles_backslashes_before_quotes() {
        assert_eq!(quote_cmd(r"C:\dir\").as_deref(), Some(r#""C:\dir\\""#));
        assert_eq!(quote_cmd(r"C:\my dir").as_deref(), Some(r#""C:\my dir""#));
    }

    #[test]
    fn line_breaks_and_nul_cannot_be_quoted() {
        assert_eq!(quote_cmd("a\r\nexit"), None);
        assert_eq!(quote_posix("a\0b"), None);
    }
}
