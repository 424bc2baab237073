//! Job option parsing
//!
//! Options are configured as a text block with one `key=value` pair per line,
//! in the same shape as a Java properties file. Values may reference build
//! values through `$NAME` or `${NAME}` placeholders.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("placeholder pattern is valid")
});

/// Named job parameters, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, String>);

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets an option, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Adds the options of `defaults` that are not already set
    pub fn merge_defaults(&mut self, defaults: &OptionSet) {
        for (name, value) in defaults.iter() {
            self.0
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    /// Builds the `argString` Rundeck expects: `-name value -other 'with spaces'`
    pub fn to_arg_string(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| {
                if value.chars().any(char::is_whitespace) {
                    format!("-{} '{}'", name, value)
                } else {
                    format!("-{} {}", name, value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<(String, String)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses an option block, substituting placeholders from `context`
///
/// Never fails: comment lines, lines without `=` and pairs with an empty
/// name or value are skipped. A name set twice keeps its last value.
pub fn parse_options(raw: Option<&str>, context: &BTreeMap<String, String>) -> OptionSet {
    let mut options = OptionSet::new();

    let Some(raw) = raw else {
        return options;
    };

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let Some((name, value)) = split_pair(trimmed) else {
            continue;
        };

        let name = unescape(name.trim());
        let value = unescape(value);
        if name.is_empty() || value.is_empty() {
            continue;
        }

        options.insert(name, substitute(&value, context));
    }

    options
}

/// Replaces known placeholders in `value` with their context value
///
/// Unknown placeholders stay as written. Substituted text is not scanned
/// again, so applying this twice gives the same result as applying it once.
pub fn substitute(value: &str, context: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(value, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match context.get(name) {
                Some(replacement) => replacement.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Splits a line at its first `=` that is not escaped
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return Some((&line[..idx], &line[idx + 1..])),
            _ => {}
        }
    }
    None
}

/// Undoes properties file escaping
///
/// Handles `\t`, `\n`, `\r`, `\f`, `\uXXXX` and a backslash before any other
/// character, which stands for that character (`\\`, `\=`, `\ `...). A
/// malformed `\u` sequence and a trailing backslash are kept as written.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let valid = hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit());
                match u32::from_str_radix(&hex, 16).ok().filter(|_| valid) {
                    Some(code) => {
                        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                        chars.nth(3);
                    }
                    None => out.push_str("\\u"),
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
