//! Flat key/value properties parsing for the credentials file.
//!
//! # Format
//! ```text
//! # comment            ! also a comment
//! wss.keystore=/etc/bootstrap/keystore.pem
//! wss.storepass: secret
//! long.value = first \
//!              second
//! whitespace.separated value
//! ```
//!
//! # Design Decisions
//! - A key ends at the first unescaped `=`, `:` or whitespace; one `=`/`:`
//!   after that whitespace is still treated as the separator
//! - A trailing `\` continues value lines, never comment lines
//! - Whitespace around keys and values is trimmed
//! - Later duplicates overwrite earlier ones

use std::collections::HashMap;

/// Parsed key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parse properties text. Parsing is lenient and never fails;
    /// lines without a separator become keys with an empty value.
    pub fn parse(input: &str) -> Self {
        let mut entries = HashMap::new();

        for line in logical_lines(input) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }

            let (raw_key, raw_value) = split_entry(trimmed);
            let key = unescape(raw_key.trim_end());
            if key.is_empty() {
                continue;
            }
            entries.insert(key, unescape(raw_value.trim()));
        }

        Self { entries }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a value by key, treating empty values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Join physical lines ending in an odd number of backslashes.
fn logical_lines(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for physical in input.lines() {
        if !continuing && is_comment(physical) {
            lines.push(physical.to_string());
            continue;
        }

        let part = if continuing { physical.trim_start() } else { physical };
        let trailing = part.chars().rev().take_while(|c| *c == '\\').count();

        if trailing % 2 == 1 {
            current.push_str(&part[..part.len() - 1]);
            continuing = true;
        } else {
            current.push_str(part);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with('!')
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], &line[i + 1..]),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..i], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
