//! Flat `key=value` properties files
//!
//! Writes and reads the `java.util.Properties` text format used for
//! `sha1.properties`: `#` comment lines, one `key=value` entry per line,
//! backslash escapes for separators, whitespace and non-ASCII characters.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Utc;

/// Errors for properties parsing
#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("line {line}: malformed \\u escape")]
    InvalidUnicodeEscape { line: usize },
}

/// Write `entries` to `path`, truncating any existing file.
///
/// The first line is the comment, the second the write timestamp, as
/// `java.util.Properties::store` lays them out.
pub fn store<'a, I>(path: &Path, entries: I, comment: &str) -> io::Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "#{}", comment.replace(['\r', '\n'], " "))?;
    writeln!(writer, "#{}", Utc::now().format("%a %b %d %H:%M:%S UTC %Y"))?;
    for (key, value) in entries {
        writeln!(writer, "{}={}", escape(key, true), escape(value, false))?;
    }

    writer.flush()
}

/// Read all entries from a properties file
pub fn load(path: &Path) -> Result<BTreeMap<String, String>, PropertiesError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Parse properties text. Later duplicates replace earlier ones.
pub fn parse(text: &str) -> Result<BTreeMap<String, String>, PropertiesError> {
    let mut entries = BTreeMap::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let line_no = index + 1;
        let first = raw.trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        entries.insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(entries)
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped separator
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches([' ', '\t', '\x0c']))
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }

    out
}

fn unescape(s: &str, line: usize) -> Result<String, PropertiesError> {
    let mut units: Vec<u16> = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }

        let escaped = match chars.next() {
            Some(escaped) => escaped,
            None => break,
        };
        let decoded = match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = if hex.len() == 4 {
                    u16::from_str_radix(&hex, 16).ok()
                } else {
                    None
                };
                units.push(unit.ok_or(PropertiesError::InvalidUnicodeEscape { line })?);
                continue;
            }
            other => other,
        };
        let mut buf = [0u16; 2];
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    Ok(String::from_utf16_lossy(&units))
}
