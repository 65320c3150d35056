//! Reader for `.properties` files.
//!
//! Both the connection configuration and the fixture catalog are flat
//! `key=value` files in the classic properties dialect: `#`/`!` comments,
//! `=`, `:` or whitespace as separator, backslash line continuations and
//! backslash escapes (including `\uXXXX`). Files are decoded as UTF-8.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::ConfigError;

pub type Properties = HashMap<String, String>;

const BLANK: [char; 3] = [' ', '\t', '\x0c'];

/// Read and parse the file at `path`.
///
/// Returns `Ok(None)` when the file does not exist. Any other I/O failure and
/// any syntax error is a `ConfigError`.
pub fn read(path: &Path) -> Result<Option<Properties>, ConfigError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        ConfigError::Malformed {
            path: path.to_path_buf(),
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
            message: "invalid UTF-8".to_string(),
        }
    })?;

    parse(&text, path).map(Some)
}

/// Parse properties text. `origin` only labels errors.
pub fn parse(text: &str, origin: &Path) -> Result<Properties, ConfigError> {
    let mut entries = Properties::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let trimmed = raw.trim_start_matches(BLANK);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(BLANK)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        let malformed = |message| ConfigError::Malformed {
            path: origin.to_path_buf(),
            line: index + 1,
            message,
        };
        let key = unescape(key).map_err(malformed)?;
        let value = unescape(value).map_err(malformed)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

/// An odd run of trailing backslashes joins the next line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

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

    let rest = line[key_end..].trim_start_matches(BLANK);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(BLANK))
}

fn unescape(raw: &str) -> Result<String, String> {
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
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("malformed \\uxxxx escape: \\u{hex}"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
