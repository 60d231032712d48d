//! Shell-style wildcard patterns matched against whole object keys.
//!
//! Patterns are compiled to anchored regular expressions:
//!
//! | pattern  | meaning                                   |
//! |----------|-------------------------------------------|
//! | `*`      | any run of characters, including `/`      |
//! | `?`      | any single character                      |
//! | `[seq]`  | any character in `seq` (ranges allowed)   |
//! | `[!seq]` | any character not in `seq`                |
//!
//! An unclosed `[` matches itself. Matching is case-sensitive.

use regex::Regex;

use crate::error::PathError;

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self, PathError> {
        let regex = Regex::new(&translate(pattern)).map_err(|e| PathError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(GlobPattern {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// True if the whole of `key` matches.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from(r"\A(?s:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i..end]);
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(r")\z");
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
///
/// A `]` directly after `[` or `[!` is part of the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn push_class(out: &mut String, body: &[char]) {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let ranges = range_chunks(body)
        .iter()
        .map(|chunk| chunk.iter().copied().map(class_literal).collect::<String>())
        .collect::<Vec<_>>()
        .join("-");

    if ranges.is_empty() {
        // every range was reversed
        out.push_str(if negated { "." } else { r"[^\s\S]" });
        return;
    }

    out.push('[');
    if negated {
        out.push('^');
    }
    out.push_str(&ranges);
    out.push(']');
}

/// Split a class body into chunks whose boundaries are range dashes.
///
/// A `-` in the first or last position is a literal. Reversed ranges such
/// as `z-a` are removed along with their endpoints.
fn range_chunks(body: &[char]) -> Vec<Vec<char>> {
    let mut chunks: Vec<Vec<char>> = Vec::new();
    let mut start = 0;
    let mut from = 1;

    while let Some(offset) = body
        .get(from..)
        .and_then(|rest| rest.iter().position(|&c| c == '-'))
    {
        let dash = from + offset;
        chunks.push(body[start..dash].to_vec());
        start = dash + 1;
        from = dash + 3;
    }

    let last = &body[start..];
    match chunks.last_mut() {
        Some(prev) if last.is_empty() => prev.push('-'),
        _ => chunks.push(last.to_vec()),
    }

    for k in (1..chunks.len()).rev() {
        if chunks[k - 1].last() > chunks[k].first() {
            let next = chunks.remove(k);
            let prev = &mut chunks[k - 1];
            prev.pop();
            prev.extend(next.into_iter().skip(1));
        }
    }

    chunks
}

fn class_literal(c: char) -> String {
    match c {
        '\\' | '[' | ']' | '^' | '&' | '~' | '-' => format!("\\{}", c),
        c => c.to_string(),
    }
}
