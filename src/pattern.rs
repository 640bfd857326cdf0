//! Route path compilation.
//!
//! A route path is literal text with `<name>` placeholders:
//!
//! ```text
//! /user/<username>          one placeholder, one segment
//! /files/<stem>.<ext>       two placeholders sharing a segment
//! ```
//!
//! Each placeholder captures one or more characters other than `/`. The
//! compiled pattern is anchored at both ends, so `/user/<id>` matches
//! `/user/42` but neither `/user/` nor `/user/42/extra`.

use std::fmt;

use regex::Regex;

use crate::error::PatternError;

/// One piece of a compiled route path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled route path. Immutable once built.
#[derive(Clone, Debug)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
}

impl RoutePattern {
    /// Compiles `path` into a matcher.
    ///
    /// Fails on an unclosed `<`, a stray `>`, a placeholder name that is not
    /// an identifier, or a name used twice.
    pub fn compile(path: &str) -> Result<Self, PatternError> {
        let segments = parse(path)?;

        let mut re = String::with_capacity(path.len() + 16);
        re.push('^');
        for segment in &segments {
            match segment {
                Segment::Literal(text) => re.push_str(&regex::escape(text)),
                Segment::Placeholder(name) => {
                    re.push_str("(?P<");
                    re.push_str(name);
                    re.push_str(">[^/]+)");
                }
            }
        }
        re.push('$');

        let regex = Regex::new(&re).map_err(|source| PatternError::Regex {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self { source: path.to_owned(), segments, regex })
    }

    /// Tests `path` against the whole pattern and returns the captured values.
    ///
    /// `None` is the ordinary "does not match" outcome.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::default();
        for name in self.placeholders() {
            if let Some(m) = caps.name(name) {
                params.push(name, m.as_str());
            }
        }
        Some(params)
    }

    /// The path this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in declaration order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse(path: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut names: Vec<&str> = Vec::new();
    let mut literal_start = 0;
    let mut rest = path.char_indices();

    while let Some((pos, c)) = rest.next() {
        match c {
            '<' => {
                let close = path[pos + 1..]
                    .find(['<', '>'])
                    .map(|off| pos + 1 + off)
                    .filter(|&end| path.as_bytes()[end] == b'>')
                    .ok_or_else(|| PatternError::Unclosed { path: path.to_owned(), pos })?;

                let name = &path[pos + 1..close];
                if !is_identifier(name) {
                    return Err(PatternError::InvalidName {
                        path: path.to_owned(),
                        name: name.to_owned(),
                    });
                }
                if names.contains(&name) {
                    return Err(PatternError::Duplicate {
                        path: path.to_owned(),
                        name: name.to_owned(),
                    });
                }

                if literal_start < pos {
                    segments.push(Segment::Literal(path[literal_start..pos].to_owned()));
                }
                segments.push(Segment::Placeholder(name.to_owned()));
                names.push(name);
                literal_start = close + 1;

                // Skip past the closing `>`.
                for (i, _) in rest.by_ref() {
                    if i == close {
                        break;
                    }
                }
            }
            '>' => {
                return Err(PatternError::StrayClose { path: path.to_owned(), pos });
            }
            _ => {}
        }
    }

    if literal_start < path.len() {
        segments.push(Segment::Literal(path[literal_start..].to_owned()));
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Values captured from a request path, keyed by placeholder name.
///
/// Kept in placeholder declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_owned(), value.to_owned()));
    }
}
