//! Pattern parsing and path normalization.
//!
//! # Grammar
//! - Literal segments: `/users/list`
//! - Parameter segments: any segment containing `:`, e.g. `/users/:id`
//! - The name is the segment with surrounding `:` trimmed and must not be empty
//!
//! # Design Decisions
//! - Runs of `/` collapse to a single separator before anything else
//! - The literal text before the first `:` is the routing prefix
//! - The match key only records shape, so `/a/:x` and `/a/:y` collide

use crate::error::{MuxError, MuxResult};

/// Parameter marker.
pub const PARAM_MARKER: char = ':';

/// Path separator.
pub const SEPARATOR: char = '/';

/// Placeholder written into match keys for parameter positions.
pub(crate) const PLACEHOLDER: &str = ":";

/// Collapse every run of consecutive `/` into one.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        if c == SEPARATOR {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(c);
    }
    out
}

/// A registration pattern split into its routing parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// Literal text before the first parameter marker.
    pub prefix: String,
    /// Shape key: literal segments verbatim, parameters as `:`.
    pub key: String,
    /// Per segment: `""` for literal, parameter name otherwise.
    pub template: Vec<String>,
    /// Parameter names in declaration order.
    pub names: Vec<String>,
}

impl ParsedPattern {
    /// Number of parameter segments.
    pub fn param_count(&self) -> usize {
        self.names.len()
    }
}

/// Parse a registration pattern.
pub fn parse(pattern: &str) -> MuxResult<ParsedPattern> {
    let pattern = normalize(pattern);

    let Some(idx) = pattern.find(PARAM_MARKER) else {
        return Ok(ParsedPattern {
            prefix: pattern,
            key: String::new(),
            template: Vec::new(),
            names: Vec::new(),
        });
    };

    let dangling = format!("{}{}", PARAM_MARKER, SEPARATOR);
    if pattern.ends_with(PARAM_MARKER) || pattern.contains(&dangling) {
        return Err(MuxError::InvalidPattern { pattern });
    }

    let prefix = pattern[..idx].to_string();
    let mut template = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut shape = Vec::new();

    for segment in pattern[idx..].split(SEPARATOR) {
        if segment.contains(PARAM_MARKER) {
            let name = segment.trim_matches(PARAM_MARKER);
            if name.is_empty() {
                return Err(MuxError::InvalidPattern {
                    pattern: pattern.clone(),
                });
            }
            if names.iter().any(|n| n == name) {
                return Err(MuxError::DuplicateParam {
                    pattern: pattern.clone(),
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
            template.push(name.to_string());
            shape.push(PLACEHOLDER);
        } else {
            template.push(String::new());
            shape.push(segment);
        }
    }

    Ok(ParsedPattern {
        key: shape.join("/"),
        prefix,
        template,
        names,
    })
}

/// Rebuild the shape key of `segments` against a stored template.
///
/// Returns `None` when a parameter position holds an empty segment.
pub(crate) fn shape_key(segments: &[&str], template: &[String]) -> Option<String> {
    let mut shape = Vec::with_capacity(segments.len());
    for (segment, name) in segments.iter().zip(template) {
        if name.is_empty() {
            shape.push(*segment);
        } else if segment.is_empty() {
            return None;
        } else {
            shape.push(PLACEHOLDER);
        }
    }
    Some(shape.join("/"))
}
