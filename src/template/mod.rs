//! Minimal template renderer.
//!
//! A template is a plain string with `{{ name }}` placeholders. Rendering is
//! textual substitution: no loops, no conditionals, no filters. Loops and
//! branches live in the generators so every target shares one template
//! grammar. A `{` that does not open a well-formed placeholder is copied
//! verbatim, which keeps brace-heavy target syntax readable in the tables.

use crate::error::{PortError, Result};
use crate::language::LanguageDefinition;


/// Named values substituted into a template.
#[derive(Clone, Debug, Default)]
pub struct Bindings<'a> {
    pairs: Vec<(&'a str, String)>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A later binding with the same name wins.
    pub fn with(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.pairs.push((name, value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Build bindings inline: `bind!("name" => x, "value" => y)`.
#[macro_export]
macro_rules! bind {
    () => { $crate::template::Bindings::new() };
    ($($name:literal => $value:expr),+ $(,)?) => {
        $crate::template::Bindings::new()$(.with($name, $value))+
    };
}

/// A placeholder found while scanning a template.
#[derive(Debug, PartialEq, Eq)]
enum Piece<'t> {
    Text(&'t str),
    Hole(&'t str),
}

/// Split a pattern into literal text and placeholder names.
fn scan(pattern: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let bytes = pattern.as_bytes();
    let mut text_start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            if let Some((name, end)) = placeholder_at(pattern, i + 2) {
                if text_start < i {
                    pieces.push(Piece::Text(&pattern[text_start..i]));
                }
                pieces.push(Piece::Hole(name));
                i = end;
                text_start = end;
                continue;
            }
        }
        i += 1;
    }
    if text_start < pattern.len() {
        pieces.push(Piece::Text(&pattern[text_start..]));
    }
    pieces
}

/// Try to read `  ident  }}` starting at `from`. Returns the identifier and
/// the byte offset just past the closing braces.
fn placeholder_at(pattern: &str, from: usize) -> Option<(&str, usize)> {
    let rest = &pattern[from..];
    let trimmed = rest.trim_start_matches(' ');
    let lead = rest.len() - trimmed.len();
    let ident_len = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    if ident_len == 0 || trimmed.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    let name = &trimmed[..ident_len];
    let after = trimmed[ident_len..].trim_start_matches(' ');
    let gap = trimmed.len() - ident_len - after.len();
    if !after.starts_with("}}") {
        return None;
    }
    Some((name, from + lead + ident_len + gap + 2))
}

/// Substitute bindings into a raw pattern. `language` and `key` only feed the
/// error context.
pub fn render_pattern(
    pattern: &str,
    bindings: &Bindings<'_>,
    language: &str,
    key: &str,
) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() + 16);
    for piece in scan(pattern) {
        match piece {
            Piece::Text(t) => out.push_str(t),
            Piece::Hole(name) => match bindings.get(name) {
                Some(v) => out.push_str(v),
                None => {
                    return Err(PortError::UnboundPlaceholder {
                        language: language.to_string(),
                        key: key.to_string(),
                        placeholder: name.to_string(),
                    })
                }
            },
        }
    }
    Ok(out)
}

/// Render template `key` of `language` with `bindings`.
pub fn render(key: &str, language: &LanguageDefinition, bindings: &Bindings<'_>) -> Result<String> {
    let pattern = language.template(key)?;
    render_pattern(pattern, bindings, &language.key, key)
}

/// Placeholder names used by a pattern, in order of first appearance.
pub fn placeholders(pattern: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for piece in scan(pattern) {
        if let Piece::Hole(name) = piece {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
