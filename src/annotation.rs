//! Inline `[...]` annotations inside a field definition.
//!
//! Matching is deliberately loose: unknown bracket content is ignored and a
//! `ref` annotation that doesn't have the exact `<dir> <table>.<field>` shape
//! is treated as if it were absent.

use crate::ast::{Direction, RefAnnotation};
use crate::lexer::is_ident_char;

const PK: &str = "[pk]";
const NULL: &str = "[null]";

pub fn is_primary_key(definition: &str) -> bool {
    definition.contains(PK)
}

pub fn is_nullable(definition: &str) -> bool {
    definition.contains(NULL)
}

/// Text of the first `[note: ...]` annotation, up to the first `]`.
pub fn note(definition: &str) -> Option<String> {
    definition.match_indices("[note:").find_map(|(i, tag)| {
        let rest = definition[i + tag.len()..].trim_start();
        let end = rest.find(']')?;
        let text = &rest[..end];
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// First well-formed `[ref: > table.field]` / `[ref: < table.field]`.
pub fn reference(definition: &str) -> Option<RefAnnotation> {
    definition
        .match_indices('[')
        .find_map(|(i, _)| parse_ref(&definition[i + 1..]))
}

fn parse_ref(s: &str) -> Option<RefAnnotation> {
    let s = s.strip_prefix("ref:")?.trim_start();
    let mut chars = s.chars();
    let direction = Direction::from_char(chars.next()?)?;
    let s = chars.as_str().trim_start();

    let (table, s) = take_ident(s)?;
    let s = s.strip_prefix('.')?;
    let (field, s) = take_ident(s)?;
    s.starts_with(']').then(|| RefAnnotation {
        direction,
        table: table.to_string(),
        field: field.to_string(),
    })
}

fn take_ident(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

/// The declared type: the definition with every `[...]` group removed and
/// surrounding whitespace trimmed. An unterminated `[` is kept as text.
pub fn strip(definition: &str) -> String {
    let mut out = String::with_capacity(definition.len());
    let mut rest = definition;
    while let Some(open) = rest.find('[') {
        match rest[open..].find(']') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
