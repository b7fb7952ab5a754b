//! Parse layout descriptors into field specs using PEST.
//!
//! A descriptor is split on commas and each term is matched against the
//! grammar independently, so errors cite the offending term text and its
//! position in the descriptor.

use crate::ast::{FieldKind, FieldSpec, Layout};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub(crate) struct LayoutParser;

/// Compile error for a layout descriptor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("malformed descriptor term `{term}` at index {index}: {reason}")]
    MalformedTerm {
        term: String,
        index: usize,
        reason: String,
    },
}

fn malformed(term: &str, index: usize, reason: impl Into<String>) -> LayoutError {
    LayoutError::MalformedTerm {
        term: term.to_string(),
        index,
        reason: reason.into(),
    }
}

/// Canonical non-negative decimal: exactly `"0"`, or digits with no leading zero.
pub fn is_canonical_decimal(s: &str) -> bool {
    match s.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Parse a layout descriptor into an ordered field list.
///
/// Pure: the same descriptor always compiles to the same `Layout`, with
/// fields in term order.
pub fn parse(source: &str) -> Result<Layout, LayoutError> {
    let mut fields = Vec::new();
    for (index, term) in source.split(',').enumerate() {
        fields.push(parse_term(term, index)?);
    }
    Ok(Layout {
        source: source.to_string(),
        fields,
    })
}

fn parse_term(term: &str, index: usize) -> Result<FieldSpec, LayoutError> {
    let pairs = LayoutParser::parse(Rule::term, term)
        .map_err(|_| malformed(term, index, "matches no recognized term shape"))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| malformed(term, index, "matches no recognized term shape"))?;
    if pair.as_span().end() != term.len() {
        return Err(malformed(term, index, "trailing characters after the term"));
    }
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| malformed(term, index, "matches no recognized term shape"))?;
    let kind = match inner.as_rule() {
        Rule::identifier_term => FieldKind::Identifier,
        Rule::data_term => FieldKind::Data,
        Rule::match_term => FieldKind::Match,
        Rule::power_term => FieldKind::Power,
        _ => return Err(malformed(term, index, "matches no recognized term shape")),
    };
    let mut it = inner.into_inner();
    let start_str = it
        .next()
        .ok_or_else(|| malformed(term, index, "missing start offset"))?
        .as_str();
    let end_str = it
        .next()
        .ok_or_else(|| malformed(term, index, "missing end offset"))?
        .as_str();
    let start = parse_offset(start_str, term, index, "start")?;
    let end = parse_offset(end_str, term, index, "end")?;
    if start > end {
        return Err(malformed(
            term,
            index,
            format!("start offset {} is greater than end offset {}", start, end),
        ));
    }
    let (mods, literal) = match kind {
        FieldKind::Match => {
            let hex = it
                .next()
                .ok_or_else(|| malformed(term, index, "missing match literal"))?
                .as_str();
            (String::new(), Some(parse_hex_bytes(hex, term, index)?))
        }
        _ => {
            let mods = it.next().map(|p| p.as_str().to_string()).unwrap_or_default();
            (mods, None)
        }
    };
    if let Some(ref lit) = literal {
        let span = end - start + 1;
        if lit.len() != span {
            return Err(malformed(
                term,
                index,
                format!(
                    "match literal is {} byte(s) but the range covers {}",
                    lit.len(),
                    span
                ),
            ));
        }
    }
    Ok(FieldSpec {
        kind,
        start,
        end,
        mods,
        literal,
    })
}

fn parse_offset(s: &str, term: &str, index: usize, which: &str) -> Result<usize, LayoutError> {
    if !is_canonical_decimal(s) {
        return Err(malformed(
            term,
            index,
            format!("{} offset `{}` is not a canonical decimal", which, s),
        ));
    }
    s.parse::<usize>().map_err(|_| {
        malformed(
            term,
            index,
            format!("{} offset `{}` is out of range", which, s),
        )
    })
}

fn parse_hex_bytes(hex: &str, term: &str, index: usize) -> Result<Vec<u8>, LayoutError> {
    if hex.len() % 2 != 0 {
        return Err(malformed(
            term,
            index,
            "match literal must have an even number of hex digits",
        ));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let s = std::str::from_utf8(chunk)
            .map_err(|_| malformed(term, index, "invalid hex in match literal"))?;
        let b = u8::from_str_radix(s, 16)
            .map_err(|_| malformed(term, index, "invalid hex in match literal"))?;
        bytes.push(b);
    }
    Ok(bytes)
}
