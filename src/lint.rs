//! Linter for layout descriptors: flags legal-but-suspect constructs.
//!
//! ## Rules
//!
//! - **ConflictingEndianness** (warning): a term carries both `b` and `l`;
//!   the last one wins.
//! - **RepeatedModifier** (warning): a modifier letter appears more than
//!   once in a term.
//! - **UnorderedTerms** (warning): terms are not in ascending start-offset
//!   order.
//! - **OverlappingRanges** (error): two terms cover a common byte.
//! - **MissingMatchTerm** (warning): no `m:` term — the layout gates
//!   nothing and decodes any long-enough buffer.
//!
//! Run the linter via the `lint_layout` binary:
//! `cargo run --bin lint_layout -- "m:2-3=0215,i:4-19"` or pipe descriptors
//! one per line. Exit code 1 if any error-level findings.

use crate::ast::{FieldKind, Layout};

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Both `b` and `l` in one term; the last one wins.
    ConflictingEndianness,
    /// A modifier letter repeated within one term.
    RepeatedModifier,
    /// Terms not in ascending start-offset order.
    UnorderedTerms,
    /// Two terms cover a common byte.
    OverlappingRanges,
    /// No match term gates the layout.
    MissingMatchTerm,
}

/// A single lint message with the offending term index.
#[derive(Debug, Clone)]
pub struct LintMessage {
    /// Index of the offending term (the later term for pairwise rules).
    pub term_index: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Run all lint rules on a parsed layout. Returns messages in term order.
pub fn lint(layout: &Layout) -> Vec<LintMessage> {
    let mut out = Vec::new();
    let fields = &layout.fields;

    for (i, f) in fields.iter().enumerate() {
        if f.mods.contains('b') && f.mods.contains('l') {
            out.push(LintMessage {
                term_index: i,
                rule: LintRule::ConflictingEndianness,
                severity: Severity::Warning,
                message: format!(
                    "term has both `b` and `l` (`{}`); the last one wins",
                    f.mods
                ),
            });
        }
        for letter in ['b', 'l', 'v'] {
            if f.mods.chars().filter(|&c| c == letter).count() > 1 {
                out.push(LintMessage {
                    term_index: i,
                    rule: LintRule::RepeatedModifier,
                    severity: Severity::Warning,
                    message: format!("modifier `{}` repeated in `{}`", letter, f.mods),
                });
            }
        }
    }

    for i in 1..fields.len() {
        if fields[i].start < fields[i - 1].start {
            out.push(LintMessage {
                term_index: i,
                rule: LintRule::UnorderedTerms,
                severity: Severity::Warning,
                message: format!(
                    "term starts at byte {} after a term starting at byte {}",
                    fields[i].start,
                    fields[i - 1].start
                ),
            });
        }
    }

    for i in 0..fields.len() {
        for j in (i + 1)..fields.len() {
            if fields[i].start <= fields[j].end && fields[j].start <= fields[i].end {
                out.push(LintMessage {
                    term_index: j,
                    rule: LintRule::OverlappingRanges,
                    severity: Severity::Error,
                    message: format!(
                        "bytes {}-{} overlap term {} (bytes {}-{})",
                        fields[j].start, fields[j].end, i, fields[i].start, fields[i].end
                    ),
                });
            }
        }
    }

    if !fields.is_empty() && !fields.iter().any(|f| f.kind == FieldKind::Match) {
        out.push(LintMessage {
            term_index: 0,
            rule: LintRule::MissingMatchTerm,
            severity: Severity::Warning,
            message: "no match term; any long-enough buffer will decode".to_string(),
        });
    }

    out.sort_by_key(|m| m.term_index);
    out
}
