//! Lint layout descriptors: conflicting or repeated modifiers, unordered or
//! overlapping byte ranges, layouts with no match term.
//!
//! Usage:
//!   lint_layout <descriptor> [...]
//!   lint_layout < descriptors.txt      (one per line, `#` comments)
//!
//! Exit code 1 if any descriptor fails to compile or has error-level
//! findings.

use anyhow::Result;
use beacondsl::lint::{lint, LintMessage, LintRule, Severity};
use beacondsl::parse;
use std::io::Read;

fn rule_id(rule: LintRule) -> &'static str {
    match rule {
        LintRule::ConflictingEndianness => "conflicting-endianness",
        LintRule::RepeatedModifier => "repeated-modifier",
        LintRule::UnorderedTerms => "unordered-terms",
        LintRule::OverlappingRanges => "overlapping-ranges",
        LintRule::MissingMatchTerm => "missing-match-term",
    }
}

fn print_message(source: &str, m: &LintMessage) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    println!(
        "{}: term {}: {}: {} [{}]",
        source,
        m.term_index,
        severity_str,
        m.message,
        rule_id(m.rule)
    );
}

fn main() -> Result<()> {
    let mut descriptors: Vec<String> = std::env::args().skip(1).collect();
    if descriptors.is_empty() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        descriptors = text
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
    }

    let mut has_error = false;
    let mut total_warnings = 0usize;
    let mut total_errors = 0usize;
    for descriptor in &descriptors {
        match parse(descriptor) {
            Ok(layout) => {
                for m in lint(&layout) {
                    match m.severity {
                        Severity::Error => {
                            total_errors += 1;
                            has_error = true;
                        }
                        Severity::Warning => total_warnings += 1,
                    }
                    print_message(descriptor, &m);
                }
            }
            Err(e) => {
                total_errors += 1;
                has_error = true;
                println!("{}: error: {}", descriptor, e);
            }
        }
    }

    if total_errors > 0 || total_warnings > 0 {
        eprintln!(
            "lint: {} error(s), {} warning(s)",
            total_errors, total_warnings
        );
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
