//! Eddystone URL support: validation against the accepted URL shape and
//! compressed-URL byte handling.
//!
//! All functions are total: malformed input yields `None`, never a panic.

use crate::parser::{LayoutParser, Rule};
use pest::Parser;

/// Eddystone URL scheme prefix bytes, indexed by code.
const SCHEME_PREFIXES: [&str; 4] = ["http://www.", "https://www.", "http://", "https://"];

/// Eddystone URL expansion codes 0x00..=0x0d.
const EXPANSIONS: [&str; 14] = [
    ".com/", ".org/", ".edu/", ".net/", ".info/", ".biz/", ".gov/", ".com", ".org", ".edu",
    ".net", ".info", ".biz", ".gov",
];

/// Normalized breakdown of a validated URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lowercased `"http"` or `"https"`.
    pub scheme: String,
    /// Whether the `www.` prefix was present.
    pub www: bool,
    /// Dot separated host labels, verbatim.
    pub host: String,
    /// Path including the leading slash when present; may be empty.
    pub path: String,
}

/// Validate a candidate string against the accepted URL shape.
pub fn validate_url(candidate: &str) -> Option<UrlParts> {
    let mut pairs = LayoutParser::parse(Rule::url, candidate).ok()?;
    let url = pairs.next()?;
    let mut scheme = String::new();
    let mut www = false;
    let mut host = String::new();
    let mut path = String::new();
    for part in url.into_inner() {
        match part.as_rule() {
            Rule::scheme => scheme = part.as_str().to_ascii_lowercase(),
            Rule::www => www = true,
            Rule::host => host = part.as_str().to_string(),
            Rule::slash => path.push('/'),
            Rule::url_path => path.push_str(part.as_str()),
            _ => {}
        }
    }
    Some(UrlParts {
        scheme,
        www,
        host,
        path,
    })
}

/// Expand Eddystone compressed URL bytes into a URL string.
///
/// The first byte selects the scheme prefix; each remaining byte is either
/// a printable URL character or an expansion code. Bytes 0x0e..=0x20 and
/// 0x7f..=0xff are not valid in a URL body.
pub fn decompress_url(bytes: &[u8]) -> Option<String> {
    let (&prefix, rest) = bytes.split_first()?;
    let mut out = String::from(*SCHEME_PREFIXES.get(prefix as usize)?);
    for &b in rest {
        match b {
            0x00..=0x0d => out.push_str(EXPANSIONS[b as usize]),
            0x0e..=0x20 | 0x7f..=0xff => return None,
            _ => out.push(b as char),
        }
    }
    Some(out)
}

/// Compress a URL string into Eddystone bytes: longest scheme prefix first,
/// then expansion codes (dot suffixes with a trailing slash take precedence
/// over the bare ones), then plain printable characters.
pub fn compress_url(url: &str) -> Option<Vec<u8>> {
    let bytes = url.as_bytes();
    let mut best: Option<(u8, usize)> = None;
    for (code, prefix) in SCHEME_PREFIXES.iter().enumerate() {
        let p = prefix.as_bytes();
        if bytes.len() >= p.len() && bytes[..p.len()].eq_ignore_ascii_case(p) {
            if best.map_or(true, |(_, l)| p.len() > l) {
                best = Some((code as u8, p.len()));
            }
        }
    }
    let (code, mut pos) = best?;
    let mut out = vec![code];
    'outer: while pos < bytes.len() {
        for (code, exp) in EXPANSIONS.iter().enumerate() {
            let e = exp.as_bytes();
            if bytes.len() - pos >= e.len() && bytes[pos..pos + e.len()].eq_ignore_ascii_case(e) {
                out.push(code as u8);
                pos += e.len();
                continue 'outer;
            }
        }
        let b = bytes[pos];
        if !(0x21..=0x7e).contains(&b) {
            return None;
        }
        out.push(b);
        pos += 1;
    }
    Some(out)
}
