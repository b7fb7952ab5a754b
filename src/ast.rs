//! Field specifications compiled from a layout descriptor.

use std::fmt;

/// Kind of a descriptor term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Identifier,
    Data,
    Match,
    Power,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Identifier => "identifier",
            FieldKind::Data => "data",
            FieldKind::Match => "match",
            FieldKind::Power => "power",
        };
        f.write_str(s)
    }
}

/// One compiled descriptor term: an inclusive byte range plus interpretation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    /// Zero based inclusive start offset into the advertisement payload.
    pub start: usize,
    /// Zero based inclusive end offset; always `>= start`.
    pub end: usize,
    /// Modifier substring exactly as captured (`""`, `"b"`, `"bllb"`, ...).
    /// Letters may repeat in any order; kept verbatim for diagnostics.
    pub mods: String,
    /// Expected payload bytes for match terms; `None` for every other kind.
    pub literal: Option<Vec<u8>>,
}

impl FieldSpec {
    /// Number of bytes covered by the inclusive range.
    pub fn byte_len(&self) -> usize {
        self.end - self.start + 1
    }

    /// True when the term carries the variable-length/URL flag.
    pub fn is_url(&self) -> bool {
        self.mods.contains('v')
    }
}

/// A parsed layout descriptor: ordered field specs plus the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source: String,
    pub fields: Vec<FieldSpec>,
}

/// Resolved layout: per-kind field indices for the codec.
#[derive(Debug, Clone)]
pub struct ResolvedLayout {
    pub layout: Layout,
    pub identifier_indices: Vec<usize>,
    pub data_indices: Vec<usize>,
    pub match_indices: Vec<usize>,
    pub power_indices: Vec<usize>,
}

impl ResolvedLayout {
    pub fn resolve(layout: Layout) -> Result<Self, String> {
        let mut identifier_indices = Vec::new();
        let mut data_indices = Vec::new();
        let mut match_indices = Vec::new();
        let mut power_indices = Vec::new();
        for (i, f) in layout.fields.iter().enumerate() {
            match f.kind {
                FieldKind::Identifier => identifier_indices.push(i),
                FieldKind::Data => data_indices.push(i),
                FieldKind::Match => {
                    let lit = f
                        .literal
                        .as_ref()
                        .ok_or_else(|| format!("match term {} has no literal", i))?;
                    if lit.len() != f.byte_len() {
                        return Err(format!(
                            "match term {}: literal is {} byte(s) but the range covers {}",
                            i,
                            lit.len(),
                            f.byte_len()
                        ));
                    }
                    match_indices.push(i);
                }
                FieldKind::Power => {
                    if f.byte_len() > 8 {
                        return Err(format!(
                            "power term {} covers {} bytes; at most eight are supported",
                            i,
                            f.byte_len()
                        ));
                    }
                    power_indices.push(i);
                }
            }
        }
        Ok(ResolvedLayout {
            layout,
            identifier_indices,
            data_indices,
            match_indices,
            power_indices,
        })
    }

    /// Highest byte offset any field touches, if the layout is non-empty.
    pub fn max_end(&self) -> Option<usize> {
        self.layout.fields.iter().map(|f| f.end).max()
    }
}
