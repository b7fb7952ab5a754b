//! Format decoded records for display.

use crate::ast::{FieldKind, Layout};
use crate::value::{DecodedRecord, Value};

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<String>()
}

/// Sixteen-byte identifiers in UUID grouping.
fn format_uuid(b: &[u8]) -> String {
    let h = hex_string(b);
    format!(
        "{}-{}-{}-{}-{}",
        &h[0..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..32]
    )
}

/// One-line rendering of a value: decimal for numeric ranges, UUID grouping
/// for sixteen-byte ranges, contiguous hex otherwise, URLs verbatim.
pub fn format_value(v: &Value) -> String {
    match v {
        Value::Unsigned(x) => format!("{}", x),
        Value::Signed(x) => format!("{}", x),
        Value::Bytes(b) if b.len() == 16 => format_uuid(b),
        Value::Bytes(b) => format!("0x{}", hex_string(b)),
        Value::Url(s) => s.clone(),
        Value::InvalidUrl(b) => format!("invalid url (0x{})", hex_string(b)),
    }
}

/// Multi-line dump of one decoded record, labeled by the layout's terms.
pub fn record_to_dump(layout: &Layout, record: &DecodedRecord) -> String {
    let mut lines = Vec::new();
    let mut next_identifier = 0usize;
    let mut next_data = 0usize;
    for f in &layout.fields {
        match f.kind {
            FieldKind::Match => {}
            FieldKind::Identifier => {
                if let Some(v) = record.identifiers.get(next_identifier) {
                    next_identifier += 1;
                    lines.push(format!(
                        "  id{} (bytes {}-{}): {}",
                        next_identifier,
                        f.start,
                        f.end,
                        format_value(v)
                    ));
                }
            }
            FieldKind::Data => {
                if let Some(v) = record.data_fields.get(next_data) {
                    next_data += 1;
                    lines.push(format!(
                        "  data{} (bytes {}-{}): {}",
                        next_data,
                        f.start,
                        f.end,
                        format_value(v)
                    ));
                }
            }
            FieldKind::Power => {
                if let Some(p) = record.tx_power {
                    lines.push(format!("  power (bytes {}-{}): {} dBm", f.start, f.end, p));
                }
            }
        }
    }
    lines.join("\n")
}
