//! Decode/encode advertisement payloads against a compiled layout.
//!
//! Match terms gate the whole record: all of them are verified before any
//! extraction happens, and a mismatch short-circuits with `NoMatch`.
//! Identifier/data/power terms then extract their byte ranges with per-term
//! endianness.

use crate::ast::{FieldKind, FieldSpec, Layout, ResolvedLayout};
use crate::url;
use crate::value::{DecodedRecord, Value};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

/// Decode/encode error. `NoMatch` is the ordinary "this buffer is not this
/// beacon format" verdict; callers typically fall through to another layout
/// (see `frame::decode_scan`).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("field {index}: bytes {start}-{end} out of range for a {buffer_len}-byte buffer")]
    OutOfRange {
        index: usize,
        start: usize,
        end: usize,
        buffer_len: usize,
    },
    #[error("match field {index}: payload bytes differ from the expected literal")]
    NoMatch { index: usize },
    #[error("field {index}: {reason}")]
    ValueMismatch { index: usize, reason: String },
}

/// Applies one compiled layout to raw advertisement buffers.
///
/// Stateless after construction; decoding is read-only, so one `Codec` can
/// be shared across threads decoding independent buffers.
#[derive(Debug, Clone)]
pub struct Codec {
    /// Applied when a term carries neither `b` nor `l`.
    pub default_endianness: Endianness,
    resolved: ResolvedLayout,
}

impl Codec {
    pub fn new(resolved: ResolvedLayout, default_endianness: Endianness) -> Self {
        Codec {
            default_endianness,
            resolved,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.resolved.layout
    }

    /// Endianness of one term: the last `b`/`l` in the modifier string wins;
    /// without either, the codec default applies.
    pub fn field_endianness(&self, spec: &FieldSpec) -> Endianness {
        spec.mods
            .bytes()
            .rev()
            .find_map(|c| match c {
                b'b' => Some(Endianness::Big),
                b'l' => Some(Endianness::Little),
                _ => None,
            })
            .unwrap_or(self.default_endianness)
    }

    /// Decode one advertisement buffer into a record, or report why the
    /// layout does not apply. No partial record is ever produced.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedRecord, CodecError> {
        // Gate pass: every match term must hold before anything is extracted.
        for &i in &self.resolved.match_indices {
            let f = &self.resolved.layout.fields[i];
            let range = self.range(f, i, bytes)?;
            let literal = f.literal.as_deref().unwrap_or_default();
            if range != literal {
                return Err(CodecError::NoMatch { index: i });
            }
        }
        let mut record = DecodedRecord::default();
        for (i, f) in self.resolved.layout.fields.iter().enumerate() {
            match f.kind {
                FieldKind::Match => {}
                FieldKind::Identifier => {
                    let range = self.range(f, i, bytes)?;
                    let v = if f.is_url() {
                        decode_url_field(range)
                    } else {
                        self.read_unsigned(f, range)
                    };
                    record.identifiers.push(v);
                }
                FieldKind::Data => {
                    let range = self.range(f, i, bytes)?;
                    let v = self.read_unsigned(f, range);
                    record.data_fields.push(v);
                }
                FieldKind::Power => {
                    let range = self.range(f, i, bytes)?;
                    record.tx_power = Some(self.read_signed(f, range));
                }
            }
        }
        Ok(record)
    }

    /// Buffer length needed to cover every declared range.
    pub fn encoded_len(&self) -> usize {
        self.resolved.max_end().map(|e| e + 1).unwrap_or(0)
    }

    /// Encode a record back into advertisement bytes: the inverse of
    /// `decode` on well-formed records. Bytes no term covers are zero.
    pub fn encode(&self, record: &DecodedRecord) -> Result<Vec<u8>, CodecError> {
        if record.identifiers.len() != self.resolved.identifier_indices.len() {
            return Err(CodecError::ValueMismatch {
                index: 0,
                reason: format!(
                    "record has {} identifier(s), layout declares {}",
                    record.identifiers.len(),
                    self.resolved.identifier_indices.len()
                ),
            });
        }
        if record.data_fields.len() != self.resolved.data_indices.len() {
            return Err(CodecError::ValueMismatch {
                index: 0,
                reason: format!(
                    "record has {} data field(s), layout declares {}",
                    record.data_fields.len(),
                    self.resolved.data_indices.len()
                ),
            });
        }
        let mut out = vec![0u8; self.encoded_len()];
        let mut next_identifier = 0usize;
        let mut next_data = 0usize;
        for (i, f) in self.resolved.layout.fields.iter().enumerate() {
            match f.kind {
                FieldKind::Match => {
                    let literal = f.literal.as_deref().unwrap_or_default();
                    out[f.start..=f.end].copy_from_slice(literal);
                }
                FieldKind::Identifier => {
                    let v = &record.identifiers[next_identifier];
                    next_identifier += 1;
                    self.write_value(&mut out, f, i, v)?;
                }
                FieldKind::Data => {
                    let v = &record.data_fields[next_data];
                    next_data += 1;
                    self.write_value(&mut out, f, i, v)?;
                }
                FieldKind::Power => {
                    let v = record.tx_power.ok_or_else(|| CodecError::ValueMismatch {
                        index: i,
                        reason: "record has no power value".to_string(),
                    })?;
                    self.write_signed(&mut out, f, i, v)?;
                }
            }
        }
        Ok(out)
    }

    fn range<'a>(
        &self,
        f: &FieldSpec,
        index: usize,
        bytes: &'a [u8],
    ) -> Result<&'a [u8], CodecError> {
        if f.end >= bytes.len() {
            return Err(CodecError::OutOfRange {
                index,
                start: f.start,
                end: f.end,
                buffer_len: bytes.len(),
            });
        }
        Ok(&bytes[f.start..=f.end])
    }

    fn read_unsigned(&self, f: &FieldSpec, range: &[u8]) -> Value {
        if range.len() <= 8 {
            let v = match self.field_endianness(f) {
                Endianness::Big => BigEndian::read_uint(range, range.len()),
                Endianness::Little => LittleEndian::read_uint(range, range.len()),
            };
            Value::Unsigned(v)
        } else {
            let mut b = range.to_vec();
            if self.field_endianness(f) == Endianness::Little {
                b.reverse();
            }
            Value::Bytes(b)
        }
    }

    fn read_signed(&self, f: &FieldSpec, range: &[u8]) -> i64 {
        match self.field_endianness(f) {
            Endianness::Big => BigEndian::read_int(range, range.len()),
            Endianness::Little => LittleEndian::read_int(range, range.len()),
        }
    }

    fn write_value(
        &self,
        out: &mut [u8],
        f: &FieldSpec,
        index: usize,
        v: &Value,
    ) -> Result<(), CodecError> {
        let len = f.byte_len();
        let dst = &mut out[f.start..=f.end];
        match v {
            Value::Unsigned(x) => {
                if len > 8 {
                    return Err(CodecError::ValueMismatch {
                        index,
                        reason: format!("integer value for a {}-byte range", len),
                    });
                }
                if len < 8 && *x >> (len * 8) != 0 {
                    return Err(CodecError::ValueMismatch {
                        index,
                        reason: format!("value {} does not fit in {} byte(s)", x, len),
                    });
                }
                match self.field_endianness(f) {
                    Endianness::Big => BigEndian::write_uint(dst, *x, len),
                    Endianness::Little => LittleEndian::write_uint(dst, *x, len),
                }
            }
            Value::Bytes(b) => {
                if b.len() != len {
                    return Err(CodecError::ValueMismatch {
                        index,
                        reason: format!("{} byte(s) for a {}-byte range", b.len(), len),
                    });
                }
                dst.copy_from_slice(b);
                if self.field_endianness(f) == Endianness::Little {
                    dst.reverse();
                }
            }
            Value::Url(s) => {
                let bytes = url::compress_url(s).ok_or_else(|| CodecError::ValueMismatch {
                    index,
                    reason: format!("URL `{}` cannot be compressed", s),
                })?;
                if bytes.len() != len {
                    return Err(CodecError::ValueMismatch {
                        index,
                        reason: format!(
                            "compressed URL is {} byte(s) but the range covers {}",
                            bytes.len(),
                            len
                        ),
                    });
                }
                dst.copy_from_slice(&bytes);
            }
            Value::InvalidUrl(b) => {
                if b.len() != len {
                    return Err(CodecError::ValueMismatch {
                        index,
                        reason: format!("{} byte(s) for a {}-byte range", b.len(), len),
                    });
                }
                dst.copy_from_slice(b);
            }
            Value::Signed(_) => {
                return Err(CodecError::ValueMismatch {
                    index,
                    reason: "signed value in an unsigned field".to_string(),
                });
            }
        }
        Ok(())
    }

    fn write_signed(
        &self,
        out: &mut [u8],
        f: &FieldSpec,
        index: usize,
        v: i64,
    ) -> Result<(), CodecError> {
        let len = f.byte_len();
        if len < 8 {
            let min = -(1i64 << (len * 8 - 1));
            let max = (1i64 << (len * 8 - 1)) - 1;
            if v < min || v > max {
                return Err(CodecError::ValueMismatch {
                    index,
                    reason: format!("power {} does not fit in {} byte(s)", v, len),
                });
            }
        }
        let dst = &mut out[f.start..=f.end];
        match self.field_endianness(f) {
            Endianness::Big => BigEndian::write_int(dst, v, len),
            Endianness::Little => LittleEndian::write_int(dst, v, len),
        }
        Ok(())
    }
}

fn decode_url_field(range: &[u8]) -> Value {
    match url::decompress_url(range) {
        Some(text) if url::validate_url(&text).is_some() => Value::Url(text),
        _ => Value::InvalidUrl(range.to_vec()),
    }
}
