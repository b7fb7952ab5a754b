//! Runtime values extracted from an advertisement payload.

/// A single extracted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Numeric identifier/data range of up to eight bytes, read per the
    /// term's endianness.
    Unsigned(u64),
    /// Power range, two's complement.
    Signed(i64),
    /// Ranges wider than eight bytes (e.g. 16-byte identifiers), in
    /// big-endian byte order.
    Bytes(Vec<u8>),
    /// URL-flagged identifier whose bytes decompressed into a valid URL.
    Url(String),
    /// URL-flagged identifier whose bytes failed decompression or
    /// validation; the raw range is preserved.
    InvalidUrl(Vec<u8>),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(x) => Some(*x),
            Value::Unsigned(x) => Some(*x as i64),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::InvalidUrl(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Value::Url(s) => Some(s),
            _ => None,
        }
    }

    /// False only for `InvalidUrl`; the validation-failed flag on a
    /// URL-flagged field.
    pub fn is_valid_url(&self) -> bool {
        !matches!(self, Value::InvalidUrl(_))
    }
}

/// Structured record decoded from one advertisement buffer against one
/// layout. Identifiers and data fields appear in term order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    pub identifiers: Vec<Value>,
    pub data_fields: Vec<Value>,
    pub tx_power: Option<i64>,
}
