//! # beacondsl — Beacon Advertisement Layout DSL and Codec
//!
//! A DSL for declaring how fields are laid out inside a BLE beacon
//! advertisement payload, compiled with a PEST grammar into typed,
//! bounds-checked byte-range extractors, plus a codec for decoding and
//! encoding raw advertisement buffers and a validator for Eddystone
//! compressed URLs.
//!
//! ## Descriptor terms
//!
//! A layout descriptor is a comma separated list of terms:
//!
//! - `m:<start>-<end>=<hex>` — match term: the payload bytes at the range
//!   must equal the hex literal for the layout to apply.
//! - `i:<start>-<end>[blv]*` — identifier term (`b` big-endian, `l`
//!   little-endian, `v` Eddystone compressed URL).
//! - `d:<start>-<end>[bl]*` — data term.
//! - `p:<start>-<end>[bl]*` — power term, read as signed dBm.
//!
//! Offsets are zero based and inclusive at both ends. When a term carries
//! both `b` and `l` the last one wins; with neither, the codec's configured
//! default endianness applies.
//!
//! ## Example layout
//!
//! ```text
//! m:2-3=0215,i:4-19,i:20-21,i:22-23,p:24-24,d:25-25
//! ```
//!
//! ## Usage
//!
//! ```
//! use beacondsl::{parse, Codec, Endianness, ResolvedLayout};
//!
//! let layout = parse("m:0-1=beac,i:2-3,d:4-4").expect("compile");
//! let resolved = ResolvedLayout::resolve(layout).expect("resolve");
//! let codec = Codec::new(resolved, Endianness::Big);
//!
//! let record = codec.decode(&[0xbe, 0xac, 0x12, 0x34, 0x09]).expect("decode");
//! assert_eq!(record.identifiers[0].as_u64(), Some(0x1234));
//! assert_eq!(record.data_fields[0].as_u64(), Some(9));
//! ```

pub mod ast;
pub mod codec;
pub mod dump;
pub mod frame;
pub mod lint;
pub mod parser;
pub mod url;
pub mod value;

pub use ast::{FieldKind, FieldSpec, Layout, ResolvedLayout};
pub use codec::{Codec, CodecError, Endianness};
pub use frame::{
    decode_first, decode_scan, BleAdvertisement, MatchedRecord, Pdu, ScanDecodeResult,
    GATT_SERVICE_UUID_PDU_TYPE, MANUFACTURER_DATA_PDU_TYPE,
};
pub use parser::{is_canonical_decimal, parse, LayoutError};
pub use url::{compress_url, decompress_url, validate_url, UrlParts};
pub use value::{DecodedRecord, Value};
