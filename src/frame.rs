//! Advertisement framing and multi-layout scanning.
//!
//! Raw scan data is a sequence of length/type/payload units (PDUs); the
//! main advertisement occupies the first 31 bytes and a scan response, when
//! present, starts at offset 31. Trying several compiled layouts against
//! one buffer also lives here: `NoMatch` against one layout falls through
//! to the next, never aborting the scan.

use crate::codec::{Codec, CodecError};
use crate::value::DecodedRecord;

pub const MANUFACTURER_DATA_PDU_TYPE: u8 = 0xff;
pub const GATT_SERVICE_UUID_PDU_TYPE: u8 = 0x16;

/// One length/type/payload unit inside an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pdu {
    type_code: u8,
    declared_length: usize,
    start_index: usize,
    end_index: usize,
}

impl Pdu {
    /// Parse a PDU whose length byte sits at `start_index`. The end index is
    /// clamped to the buffer, so the actual length may be shorter than the
    /// declared one.
    pub fn parse(bytes: &[u8], start_index: usize) -> Option<Pdu> {
        if bytes.len().saturating_sub(start_index) < 2 {
            return None;
        }
        let declared_length = bytes[start_index] as usize;
        if declared_length == 0 {
            return None;
        }
        let type_code = bytes[start_index + 1];
        let first_index = start_index + 2;
        if first_index >= bytes.len() {
            return None;
        }
        // The length field counts the type byte but not itself.
        let mut end_index = start_index + declared_length;
        if end_index >= bytes.len() {
            end_index = bytes.len() - 1;
        }
        Some(Pdu {
            type_code,
            declared_length,
            start_index: first_index,
            end_index,
        })
    }

    pub fn type_code(&self) -> u8 {
        self.type_code
    }

    /// Length from the PDU header.
    pub fn declared_length(&self) -> usize {
        self.declared_length
    }

    /// Payload length actually available (less than declared when the
    /// buffer ends early; zero for a type-only PDU).
    pub fn actual_length(&self) -> usize {
        self.end_index + 1 - self.start_index
    }

    /// First payload byte (the length and type bytes sit just before it).
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Payload slice within the buffer the PDU was parsed from.
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.start_index..=self.end_index]
    }
}

/// The PDUs of one advertisement: main advert plus optional scan response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleAdvertisement {
    pdus: Vec<Pdu>,
}

impl BleAdvertisement {
    pub fn parse(bytes: &[u8]) -> Self {
        let mut pdus = Vec::new();
        parse_pdus(bytes, 0, bytes.len().min(31), &mut pdus);
        // The platform layer appends the scan response at offset 31.
        if bytes.len() > 31 {
            parse_pdus(bytes, 31, bytes.len(), &mut pdus);
        }
        BleAdvertisement { pdus }
    }

    pub fn pdus(&self) -> &[Pdu] {
        &self.pdus
    }
}

fn parse_pdus(bytes: &[u8], start_index: usize, end_index: usize, pdus: &mut Vec<Pdu>) {
    let mut index = start_index;
    while index < end_index {
        match Pdu::parse(bytes, index) {
            Some(pdu) => {
                index += pdu.declared_length() + 1;
                pdus.push(pdu);
            }
            None => break,
        }
    }
}

/// Outcome of trying several compiled layouts against one buffer.
#[derive(Debug)]
pub struct ScanDecodeResult {
    /// Layouts the buffer satisfied, with their records.
    pub records: Vec<MatchedRecord>,
    /// Layouts the buffer did not satisfy, with the reason.
    pub rejected: Vec<RejectedLayout>,
}

#[derive(Debug)]
pub struct MatchedRecord {
    pub layout_index: usize,
    pub record: DecodedRecord,
}

#[derive(Debug)]
pub struct RejectedLayout {
    pub layout_index: usize,
    pub reason: CodecError,
}

/// Try every codec against the buffer. Retrying across layouts is this
/// function's job, never the single-layout codec's.
pub fn decode_scan(codecs: &[Codec], bytes: &[u8]) -> ScanDecodeResult {
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    for (layout_index, codec) in codecs.iter().enumerate() {
        match codec.decode(bytes) {
            Ok(record) => records.push(MatchedRecord {
                layout_index,
                record,
            }),
            Err(reason) => rejected.push(RejectedLayout {
                layout_index,
                reason,
            }),
        }
    }
    ScanDecodeResult { records, rejected }
}

/// First layout the buffer satisfies, in declaration order.
pub fn decode_first(codecs: &[Codec], bytes: &[u8]) -> Option<MatchedRecord> {
    codecs.iter().enumerate().find_map(|(layout_index, codec)| {
        codec.decode(bytes).ok().map(|record| MatchedRecord {
            layout_index,
            record,
        })
    })
}
