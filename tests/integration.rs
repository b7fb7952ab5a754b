//! Integration tests: compile layouts, decode/encode advertisement buffers,
//! PDU framing, and multi-layout scanning.

use beacondsl::{
    decode_first, decode_scan, parse, BleAdvertisement, Codec, CodecError, DecodedRecord,
    Endianness, Pdu, ResolvedLayout, Value, GATT_SERVICE_UUID_PDU_TYPE,
    MANUFACTURER_DATA_PDU_TYPE,
};
use std::io::Write;
use std::sync::Arc;

const ALTBEACON_LAYOUT: &str = "m:2-3=beac,i:4-19,i:20-21,i:22-23,p:24-24,d:25-25";

fn codec_for(descriptor: &str) -> Codec {
    let layout = parse(descriptor).expect("parse");
    let resolved = ResolvedLayout::resolve(layout).expect("resolve");
    Codec::new(resolved, Endianness::Big)
}

/// 26-byte AltBeacon-shaped buffer: gate at 2-3, 16-byte id, two u16 ids,
/// power byte, one data byte.
fn altbeacon_buffer() -> Vec<u8> {
    let mut b = vec![0u8; 26];
    b[2] = 0xbe;
    b[3] = 0xac;
    for (i, x) in b[4..20].iter_mut().enumerate() {
        *x = i as u8;
    }
    b[21] = 0x01;
    b[23] = 0x02;
    b[24] = 0xc5; // -59 dBm
    b[25] = 0x42;
    b
}

// ==================== Decoding ====================

#[test]
fn decode_altbeacon_record() {
    let codec = codec_for(ALTBEACON_LAYOUT);
    let record = codec.decode(&altbeacon_buffer()).expect("decode");
    assert_eq!(record.identifiers.len(), 3);
    let uuid: Vec<u8> = (0..16).collect();
    assert_eq!(record.identifiers[0], Value::Bytes(uuid));
    assert_eq!(record.identifiers[1].as_u64(), Some(1));
    assert_eq!(record.identifiers[2].as_u64(), Some(2));
    assert_eq!(record.tx_power, Some(-59));
    assert_eq!(record.data_fields.len(), 1);
    assert_eq!(record.data_fields[0].as_u64(), Some(0x42));
}

#[test]
fn decode_is_idempotent() {
    let codec = codec_for(ALTBEACON_LAYOUT);
    let buffer = altbeacon_buffer();
    let a = codec.decode(&buffer).expect("decode");
    let b = codec.decode(&buffer).expect("decode");
    assert_eq!(a, b);
}

#[test]
fn little_endian_modifier() {
    let codec = codec_for("m:0-0=01,d:1-2l");
    let record = codec.decode(&[0x01, 0x34, 0x12]).expect("decode");
    assert_eq!(record.data_fields[0].as_u64(), Some(0x1234));
}

#[test]
fn conflicting_modifiers_last_wins() {
    // `bl`: little wins; `lb`: big wins.
    let little = codec_for("m:0-0=01,d:1-2bl");
    let record = little.decode(&[0x01, 0x34, 0x12]).expect("decode");
    assert_eq!(record.data_fields[0].as_u64(), Some(0x1234));

    let big = codec_for("m:0-0=01,d:1-2lb");
    let record = big.decode(&[0x01, 0x12, 0x34]).expect("decode");
    assert_eq!(record.data_fields[0].as_u64(), Some(0x1234));
}

#[test]
fn default_endianness_is_a_codec_setting() {
    let layout = parse("d:0-1").expect("parse");
    let resolved = ResolvedLayout::resolve(layout).expect("resolve");
    let big = Codec::new(resolved.clone(), Endianness::Big);
    let little = Codec::new(resolved, Endianness::Little);
    assert_eq!(
        big.decode(&[0x12, 0x34]).expect("decode").data_fields[0].as_u64(),
        Some(0x1234)
    );
    assert_eq!(
        little.decode(&[0x34, 0x12]).expect("decode").data_fields[0].as_u64(),
        Some(0x1234)
    );
}

#[test]
fn no_match_short_circuits() {
    // The buffer is long enough for the gate but not for the identifier:
    // the mismatch must be reported without the identifier being touched.
    let codec = codec_for("m:0-1=beac,i:2-3");
    let err = codec.decode(&[0x00, 0x00]).expect_err("must not match");
    assert!(matches!(err, CodecError::NoMatch { index: 0 }), "{:?}", err);
}

#[test]
fn out_of_range_identifier() {
    let codec = codec_for("m:0-1=beac,i:2-3");
    let err = codec.decode(&[0xbe, 0xac]).expect_err("short buffer");
    assert!(
        matches!(
            err,
            CodecError::OutOfRange {
                index: 1,
                start: 2,
                end: 3,
                buffer_len: 2
            }
        ),
        "{:?}",
        err
    );
}

#[test]
fn out_of_range_applies_to_url_fields_too() {
    // No silent truncated read, even for variable-length flagged terms.
    let codec = codec_for("i:0-5v");
    let err = codec.decode(&[0x02, b'a', 0x07, 0x00]).expect_err("short");
    assert!(matches!(err, CodecError::OutOfRange { .. }), "{:?}", err);
}

#[test]
fn out_of_range_match_field() {
    let codec = codec_for("m:2-3=beac");
    let err = codec.decode(&[0x00]).expect_err("short buffer");
    assert!(matches!(err, CodecError::OutOfRange { index: 0, .. }), "{:?}", err);
}

// ==================== URL identifier fields ====================

#[test]
fn url_field_decodes_and_validates() {
    let codec = codec_for("m:0-0=10,i:1-3v");
    let record = codec.decode(&[0x10, 0x02, b'a', 0x07]).expect("decode");
    assert_eq!(record.identifiers[0].as_url(), Some("http://a.com"));
    assert!(record.identifiers[0].is_valid_url());
}

#[test]
fn url_field_bad_prefix_is_flagged_not_fatal() {
    let codec = codec_for("m:0-0=10,i:1-3v");
    let record = codec.decode(&[0x10, 0xff, b'a', 0x07]).expect("decode");
    assert_eq!(
        record.identifiers[0],
        Value::InvalidUrl(vec![0xff, b'a', 0x07])
    );
    assert!(!record.identifiers[0].is_valid_url());
}

#[test]
fn url_field_failing_grammar_is_flagged() {
    // Decompresses to "http://%", which the URL shape rejects.
    let codec = codec_for("m:0-0=10,i:1-2v");
    let record = codec.decode(&[0x10, 0x02, b'%']).expect("decode");
    assert!(!record.identifiers[0].is_valid_url());
}

// ==================== Encoding ====================

#[test]
fn encode_decode_roundtrip() {
    let codec = codec_for(ALTBEACON_LAYOUT);
    let buffer = altbeacon_buffer();
    let record = codec.decode(&buffer).expect("decode");
    let encoded = codec.encode(&record).expect("encode");
    // Bytes 0-1 are not covered by any term and encode as zero, matching
    // the zeroed prefix of the source buffer.
    assert_eq!(encoded, buffer);
    assert_eq!(codec.decode(&encoded).expect("decode"), record);
}

#[test]
fn encode_url_field() {
    let codec = codec_for("m:0-0=10,i:1-3v");
    let record = DecodedRecord {
        identifiers: vec![Value::Url("http://a.com".to_string())],
        ..DecodedRecord::default()
    };
    let encoded = codec.encode(&record).expect("encode");
    assert_eq!(encoded, vec![0x10, 0x02, b'a', 0x07]);
}

#[test]
fn encode_little_endian_field() {
    let codec = codec_for("m:0-0=01,d:1-2l");
    let record = DecodedRecord {
        data_fields: vec![Value::Unsigned(0x1234)],
        ..DecodedRecord::default()
    };
    let encoded = codec.encode(&record).expect("encode");
    assert_eq!(encoded, vec![0x01, 0x34, 0x12]);
}

#[test]
fn encode_rejects_oversized_value() {
    let codec = codec_for("m:0-0=01,d:1-1");
    let record = DecodedRecord {
        data_fields: vec![Value::Unsigned(256)],
        ..DecodedRecord::default()
    };
    let err = codec.encode(&record).expect_err("256 does not fit one byte");
    assert!(matches!(err, CodecError::ValueMismatch { .. }), "{:?}", err);
}

#[test]
fn encode_rejects_field_count_mismatch() {
    let codec = codec_for("m:0-0=01,i:1-2");
    let err = codec
        .encode(&DecodedRecord::default())
        .expect_err("missing identifier");
    assert!(matches!(err, CodecError::ValueMismatch { .. }), "{:?}", err);
}

#[test]
fn encode_rejects_missing_power() {
    let codec = codec_for("m:0-0=01,p:1-1");
    let err = codec
        .encode(&DecodedRecord::default())
        .expect_err("missing power");
    assert!(matches!(err, CodecError::ValueMismatch { .. }), "{:?}", err);
}

#[test]
fn encode_signed_power() {
    let codec = codec_for("m:0-0=01,p:1-1");
    let record = DecodedRecord {
        tx_power: Some(-59),
        ..DecodedRecord::default()
    };
    let encoded = codec.encode(&record).expect("encode");
    assert_eq!(encoded, vec![0x01, 0xc5]);
}

// ==================== PDU framing ====================

#[test]
fn pdu_framing_ibeacon_shape() {
    // Flags PDU (len 2, type 0x01) then manufacturer data PDU (len 26).
    let mut bytes = vec![0x02, 0x01, 0x06, 0x1a, 0xff];
    bytes.extend_from_slice(&[0u8; 25]);
    assert_eq!(bytes.len(), 30);
    let adv = BleAdvertisement::parse(&bytes);
    let pdus = adv.pdus();
    assert_eq!(pdus.len(), 2);
    assert_eq!(pdus[0].type_code(), 0x01);
    assert_eq!(pdus[0].payload(&bytes), &[0x06]);
    assert_eq!(pdus[1].type_code(), MANUFACTURER_DATA_PDU_TYPE);
    assert_eq!(pdus[1].start_index(), 5);
    assert_eq!(pdus[1].end_index(), 29);
    assert_eq!(pdus[1].actual_length(), 25);
}

#[test]
fn pdu_truncated_buffer_clamps_end() {
    let bytes = [0x05, 0x16, 0xaa, 0xfe];
    let pdu = Pdu::parse(&bytes, 0).expect("pdu");
    assert_eq!(pdu.type_code(), GATT_SERVICE_UUID_PDU_TYPE);
    assert_eq!(pdu.declared_length(), 5);
    assert_eq!(pdu.actual_length(), 2);
    assert_eq!(pdu.payload(&bytes), &[0xaa, 0xfe]);
}

#[test]
fn pdu_zero_length_stops_parsing() {
    assert!(Pdu::parse(&[0x00, 0x01, 0x02], 0).is_none());
    assert!(BleAdvertisement::parse(&[0x00, 0x01, 0x02]).pdus().is_empty());
}

#[test]
fn pdu_scan_response_at_offset_31() {
    let mut bytes = vec![0u8; 62];
    bytes[0] = 0x02;
    bytes[1] = 0x01;
    bytes[2] = 0x06;
    bytes[31] = 0x03;
    bytes[32] = 0x16;
    bytes[33] = 0xaa;
    bytes[34] = 0xfe;
    let adv = BleAdvertisement::parse(&bytes);
    let pdus = adv.pdus();
    assert_eq!(pdus.len(), 2);
    assert_eq!(pdus[0].type_code(), 0x01);
    assert_eq!(pdus[1].type_code(), GATT_SERVICE_UUID_PDU_TYPE);
    assert_eq!(pdus[1].payload(&bytes), &[0xaa, 0xfe]);
}

// ==================== Multi-layout scanning ====================

#[test]
fn scan_falls_through_to_matching_layout() {
    let codecs = vec![codec_for(ALTBEACON_LAYOUT), codec_for("m:0-1=4c00,i:2-3")];
    let bytes = [0x4c, 0x00, 0x12, 0x34];
    let result = decode_scan(&codecs, &bytes);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].layout_index, 1);
    assert_eq!(result.records[0].record.identifiers[0].as_u64(), Some(0x1234));
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].layout_index, 0);
}

#[test]
fn decode_first_respects_declaration_order() {
    let codecs = vec![codec_for("m:0-0=4c"), codec_for("m:0-1=4c00")];
    let matched = decode_first(&codecs, &[0x4c, 0x00]).expect("match");
    assert_eq!(matched.layout_index, 0);
}

#[test]
fn decode_first_none_when_nothing_matches() {
    let codecs = vec![codec_for(ALTBEACON_LAYOUT)];
    assert!(decode_first(&codecs, &[0x00, 0x00, 0x00, 0x00]).is_none());
}

// ==================== Sharing across threads ====================

#[test]
fn codec_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Codec>();

    let codec = Arc::new(codec_for(ALTBEACON_LAYOUT));
    let buffer = Arc::new(altbeacon_buffer());
    let expected = codec.decode(&buffer).expect("decode");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let codec = Arc::clone(&codec);
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || codec.decode(&buffer).expect("decode"))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().expect("join"), expected);
    }
}

// ==================== Descriptor files ====================

#[test]
fn layouts_load_from_a_descriptor_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "# beacon layouts").expect("write");
    writeln!(file, "{}", ALTBEACON_LAYOUT).expect("write");
    writeln!(file, "m:0-1=4c00,i:2-3").expect("write");
    file.flush().expect("flush");

    let text = std::fs::read_to_string(file.path()).expect("read");
    let codecs: Vec<Codec> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(codec_for)
        .collect();
    assert_eq!(codecs.len(), 2);

    let result = decode_scan(&codecs, &[0x4c, 0x00, 0x12, 0x34]);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].layout_index, 1);
}
