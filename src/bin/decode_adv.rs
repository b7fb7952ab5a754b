//! Decode advertisement bytes against one or more layout descriptors.
//!
//! Usage:
//!   decode_adv <layout> <hex-bytes>
//!   decode_adv --layouts <file> <hex-bytes>   (one descriptor per line, `#` comments)
//!
//! Options:
//!   --pdus       Also dump the PDU framing of the buffer
//!   --little     Use little-endian as the default endianness
//!
//! Hex bytes may contain spaces or `:` separators. Exit code 1 when no
//! layout matched the buffer.

use anyhow::{anyhow, bail, Context, Result};
use beacondsl::dump::record_to_dump;
use beacondsl::{decode_scan, parse, BleAdvertisement, Codec, Endianness, ResolvedLayout};

fn parse_hex_buffer(s: &str) -> Result<Vec<u8>> {
    let clean: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if clean.len() % 2 != 0 {
        bail!("hex buffer must have an even number of digits");
    }
    (0..clean.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&clean[i..i + 2], 16)
                .map_err(|e| anyhow!("invalid hex at offset {}: {}", i, e))
        })
        .collect()
}

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let mut descriptors: Vec<String> = Vec::new();
    if let Some(pos) = args.iter().position(|a| a == "--layouts") {
        args.remove(pos);
        if pos >= args.len() {
            bail!("--layouts needs a file path");
        }
        let path = args.remove(pos);
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            descriptors.push(line.to_string());
        }
        if descriptors.is_empty() {
            bail!("{}: no descriptors", path);
        }
    }
    let show_pdus = if let Some(pos) = args.iter().position(|a| a == "--pdus") {
        args.remove(pos);
        true
    } else {
        false
    };
    let default_endianness = if let Some(pos) = args.iter().position(|a| a == "--little") {
        args.remove(pos);
        Endianness::Little
    } else {
        Endianness::Big
    };

    if descriptors.is_empty() {
        if args.len() != 2 {
            bail!("usage: decode_adv <layout> <hex-bytes> | decode_adv --layouts <file> <hex-bytes>");
        }
        descriptors.push(args.remove(0));
    }
    let bytes = parse_hex_buffer(
        args.first()
            .ok_or_else(|| anyhow!("missing hex bytes"))?,
    )?;

    if show_pdus {
        let adv = BleAdvertisement::parse(&bytes);
        for pdu in adv.pdus() {
            println!(
                "pdu type 0x{:02x}: declared {} byte(s), payload bytes {}-{}",
                pdu.type_code(),
                pdu.declared_length(),
                pdu.start_index(),
                pdu.end_index()
            );
        }
    }

    let mut codecs = Vec::new();
    for (i, descriptor) in descriptors.iter().enumerate() {
        let layout = parse(descriptor).with_context(|| format!("layout {}", i))?;
        let resolved =
            ResolvedLayout::resolve(layout).map_err(|e| anyhow!("layout {}: {}", i, e))?;
        codecs.push(Codec::new(resolved, default_endianness));
    }

    let result = decode_scan(&codecs, &bytes);
    for m in &result.records {
        println!("layout {} ({}) matched:", m.layout_index, descriptors[m.layout_index]);
        println!("{}", record_to_dump(codecs[m.layout_index].layout(), &m.record));
    }
    for r in &result.rejected {
        eprintln!("layout {}: {}", r.layout_index, r.reason);
    }
    if result.records.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
