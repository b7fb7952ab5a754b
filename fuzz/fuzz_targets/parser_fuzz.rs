//! Parser fuzz target: feed arbitrary strings to the descriptor compiler
//! and the URL validator. Neither must panic; both return explicit results.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = beacondsl::parse(s);
    let _ = beacondsl::validate_url(s);
    let _ = beacondsl::decompress_url(data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
