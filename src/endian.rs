//! Big-endian conversions for the PBF frame-length prefix.
//!
//! Host endianness is probed once via a static two-byte value, mirroring
//! `astrolib::meta::endian` from the original indexer: a `u16` with distinct
//! bytes is reinterpreted and the low byte is inspected.

use std::sync::OnceLock;

fn host_is_big_endian() -> bool {
    static IS_BIG: OnceLock<bool> = OnceLock::new();
    *IS_BIG.get_or_init(|| {
        let probe: u16 = 0x0001;
        probe.to_ne_bytes()[0] == 0x00
    })
}

/// Converts a big-endian-encoded `u32` to host order.
pub fn be_to_host(value: u32) -> u32 {
    if host_is_big_endian() {
        value
    } else {
        value.swap_bytes()
    }
}

/// Converts a host-order `u32` to big-endian encoding.
pub fn host_to_be(value: u32) -> u32 {
    // Swapping twice is an involution, so the same function handles both
    // directions; kept as a distinct name to match call-site intent.
    be_to_host(value)
}
