//! Raw address to text conversion.

use core::fmt::Write;

use heapless::String;

/// Longest dotted-quad: `255.255.255.255`.
pub const IPV4_TEXT_BYTES: usize = 15;
/// `AA:BB:CC:DD:EE:FF`.
pub const MAC_TEXT_BYTES: usize = 17;

/// Four decimal octets joined by `.`, no padding.
pub fn format_ipv4(octets: &[u8; 4]) -> String<IPV4_TEXT_BYTES> {
    let mut out = String::new();
    // Capacity covers the widest possible address.
    let _ = write!(
        out,
        "{}.{}.{}.{}",
        octets[0], octets[1], octets[2], octets[3]
    );
    out
}

/// Six uppercase, zero-padded hex pairs joined by `:`.
pub fn format_mac(bytes: &[u8; 6]) -> String<MAC_TEXT_BYTES> {
    let mut out = String::new();
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

pub(crate) fn labeled<const N: usize>(label: &str, value: &str) -> String<N> {
    let mut out = String::new();
    let _ = out.push_str(label);
    for ch in value.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
