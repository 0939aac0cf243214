//! Network layer protocols implementation
//!
//! This module contains the wire formats of the network layer:
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol

pub mod icmp;
pub mod ipv4;

// Re-export commonly used items
pub use icmp::IcmpHeader;
pub use ipv4::{flags, protocol, Ipv4Header};

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result.
/// This is used for IP, ICMP and UDP checksums.
pub fn checksum(data: &[u8]) -> u16 {
    finish(sum_words(0, data))
}

/// Add `data` to a running one's complement sum (odd tail padded with zero)
pub(crate) fn sum_words(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    sum
}

/// Fold carries and return the one's complement
pub(crate) fn finish(mut sum: u32) -> u16 {
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !sum as u16
}
