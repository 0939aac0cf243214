//! UDP (User Datagram Protocol) implementation
//!
//! This module provides UDP header parsing and the pseudo-header checksum.

use std::net::Ipv4Addr;

use crate::network::ipv4::protocol;
use crate::network::{finish, sum_words};
use byteorder::{BigEndian, ByteOrder};

/// UDP header length in bytes
pub const UDP_HEADER_LEN: usize = 8;

/// UDP packet header structure
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16, // Length of UDP header and data
    pub checksum: u16,
}

impl UdpHeader {
    /// Parse UDP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid UDP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < UDP_HEADER_LEN {
            return None;
        }

        Some(UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            length: BigEndian::read_u16(&data[4..6]),
            checksum: BigEndian::read_u16(&data[6..8]),
        })
    }

    /// Convert UDP header to bytes
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length);
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
        bytes
    }
}

/// Checksum over the IPv4 pseudo header followed by `segment`
///
/// A segment whose checksum field is already filled sums to zero.
pub fn udp_checksum(src: Ipv4Addr, dst: Ipv4Addr, segment: &[u8]) -> u16 {
    // src(4) + dst(4) + zero(1) + protocol(1) + length(2)
    let mut pseudo = [0u8; 12];
    pseudo[0..4].copy_from_slice(&src.octets());
    pseudo[4..8].copy_from_slice(&dst.octets());
    pseudo[9] = protocol::UDP;
    BigEndian::write_u16(&mut pseudo[10..12], segment.len() as u16);

    finish(sum_words(sum_words(0, &pseudo), segment))
}

/// Build a complete UDP segment with its checksum filled in
pub fn build_segment(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let header = UdpHeader {
        src_port,
        dst_port,
        length: (UDP_HEADER_LEN + payload.len()) as u16,
        checksum: 0,
    };

    let mut segment = Vec::with_capacity(UDP_HEADER_LEN + payload.len());
    segment.extend_from_slice(&header.to_bytes());
    segment.extend_from_slice(payload);

    // zero means "no checksum" on the wire
    let sum = match udp_checksum(src, dst, &segment) {
        0 => 0xFFFF,
        sum => sum,
    };
    BigEndian::write_u16(&mut segment[6..8], sum);
    segment
}
