//! ICMP (Internet Control Message Protocol) implementation
//!
//! This module provides ICMP header parsing and serialization.
//! It supports Echo Request/Reply and Destination Unreachable messages.

use byteorder::{BigEndian, ByteOrder};

/// ICMP header length in bytes
pub const ICMP_HEADER_LEN: usize = 8;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_UNREACHABLE: u8 = 3;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;

/// Destination Unreachable codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachableCode {
    Network = 0,
    Host = 1,
    Protocol = 2,
    Port = 3,
}

/// ICMP packet header structure
///
/// Represents the standard 8-byte ICMP header as defined in RFC 792
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,  // ICMP message type
    pub msg_code: u8,  // ICMP message code
    pub checksum: u16, // ICMP checksum
    pub rest: [u8; 4], // Type-specific data (e.g., identifier and sequence for echo)
}

impl IcmpHeader {
    /// Destination Unreachable header, checksum not yet filled in
    pub fn unreachable(code: UnreachableCode) -> Self {
        IcmpHeader {
            msg_type: ICMP_TYPE_UNREACHABLE,
            msg_code: code as u8,
            checksum: 0,
            rest: [0; 4],
        }
    }

    /// Parse ICMP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid ICMP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return None;
        }

        Some(IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            rest: [data[4], data[5], data[6], data[7]],
        })
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_LEN] {
        let mut bytes = [0u8; ICMP_HEADER_LEN];
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        bytes[4..8].copy_from_slice(&self.rest);
        bytes
    }

    /// Check if this is an Echo Request message
    pub fn is_echo_request(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REQUEST
    }

    /// Get the identifier field for Echo Request/Reply messages
    pub fn identifier(&self) -> u16 {
        BigEndian::read_u16(&self.rest[0..2])
    }

    /// Get the sequence number field for Echo Request/Reply messages
    pub fn sequence(&self) -> u16 {
        BigEndian::read_u16(&self.rest[2..4])
    }
}

/// Overwrite the checksum of a complete ICMP message in place
pub fn fill_checksum(message: &mut [u8]) {
    message[2..4].copy_from_slice(&[0, 0]);
    let sum = super::checksum(message);
    BigEndian::write_u16(&mut message[2..4], sum);
}
