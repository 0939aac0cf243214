//! IPv4 protocol implementation
//!
//! This module provides IPv4 header parsing, validation and serialization.
//!
//! Features:
//! - IPv4 header parsing with version/length checks
//! - Checksum calculation and validation
//! - Fragment header construction

use std::net::Ipv4Addr;

use crate::error::DropReason;
use crate::network::{finish, sum_words};
use byteorder::{BigEndian, ByteOrder};

pub const IPV4_HEADER_LEN: usize = 20;
/// Largest total length an IPv4 datagram can declare
pub const IPV4_MAX_DATAGRAM: usize = u16::MAX as usize;
const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)
pub const DEFAULT_TTL: u8 = 64;

/// IPv4 packet header structure
///
/// Represents the fixed 20-byte part of the IPv4 header as defined in RFC 791.
/// Options are skipped on receive and never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
}

impl Ipv4Header {
    /// Header for one outbound fragment
    ///
    /// `offset` is in 8-byte units. The checksum is left at zero; call
    /// [`update_checksum`](Self::update_checksum) once all fields are final.
    pub fn fragment(
        total_len: u16,
        id: u16,
        offset: u16,
        more_fragments: bool,
        protocol: u8,
        src_addr: Ipv4Addr,
        dst_addr: Ipv4Addr,
    ) -> Self {
        let mf = if more_fragments { flags::MORE_FRAGMENTS } else { 0 };
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len,
            id,
            flags_frag_offset: mf | (offset & flags::FRAGMENT_OFFSET_MASK),
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// Parse and sanity-check an IPv4 header
    ///
    /// Rejects short buffers, versions other than 4 and header lengths that do
    /// not fit the buffer. Checksum and total length are checked separately.
    pub fn parse(data: &[u8]) -> Result<Self, DropReason> {
        if data.len() < IPV4_HEADER_LEN {
            return Err(DropReason::Truncated(IPV4_HEADER_LEN));
        }

        let version = data[0] >> 4;
        if version != IPV4_VERSION {
            return Err(DropReason::BadVersion(version));
        }

        let ihl = data[0] & 0x0F;
        let header_len = ihl as usize * 4;
        if ihl < DEFAULT_IHL || header_len > data.len() {
            return Err(DropReason::BadHeaderLength(header_len));
        }

        Ok(Ipv4Header {
            version,
            ihl,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            dst_addr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }

    /// Convert IPv4 header to bytes
    ///
    /// Serializes the header to a 20-byte array ready for transmission
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | self.ihl;
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr.octets());
        bytes[16..20].copy_from_slice(&self.dst_addr.octets());

        bytes
    }

    /// Recalculate the checksum field over the serialized header
    pub fn update_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = checksum_ignoring_field(&self.to_bytes());
    }

    /// Get the header length in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// Get payload length
    ///
    /// Returns the length of the payload (total length - header length)
    pub fn payload_len(&self) -> usize {
        (self.total_len as usize).saturating_sub(self.header_len())
    }

    pub fn more_fragments(&self) -> bool {
        self.flags_frag_offset & flags::MORE_FRAGMENTS != 0
    }

    /// Fragment offset in 8-byte units
    pub fn fragment_offset(&self) -> u16 {
        self.flags_frag_offset & flags::FRAGMENT_OFFSET_MASK
    }
}

/// Check the checksum of a raw header (options included).
///
/// The sum is taken as if the checksum field were zero, which leaves `header`
/// untouched for later consumers.
pub fn verify_checksum(header: &[u8]) -> bool {
    if header.len() < IPV4_HEADER_LEN {
        return false;
    }
    BigEndian::read_u16(&header[10..12]) == checksum_ignoring_field(header)
}

fn checksum_ignoring_field(header: &[u8]) -> u16 {
    finish(sum_words(sum_words(0, &header[..10]), &header[12..]))
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// IPv4 flags constants
pub mod flags {
    pub const MORE_FRAGMENTS: u16 = 0x2000;
    pub const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;
}
