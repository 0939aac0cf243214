//! Error types
//!
//! Inbound processing never surfaces errors to callers: every malformed or
//! unsupported packet is dropped locally. [`DropReason`] classifies those
//! drops so they can be traced. [`ConfigError`] and [`UdpError`] are the only
//! errors returned through the public API.

use thiserror::Error;

/// Why an inbound packet was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("shorter than the {0}-byte header")]
    Truncated(usize),
    #[error("ip version {0} is not 4")]
    BadVersion(u8),
    #[error("header length {0} is invalid")]
    BadHeaderLength(usize),
    #[error("declared length {declared} does not fit {actual} received bytes")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("header checksum mismatch")]
    BadChecksum,
    #[error("addressed to another host")]
    NotForUs,
    #[error("arp hardware type {0:#06x} is not ethernet")]
    BadHardwareType(u16),
    #[error("arp protocol type {0:#06x} is not ipv4")]
    BadProtocolType(u16),
    #[error("arp address lengths {hw}/{proto} are not 6/4")]
    BadAddressLength { hw: u8, proto: u8 },
    #[error("arp opcode {0} is neither request nor reply")]
    BadOpcode(u16),
    #[error("unsupported ethertype {0:#06x}")]
    UnsupportedEtherType(u16),
    #[error("unsupported ip protocol {0}")]
    UnsupportedProtocol(u8),
    #[error("no listener on udp port {0}")]
    NoListener(u16),
    #[error("payload of {0} bytes exceeds the ipv4 datagram limit")]
    Oversized(usize),
    #[error("fragment offset {0} exceeds the 13-bit field")]
    BadFragmentOffset(u16),
}

/// Rejected [`StackConfig`](crate::StackConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "mtu {0} outside {min}..={max}",
        min = crate::config::MIN_MTU,
        max = crate::config::MAX_MTU
    )]
    InvalidMtu(usize),
    #[error("local mac {0} is not a unicast address")]
    MulticastMac(crate::MacAddr),
    #[error("local ip {0} cannot be assigned to a host")]
    InvalidIp(std::net::Ipv4Addr),
    #[error("{0} must be longer than zero")]
    ZeroDuration(&'static str),
}

/// Errors returned by the application-facing UDP API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UdpError {
    #[error("udp port 0 cannot be bound")]
    PortZero,
    #[error("udp port {0} is already bound")]
    PortInUse(u16),
    #[error("udp payload of {0} bytes is too large")]
    PayloadTooLarge(usize),
}
