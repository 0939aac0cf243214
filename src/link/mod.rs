//! Link layer
//!
//! This module contains the pieces that sit directly on the wire:
//! - Ethernet II framing
//! - ARP packet layout
//! - The raw frame transport ([`Device`]) and its implementations

pub mod arp;
pub mod device;
pub mod ethernet;

use std::fmt;
use std::io;

pub use arp::{ArpOp, ArpPacket};
pub use device::{QueueDevice, TapDevice};
pub use ethernet::EthernetHeader;

/// EtherType values understood by the stack
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
}

/// A 48-bit Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        MacAddr([a, b, c, d, e, f])
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Group bit set (includes broadcast)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[..6]);
        MacAddr(mac)
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        MacAddr(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

/// Raw frame transport underneath the Ethernet layer.
///
/// Both operations are non-blocking. `recv` returns the number of bytes
/// written into `buf`, with 0 meaning no frame is waiting. `transmit` is
/// best effort: the stack logs a returned error and moves on, it never
/// retries or reports it upward.
pub trait Device {
    fn transmit(&mut self, frame: &[u8]) -> io::Result<()>;

    fn recv(&mut self, buf: &mut [u8]) -> usize;
}

impl<T: Device + ?Sized> Device for &mut T {
    fn transmit(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).transmit(frame)
    }

    fn recv(&mut self, buf: &mut [u8]) -> usize {
        (**self).recv(buf)
    }
}
