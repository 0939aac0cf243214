//! Ethernet II header
//!
//! ```text
//! [0..6]   destination MAC
//! [6..12]  source MAC
//! [12..14] EtherType (big-endian)
//! ```

use byteorder::{BigEndian, ByteOrder};

use super::MacAddr;

pub const ETHERNET_HEADER_LEN: usize = 14;
/// Smallest payload a frame may carry; shorter payloads are zero padded
pub const ETHERNET_MIN_PAYLOAD: usize = 46;
/// Largest payload a frame may carry
pub const ETHERNET_MAX_PAYLOAD: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl EthernetHeader {
    /// Parse an Ethernet header from the start of a frame
    ///
    /// Returns None if the frame is shorter than the header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        Some(EthernetHeader {
            dst: MacAddr::from_slice(&data[0..6]),
            src: MacAddr::from_slice(&data[6..12]),
            ethertype: BigEndian::read_u16(&data[12..14]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ETHERNET_HEADER_LEN] {
        let mut bytes = [0u8; ETHERNET_HEADER_LEN];
        self.write(&mut bytes);
        bytes
    }

    /// Serialize into the first 14 bytes of `buf`
    pub fn write(&self, buf: &mut [u8]) {
        buf[0..6].copy_from_slice(&self.dst.0);
        buf[6..12].copy_from_slice(&self.src.0);
        BigEndian::write_u16(&mut buf[12..14], self.ethertype);
    }
}
