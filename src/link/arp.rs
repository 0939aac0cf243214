//! ARP packet layout for Ethernet/IPv4 (RFC 826)
//!
//! ```text
//! [0..2]   hardware type       [2..4]   protocol type
//! [4]      hardware addr len   [5]      protocol addr len
//! [6..8]   opcode
//! [8..14]  sender MAC          [14..18] sender IP
//! [18..24] target MAC          [24..28] target IP
//! ```

use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder};

use super::{ethertype, MacAddr};
use crate::error::DropReason;

pub const ARP_PACKET_LEN: usize = 28;
pub const ARP_HW_ETHERNET: u16 = 1;
const MAC_LEN: u8 = 6;
const IPV4_LEN: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

impl ArpOp {
    fn from_u16(op: u16) -> Option<Self> {
        match op {
            1 => Some(ArpOp::Request),
            2 => Some(ArpOp::Reply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub op: ArpOp,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        ArpPacket {
            op: ArpOp::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::ZERO,
            target_ip,
        }
    }

    pub fn reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpPacket {
            op: ArpOp::Reply,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// Parse and validate an Ethernet/IPv4 ARP packet
    pub fn parse(data: &[u8]) -> Result<Self, DropReason> {
        if data.len() < ARP_PACKET_LEN {
            return Err(DropReason::Truncated(ARP_PACKET_LEN));
        }

        let hw_type = BigEndian::read_u16(&data[0..2]);
        if hw_type != ARP_HW_ETHERNET {
            return Err(DropReason::BadHardwareType(hw_type));
        }
        let proto_type = BigEndian::read_u16(&data[2..4]);
        if proto_type != ethertype::IPV4 {
            return Err(DropReason::BadProtocolType(proto_type));
        }
        let (hw, proto) = (data[4], data[5]);
        if hw != MAC_LEN || proto != IPV4_LEN {
            return Err(DropReason::BadAddressLength { hw, proto });
        }
        let opcode = BigEndian::read_u16(&data[6..8]);
        let op = ArpOp::from_u16(opcode).ok_or(DropReason::BadOpcode(opcode))?;

        Ok(ArpPacket {
            op,
            sender_mac: MacAddr::from_slice(&data[8..14]),
            sender_ip: ipv4_at(data, 14),
            target_mac: MacAddr::from_slice(&data[18..24]),
            target_ip: ipv4_at(data, 24),
        })
    }

    pub fn to_bytes(&self) -> [u8; ARP_PACKET_LEN] {
        let mut bytes = [0u8; ARP_PACKET_LEN];
        BigEndian::write_u16(&mut bytes[0..2], ARP_HW_ETHERNET);
        BigEndian::write_u16(&mut bytes[2..4], ethertype::IPV4);
        bytes[4] = MAC_LEN;
        bytes[5] = IPV4_LEN;
        BigEndian::write_u16(&mut bytes[6..8], self.op as u16);
        bytes[8..14].copy_from_slice(&self.sender_mac.0);
        bytes[14..18].copy_from_slice(&self.sender_ip.octets());
        bytes[18..24].copy_from_slice(&self.target_mac.0);
        bytes[24..28].copy_from_slice(&self.target_ip.octets());
        bytes
    }
}

fn ipv4_at(data: &[u8], at: usize) -> Ipv4Addr {
    Ipv4Addr::new(data[at], data[at + 1], data[at + 2], data[at + 3])
}
