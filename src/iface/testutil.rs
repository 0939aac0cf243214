//! Frame builders shared by the unit tests

use std::net::Ipv4Addr;

use crate::config::StackConfig;
use crate::iface::NetStack;
use crate::link::ethernet::ETHERNET_HEADER_LEN;
use crate::link::{ethertype, ArpOp, ArpPacket, EthernetHeader, MacAddr, QueueDevice};
use crate::network::ipv4::{Ipv4Header, IPV4_HEADER_LEN};
use crate::table::ManualClock;

pub const LOCAL_MAC: MacAddr = MacAddr::new(0x02, 0, 0, 0, 0, 0x02);
pub const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
pub const PEER_MAC: MacAddr = MacAddr::new(0x02, 0, 0, 0, 0, 0x03);
pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 3);

pub type TestStack = NetStack<QueueDevice, ManualClock>;

pub fn local_config() -> StackConfig {
    StackConfig::new(LOCAL_MAC, LOCAL_IP)
}

/// Stack with the startup announcement already drained
pub fn test_stack() -> (TestStack, ManualClock) {
    let clock = ManualClock::new();
    let mut stack = NetStack::with_clock(local_config(), QueueDevice::new(), clock.clone())
        .expect("valid config");
    stack.device_mut().drain_transmitted();
    (stack, clock)
}

/// Stack that already knows PEER_IP is at PEER_MAC
pub fn resolved_stack() -> (TestStack, ManualClock) {
    let (mut stack, clock) = test_stack();
    deliver(&mut stack, arp_frame(ArpOp::Reply, PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP));
    stack.device_mut().drain_transmitted();
    (stack, clock)
}

pub fn deliver(stack: &mut TestStack, frame: Vec<u8>) {
    stack.device_mut().inject(frame);
    assert!(stack.poll());
}

pub fn ethernet_frame(dst: MacAddr, src: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let header = EthernetHeader { dst, src, ethertype };
    let mut frame = header.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

/// ARP packet from `sender_mac`, broadcast for requests and unicast otherwise
pub fn arp_frame(
    op: ArpOp,
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let packet = ArpPacket {
        op,
        sender_mac,
        sender_ip,
        target_mac,
        target_ip,
    };
    let dst = match op {
        ArpOp::Request => MacAddr::BROADCAST,
        ArpOp::Reply => target_mac,
    };
    ethernet_frame(dst, sender_mac, ethertype::ARP, &packet.to_bytes())
}

pub fn ipv4_packet(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = (IPV4_HEADER_LEN + payload.len()) as u16;
    let mut header = Ipv4Header::fragment(total_len, 0x4242, 0, false, protocol, src, dst);
    header.update_checksum();
    let mut packet = header.to_bytes().to_vec();
    packet.extend_from_slice(payload);
    packet
}

/// IPv4 datagram from the peer wrapped in an Ethernet frame
pub fn ipv4_frame(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, payload: &[u8]) -> Vec<u8> {
    let packet = ipv4_packet(src, dst, protocol, payload);
    ethernet_frame(LOCAL_MAC, PEER_MAC, ethertype::IPV4, &packet)
}

pub fn split_frame(frame: &[u8]) -> (EthernetHeader, &[u8]) {
    let header = EthernetHeader::from_bytes(frame).expect("frame header");
    (header, &frame[ETHERNET_HEADER_LEN..])
}

/// Split an IPv4-carrying frame into its IP header and exact IP payload
pub fn split_ipv4(frame: &[u8]) -> (Ipv4Header, &[u8]) {
    let (eth, packet) = split_frame(frame);
    assert_eq!(eth.ethertype, ethertype::IPV4);
    let header = Ipv4Header::parse(packet).expect("ipv4 header");
    let end = header.total_len as usize;
    (header, &packet[IPV4_HEADER_LEN..end])
}
