//! End-to-end exchanges between the stack and a simulated peer

use std::net::Ipv4Addr;
use std::time::Duration;

use toy_netstack::link::ethernet::ETHERNET_HEADER_LEN;
use toy_netstack::link::{ethertype, ArpOp, ArpPacket, EthernetHeader};
use toy_netstack::network::icmp::{self, IcmpHeader, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_UNREACHABLE};
use toy_netstack::network::ipv4::{protocol, Ipv4Header, IPV4_HEADER_LEN};
use toy_netstack::network::checksum;
use toy_netstack::transport::udp::{build_segment, UdpHeader};
use toy_netstack::{MacAddr, ManualClock, NetStack, QueueDevice, StackConfig};

const LOCAL_MAC: MacAddr = MacAddr::new(0x02, 0, 0, 0, 0, 0x02);
const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
const PEER_MAC: MacAddr = MacAddr::new(0x02, 0, 0, 0, 0, 0x03);
const PEER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 3);

type Stack = NetStack<QueueDevice, ManualClock>;

fn start() -> (Stack, ManualClock) {
    let clock = ManualClock::new();
    let config = StackConfig::new(LOCAL_MAC, LOCAL_IP);
    let mut stack = NetStack::with_clock(config, QueueDevice::new(), clock.clone()).unwrap();
    stack.device_mut().drain_transmitted();
    (stack, clock)
}

fn frame(dst: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let header = EthernetHeader {
        dst,
        src: PEER_MAC,
        ethertype,
    };
    let mut frame = header.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

fn peer_arp(op: ArpOp, target_mac: MacAddr) -> Vec<u8> {
    let packet = ArpPacket {
        op,
        sender_mac: PEER_MAC,
        sender_ip: PEER_IP,
        target_mac,
        target_ip: LOCAL_IP,
    };
    let dst = if op == ArpOp::Request {
        MacAddr::BROADCAST
    } else {
        LOCAL_MAC
    };
    frame(dst, ethertype::ARP, &packet.to_bytes())
}

fn peer_datagram(protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = (IPV4_HEADER_LEN + payload.len()) as u16;
    let mut header = Ipv4Header::fragment(total_len, 7, 0, false, protocol, PEER_IP, LOCAL_IP);
    header.update_checksum();
    let mut packet = header.to_bytes().to_vec();
    packet.extend_from_slice(payload);
    frame(LOCAL_MAC, ethertype::IPV4, &packet)
}

fn receive(stack: &mut Stack, frames: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    for frame in frames {
        stack.device_mut().inject(frame);
    }
    stack.run_until_idle();
    stack.device_mut().drain_transmitted()
}

fn parse_arp(frame: &[u8]) -> (EthernetHeader, ArpPacket) {
    let eth = EthernetHeader::from_bytes(frame).unwrap();
    assert_eq!(eth.ethertype, ethertype::ARP);
    (eth, ArpPacket::parse(&frame[ETHERNET_HEADER_LEN..]).unwrap())
}

fn parse_ipv4(frame: &[u8]) -> (EthernetHeader, Ipv4Header, Vec<u8>) {
    let eth = EthernetHeader::from_bytes(frame).unwrap();
    assert_eq!(eth.ethertype, ethertype::IPV4);
    let packet = &frame[ETHERNET_HEADER_LEN..];
    let ip = Ipv4Header::parse(packet).unwrap();
    let payload = packet[IPV4_HEADER_LEN..ip.total_len as usize].to_vec();
    (eth, ip, payload)
}

#[test]
fn fragmented_send_to_unresolved_host() {
    let (mut stack, _) = start();
    let payload: Vec<u8> = (0..1500u32).map(|i| (i % 251) as u8).collect();
    stack.ip_send(&payload, PEER_IP, protocol::UDP);

    // only the request leaves; the first fragment holds the pending slot
    let sent = stack.device_mut().drain_transmitted();
    assert_eq!(sent.len(), 1);
    let (eth, request) = parse_arp(&sent[0]);
    assert_eq!(eth.dst, MacAddr::BROADCAST);
    assert_eq!(request.op, ArpOp::Request);
    assert_eq!(request.sender_ip, LOCAL_IP);
    assert_eq!(request.target_ip, PEER_IP);
    assert!(stack.arp_is_pending(PEER_IP));
    assert_eq!(stack.arp_pending_len(), 1);

    let sent = receive(&mut stack, vec![peer_arp(ArpOp::Reply, LOCAL_MAC)]);
    assert_eq!(sent.len(), 1);
    let (eth, ip, chunk) = parse_ipv4(&sent[0]);
    assert_eq!(eth.dst, PEER_MAC);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(ip.fragment_offset(), 0);
    assert!(ip.more_fragments());
    assert_eq!(chunk, &payload[..1480]);
    assert!(!stack.arp_is_pending(PEER_IP));

    // resolved now, so a resend puts both fragments on the wire
    stack.ip_send(&payload, PEER_IP, protocol::UDP);
    let sent = stack.device_mut().drain_transmitted();
    assert_eq!(sent.len(), 2);
    let (_, first, _) = parse_ipv4(&sent[0]);
    let (_, second, tail) = parse_ipv4(&sent[1]);
    assert_eq!(first.id, second.id);
    assert_eq!(second.fragment_offset(), 185);
    assert!(!second.more_fragments());
    assert_eq!(tail, &payload[1480..]);
}

#[test]
fn ping_from_new_neighbour() {
    let (mut stack, _) = start();
    let mut echo = vec![8, 0, 0, 0, 0xbe, 0xef, 0x00, 0x01];
    echo.extend_from_slice(b"round trip data");
    icmp::fill_checksum(&mut echo);

    let sent = receive(
        &mut stack,
        vec![
            peer_arp(ArpOp::Request, MacAddr::ZERO),
            peer_datagram(protocol::ICMP, &echo),
        ],
    );
    assert_eq!(sent.len(), 2);

    let (eth, reply) = parse_arp(&sent[0]);
    assert_eq!(eth.dst, PEER_MAC);
    assert_eq!(reply.op, ArpOp::Reply);
    assert_eq!(reply.sender_mac, LOCAL_MAC);

    let (eth, ip, message) = parse_ipv4(&sent[1]);
    assert_eq!(eth.dst, PEER_MAC);
    assert_eq!(ip.protocol, protocol::ICMP);
    assert_eq!(ip.src_addr, LOCAL_IP);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(message[0], ICMP_TYPE_ECHO_REPLY);
    assert_eq!(&message[4..], &echo[4..]);
    assert_eq!(checksum(&message), 0);
}

#[test]
fn repeated_requests_each_answered_once() {
    let (mut stack, _) = start();
    for _ in 0..3 {
        let sent = receive(&mut stack, vec![peer_arp(ArpOp::Request, MacAddr::ZERO)]);
        assert_eq!(sent.len(), 1);
        assert_eq!(parse_arp(&sent[0]).1.op, ArpOp::Reply);
    }
    assert_eq!(stack.arp_entries().len(), 1);
}

#[test]
fn silent_host_requeried_after_min_interval() {
    let (mut stack, clock) = start();
    stack.ip_send(b"first", PEER_IP, protocol::UDP);
    assert_eq!(stack.device_mut().drain_transmitted().len(), 1);

    clock.advance(Duration::from_millis(500));
    stack.ip_send(b"second", PEER_IP, protocol::UDP);
    assert!(stack.device().transmitted().is_empty());

    clock.advance(Duration::from_millis(501));
    stack.ip_send(b"third", PEER_IP, protocol::UDP);
    let sent = stack.device_mut().drain_transmitted();
    assert_eq!(sent.len(), 1);
    assert_eq!(parse_arp(&sent[0]).1.target_ip, PEER_IP);

    let sent = receive(&mut stack, vec![peer_arp(ArpOp::Reply, LOCAL_MAC)]);
    let (_, _, payload) = parse_ipv4(&sent[0]);
    assert_eq!(payload, b"third");
}

#[test]
fn cache_entry_lives_for_timeout() {
    let (mut stack, clock) = start();
    receive(&mut stack, vec![peer_arp(ArpOp::Reply, LOCAL_MAC)]);

    clock.advance(Duration::from_secs(300));
    assert_eq!(stack.arp_lookup(PEER_IP), Some(PEER_MAC));
    stack.ip_send(b"still cached", PEER_IP, protocol::UDP);
    let sent = stack.device_mut().drain_transmitted();
    assert_eq!(parse_ipv4(&sent[0]).0.dst, PEER_MAC);

    clock.advance(Duration::from_millis(1));
    stack.ip_send(b"expired", PEER_IP, protocol::UDP);
    let sent = stack.device_mut().drain_transmitted();
    assert_eq!(parse_arp(&sent[0]).1.op, ArpOp::Request);
    assert_eq!(stack.arp_lookup(PEER_IP), None);
}

#[test]
fn udp_echo_and_port_unreachable() {
    let (mut stack, _) = start();
    stack
        .udp_bind(7, |stack, payload, src_ip, src_port| {
            stack.udp_send(7, src_ip, src_port, payload).unwrap();
        })
        .unwrap();
    receive(&mut stack, vec![peer_arp(ArpOp::Reply, LOCAL_MAC)]);

    let to_echo = build_segment(PEER_IP, LOCAL_IP, 40000, 7, b"hello");
    let to_closed = build_segment(PEER_IP, LOCAL_IP, 40000, 8, b"hello");
    let sent = receive(
        &mut stack,
        vec![
            peer_datagram(protocol::UDP, &to_echo),
            peer_datagram(protocol::UDP, &to_closed),
        ],
    );
    assert_eq!(sent.len(), 2);

    let (_, ip, segment) = parse_ipv4(&sent[0]);
    assert_eq!(ip.protocol, protocol::UDP);
    let header = UdpHeader::from_bytes(&segment).unwrap();
    assert_eq!((header.src_port, header.dst_port), (7, 40000));
    assert_eq!(&segment[8..], b"hello");

    let (_, ip, message) = parse_ipv4(&sent[1]);
    assert_eq!(ip.protocol, protocol::ICMP);
    let header = IcmpHeader::from_bytes(&message).unwrap();
    assert_eq!(header.msg_type, ICMP_TYPE_UNREACHABLE);
    assert_eq!(header.msg_code, 3);
    let quoted = Ipv4Header::parse(&message[8..]).unwrap();
    assert_eq!(quoted.src_addr, PEER_IP);
    assert_eq!(&message[8 + IPV4_HEADER_LEN..], &to_closed[..8]);
}
