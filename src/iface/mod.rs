//! Network interface layer
//!
//! Protocol processing for one Ethernet interface:
//! - Frame demultiplexing and transmission
//! - ARP resolution with a pending-packet store
//! - IPv4 validation and fragmentation
//! - ICMP echo and unreachable messages
//! - UDP port dispatch

mod arp;
mod ethernet;
mod icmp;
mod ipv4;
pub mod stack;
pub mod udp;

#[cfg(test)]
mod testutil;

// Re-export commonly used items
pub use stack::NetStack;
pub use udp::{UdpHandler, UDP_MAX_PAYLOAD};
