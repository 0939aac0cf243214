//! A small host network stack in Rust
//!
//! This library drives a single Ethernet interface and provides:
//! - Ethernet framing and demultiplexing
//! - ARP resolution with an expiring cache
//! - IPv4 validation and outbound fragmentation
//! - ICMP echo replies and destination unreachable messages
//! - UDP port dispatch
//!
//! Frames come from a [`Device`]: [`TapDevice`] for a TAP interface or
//! [`QueueDevice`] for in-memory testing.

pub mod buffer;
pub mod config;
pub mod error;
pub mod iface;
pub mod link;
pub mod network;
pub mod table;
pub mod transport;

// Re-export commonly used types
pub use buffer::PacketBuf;
pub use config::StackConfig;
pub use error::{ConfigError, DropReason, UdpError};
pub use iface::{NetStack, UdpHandler};
pub use link::{Device, MacAddr, QueueDevice, TapDevice};
pub use network::icmp::UnreachableCode;
pub use table::{Clock, ExpiringMap, ManualClock, SystemClock};
