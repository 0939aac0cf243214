//! Stack configuration
//!
//! Local addresses and protocol timers. Values are fixed once a
//! [`NetStack`](crate::NetStack) is built from them.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::link::ethernet::ETHERNET_MAX_PAYLOAD;
use crate::MacAddr;

/// Smallest MTU an IPv4 host must support (RFC 791)
pub const MIN_MTU: usize = 68;
pub const MAX_MTU: usize = ETHERNET_MAX_PAYLOAD;

const DEFAULT_ARP_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_ARP_MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Hardware address of the local interface
    pub mac: MacAddr,
    /// IPv4 address of the local interface
    pub ip: Ipv4Addr,
    /// Largest IP datagram the link carries unfragmented
    pub mtu: usize,
    /// How long a learned IP-to-MAC mapping stays valid
    pub arp_timeout: Duration,
    /// How long a packet waits for resolution before a new request may be sent
    pub arp_min_interval: Duration,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            mac: MacAddr::new(0x02, 0x00, 0x00, 0x00, 0x00, 0x02),
            ip: Ipv4Addr::new(10, 0, 0, 2),
            mtu: MAX_MTU,
            arp_timeout: DEFAULT_ARP_TIMEOUT,
            arp_min_interval: DEFAULT_ARP_MIN_INTERVAL,
        }
    }
}

impl StackConfig {
    pub fn new(mac: MacAddr, ip: Ipv4Addr) -> Self {
        StackConfig {
            mac,
            ip,
            ..Default::default()
        }
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    pub fn with_arp_timeout(mut self, timeout: Duration) -> Self {
        self.arp_timeout = timeout;
        self
    }

    pub fn with_arp_min_interval(mut self, interval: Duration) -> Self {
        self.arp_min_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MTU..=MAX_MTU).contains(&self.mtu) {
            return Err(ConfigError::InvalidMtu(self.mtu));
        }
        if self.mac.is_multicast() {
            return Err(ConfigError::MulticastMac(self.mac));
        }
        if self.ip.is_unspecified() || self.ip.is_broadcast() || self.ip.is_multicast() {
            return Err(ConfigError::InvalidIp(self.ip));
        }
        // both tables only age out entries with a nonzero ttl
        if self.arp_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("arp_timeout"));
        }
        if self.arp_min_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("arp_min_interval"));
        }
        Ok(())
    }
}
