//! The protocol stack handle
//!
//! [`NetStack`] owns every piece of mutable protocol state: the ARP cache and
//! pending store, the datagram identifier counter, the receive buffer and the
//! UDP port table. Protocol processing lives in sibling modules as `impl`
//! blocks on this type, one file per protocol.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use tracing::info;

use crate::buffer::PacketBuf;
use crate::config::StackConfig;
use crate::error::ConfigError;
use crate::iface::arp::ArpTables;
use crate::iface::udp::UdpHandler;
use crate::link::ethernet::{ETHERNET_HEADER_LEN, ETHERNET_MAX_PAYLOAD};
use crate::link::{Device, MacAddr};
use crate::table::{Clock, SystemClock};

const RX_FRAME_LEN: usize = ETHERNET_HEADER_LEN + ETHERNET_MAX_PAYLOAD;

/// A single-interface Ethernet/ARP/IPv4 host stack.
///
/// Driven by [`poll`](Self::poll) from one thread; every operation runs to
/// completion before returning. Address resolution finishes on whichever later
/// poll delivers the matching ARP packet.
pub struct NetStack<D, C = SystemClock> {
    pub(crate) config: StackConfig,
    pub(crate) device: D,
    pub(crate) clock: C,
    pub(crate) arp: ArpTables,
    pub(crate) next_datagram_id: u16,
    pub(crate) udp_handlers: HashMap<u16, UdpHandler<D, C>>,
    rx_buf: PacketBuf,
}

impl<D: Device> NetStack<D, SystemClock> {
    /// Bring up a stack on `device` using the system clock
    pub fn new(config: StackConfig, device: D) -> Result<Self, ConfigError> {
        Self::with_clock(config, device, SystemClock)
    }
}

impl<D: Device, C: Clock> NetStack<D, C> {
    /// Bring up a stack on `device`, reading time from `clock`.
    ///
    /// Announces the local address with one ARP request for it.
    pub fn with_clock(config: StackConfig, device: D, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut stack = NetStack {
            arp: ArpTables::new(config.arp_timeout, config.arp_min_interval),
            config,
            device,
            clock,
            next_datagram_id: 0,
            udp_handlers: HashMap::new(),
            rx_buf: PacketBuf::new(RX_FRAME_LEN),
        };

        info!(
            mac = %stack.config.mac,
            ip = %stack.config.ip,
            mtu = stack.config.mtu,
            "network stack up"
        );
        let local_ip = stack.config.ip;
        stack.arp_request(local_ip);
        Ok(stack)
    }

    /// Receive and fully process at most one frame.
    ///
    /// Returns false when the device had nothing to deliver.
    pub fn poll(&mut self) -> bool {
        let mut rx = std::mem::take(&mut self.rx_buf);
        rx.reset(RX_FRAME_LEN);

        let n = self.device.recv(rx.as_mut_slice());
        if n > 0 {
            rx.truncate(n);
            self.ethernet_in(&mut rx);
        }

        self.rx_buf = rx;
        n > 0
    }

    /// Poll until the device is drained, returning the number of frames handled
    pub fn run_until_idle(&mut self) -> usize {
        let mut frames = 0;
        while self.poll() {
            frames += 1;
        }
        frames
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.config.ip
    }

    pub fn local_mac(&self) -> MacAddr {
        self.config.mac
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Identifier the next outbound datagram will carry
    pub fn next_datagram_id(&self) -> u16 {
        self.next_datagram_id
    }
}
