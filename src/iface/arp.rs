//! Address resolution
//!
//! Per destination IP the resolver is in one of three states, implied by
//! table membership:
//! - unresolved, nothing queued: in neither table
//! - unresolved, request outstanding: one packet in the pending store
//! - resolved: in the cache
//!
//! The pending store holds at most one packet per destination. Its TTL is the
//! minimum retry interval, so a second request for a silent host goes out only
//! after the first queued packet has aged out.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::buffer::PacketBuf;
use crate::iface::NetStack;
use crate::link::{ethertype, ArpOp, ArpPacket, Device, MacAddr};
use crate::table::{Clock, ExpiringMap};

pub(crate) struct ArpTables {
    cache: ExpiringMap<Ipv4Addr, MacAddr>,
    pending: ExpiringMap<Ipv4Addr, PacketBuf>,
}

impl ArpTables {
    pub(crate) fn new(timeout: Duration, min_interval: Duration) -> Self {
        ArpTables {
            cache: ExpiringMap::new(timeout),
            pending: ExpiringMap::new(min_interval),
        }
    }
}

impl<D: Device, C: Clock> NetStack<D, C> {
    /// Deliver an IP datagram to `dst_ip` on the local link.
    ///
    /// Sends at once when the MAC is cached. Otherwise the datagram is parked
    /// and an ARP request goes out, unless a datagram for `dst_ip` is already
    /// parked, in which case this one is dropped without notice.
    pub fn arp_resolve_and_send(&mut self, buf: PacketBuf, dst_ip: Ipv4Addr) {
        let now = self.clock.now();
        if let Some(&mac) = self.arp.cache.get(&dst_ip, now) {
            self.ethernet_send(buf, mac, ethertype::IPV4);
            return;
        }

        if self.arp.pending.contains(&dst_ip, now) {
            trace!(%dst_ip, len = buf.len(), "resolution in progress, datagram dropped");
            return;
        }

        debug!(%dst_ip, len = buf.len(), "datagram waiting for arp resolution");
        self.arp.pending.insert(dst_ip, buf, now);
        self.arp_request(dst_ip);
    }

    /// Broadcast a request for the MAC of `target_ip`
    pub fn arp_request(&mut self, target_ip: Ipv4Addr) {
        let packet = ArpPacket::request(self.config.mac, self.config.ip, target_ip);
        debug!(%target_ip, "arp request");
        self.ethernet_send(
            PacketBuf::from_slice(&packet.to_bytes()),
            MacAddr::BROADCAST,
            ethertype::ARP,
        );
    }

    /// Tell `target_ip` at `target_mac` where the local IP lives
    pub fn arp_reply(&mut self, target_ip: Ipv4Addr, target_mac: MacAddr) {
        let packet = ArpPacket::reply(self.config.mac, self.config.ip, target_mac, target_ip);
        debug!(%target_ip, %target_mac, "arp reply");
        self.ethernet_send(
            PacketBuf::from_slice(&packet.to_bytes()),
            target_mac,
            ethertype::ARP,
        );
    }

    pub(crate) fn arp_in(&mut self, buf: &PacketBuf, src_mac: MacAddr) {
        let packet = match ArpPacket::parse(buf.as_slice()) {
            Ok(packet) => packet,
            Err(reason) => {
                trace!(%src_mac, %reason, "arp packet dropped");
                return;
            }
        };

        // requests and replies both reveal the sender's binding
        let now = self.clock.now();
        self.arp
            .cache
            .insert(packet.sender_ip, packet.sender_mac, now);
        debug!(ip = %packet.sender_ip, mac = %packet.sender_mac, "arp cache updated");

        if let Some(parked) = self.arp.pending.remove(&packet.sender_ip, now) {
            debug!(
                ip = %packet.sender_ip,
                len = parked.len(),
                "sending datagram parked for resolution"
            );
            self.ethernet_send(parked, packet.sender_mac, ethertype::IPV4);
        } else if packet.op == ArpOp::Request && packet.target_ip == self.config.ip {
            self.arp_reply(packet.sender_ip, packet.sender_mac);
        }
    }

    /// Cached MAC for `ip`, if the mapping has not expired
    pub fn arp_lookup(&mut self, ip: Ipv4Addr) -> Option<MacAddr> {
        let now = self.clock.now();
        self.arp.cache.get(&ip, now).copied()
    }

    /// Snapshot of the live cache as `(ip, mac, last update)`
    pub fn arp_entries(&mut self) -> Vec<(Ipv4Addr, MacAddr, Instant)> {
        let now = self.clock.now();
        let mut entries: Vec<_> = self
            .arp
            .cache
            .iter(now)
            .map(|(ip, mac, updated)| (*ip, *mac, updated))
            .collect();
        entries.sort_by_key(|(ip, _, _)| *ip);
        entries
    }

    /// Whether a datagram for `ip` is parked awaiting resolution
    pub fn arp_is_pending(&mut self, ip: Ipv4Addr) -> bool {
        let now = self.clock.now();
        self.arp.pending.contains(&ip, now)
    }

    /// Parked datagrams, including ones aged out but not yet evicted
    pub fn arp_pending_len(&self) -> usize {
        self.arp.pending.len()
    }

    /// Evict expired cache and pending entries now instead of on next access
    pub fn arp_expire_stale(&mut self) -> usize {
        let now = self.clock.now();
        self.arp.cache.sweep(now) + self.arp.pending.sweep(now)
    }
}
