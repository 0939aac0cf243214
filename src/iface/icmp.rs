use std::net::Ipv4Addr;

use tracing::{debug, trace};

use crate::buffer::PacketBuf;
use crate::error::DropReason;
use crate::iface::NetStack;
use crate::link::Device;
use crate::network::icmp::{
    self, IcmpHeader, UnreachableCode, ICMP_HEADER_LEN, ICMP_TYPE_ECHO_REPLY,
};
use crate::network::ipv4::{protocol, Ipv4Header};
use crate::table::Clock;

/// Bytes of the offending datagram's payload quoted after its header
const QUOTED_PAYLOAD_LEN: usize = 8;

impl<D: Device, C: Clock> NetStack<D, C> {
    pub(crate) fn icmp_in(&mut self, buf: &PacketBuf, src_ip: Ipv4Addr) {
        let Some(header) = IcmpHeader::from_bytes(buf.as_slice()) else {
            trace!(
                %src_ip,
                reason = %DropReason::Truncated(ICMP_HEADER_LEN),
                "icmp message dropped"
            );
            return;
        };

        if header.is_echo_request() {
            let mut reply = buf.as_slice().to_vec();
            reply[0] = ICMP_TYPE_ECHO_REPLY;
            icmp::fill_checksum(&mut reply);
            debug!(
                %src_ip,
                id = header.identifier(),
                seq = header.sequence(),
                "echo reply"
            );
            self.ip_send(&reply, src_ip, protocol::ICMP);
        }
    }

    /// Report an undeliverable datagram back to its sender.
    ///
    /// `original` starts at the offending IPv4 header; the message quotes that
    /// header and the first 8 bytes after it.
    pub fn icmp_unreachable(&mut self, original: &[u8], src_ip: Ipv4Addr, code: UnreachableCode) {
        let header_len = match Ipv4Header::parse(original) {
            Ok(header) => header.header_len(),
            Err(reason) => {
                trace!(%src_ip, %reason, "cannot quote datagram, unreachable not sent");
                return;
            }
        };

        let quote_len = header_len + QUOTED_PAYLOAD_LEN;
        let mut message = vec![0u8; ICMP_HEADER_LEN + quote_len];
        message[..ICMP_HEADER_LEN].copy_from_slice(&IcmpHeader::unreachable(code).to_bytes());
        let copied = quote_len.min(original.len());
        message[ICMP_HEADER_LEN..ICMP_HEADER_LEN + copied].copy_from_slice(&original[..copied]);
        icmp::fill_checksum(&mut message);

        debug!(%src_ip, ?code, "destination unreachable");
        self.ip_send(&message, src_ip, protocol::ICMP);
    }
}
