use std::net::Ipv4Addr;

use tracing::{debug, trace, warn};

use crate::buffer::PacketBuf;
use crate::error::DropReason;
use crate::iface::NetStack;
use crate::link::{Device, MacAddr};
use crate::network::icmp::UnreachableCode;
use crate::network::ipv4::{
    self, flags, protocol, Ipv4Header, IPV4_HEADER_LEN, IPV4_MAX_DATAGRAM,
};
use crate::table::Clock;

impl<D: Device, C: Clock> NetStack<D, C> {
    pub(crate) fn ip_in(&mut self, buf: &mut PacketBuf, src_mac: MacAddr) {
        let header = match self.ip_accept(buf) {
            Ok(header) => header,
            Err(reason) => {
                trace!(%src_mac, %reason, "ipv4 packet dropped");
                return;
            }
        };

        // Dispatch based on protocol
        match header.protocol {
            protocol::ICMP => {
                buf.remove_header(header.header_len());
                self.icmp_in(buf, header.src_addr);
            }
            protocol::UDP => {
                buf.remove_header(header.header_len());
                self.udp_in(buf, &header);
            }
            other => {
                trace!(
                    src = %header.src_addr,
                    reason = %DropReason::UnsupportedProtocol(other),
                    "ipv4 packet dropped"
                );
                self.icmp_unreachable(buf.as_slice(), header.src_addr, UnreachableCode::Protocol);
            }
        }
    }

    /// Validate an inbound datagram and trim link padding off its tail
    fn ip_accept(&self, buf: &mut PacketBuf) -> Result<Ipv4Header, DropReason> {
        let header = Ipv4Header::parse(buf.as_slice())?;

        let declared = header.total_len as usize;
        if declared > buf.len() || declared < header.header_len() {
            return Err(DropReason::LengthMismatch {
                declared,
                actual: buf.len(),
            });
        }

        if !ipv4::verify_checksum(&buf.as_slice()[..header.header_len()]) {
            return Err(DropReason::BadChecksum);
        }

        if header.dst_addr != self.config.ip {
            return Err(DropReason::NotForUs);
        }

        buf.truncate(declared);
        Ok(header)
    }

    /// Prepend an IPv4 header to one fragment and pass it to ARP.
    ///
    /// `offset` is in 8-byte units. A fragment whose length or offset does not
    /// fit the header fields is dropped with a warning.
    pub fn ip_send_fragment(
        &mut self,
        mut buf: PacketBuf,
        dst_ip: Ipv4Addr,
        protocol: u8,
        id: u16,
        offset: u16,
        more_fragments: bool,
    ) {
        if buf.len() > IPV4_MAX_DATAGRAM - IPV4_HEADER_LEN {
            warn!(
                %dst_ip,
                reason = %DropReason::Oversized(buf.len()),
                "ipv4 fragment dropped"
            );
            return;
        }
        if offset > flags::FRAGMENT_OFFSET_MASK {
            warn!(
                %dst_ip,
                reason = %DropReason::BadFragmentOffset(offset),
                "ipv4 fragment dropped"
            );
            return;
        }

        let total_len = (buf.len() + IPV4_HEADER_LEN) as u16;
        let mut header = Ipv4Header::fragment(
            total_len,
            id,
            offset,
            more_fragments,
            protocol,
            self.config.ip,
            dst_ip,
        );
        header.update_checksum();
        buf.add_header(IPV4_HEADER_LEN)
            .copy_from_slice(&header.to_bytes());

        self.arp_resolve_and_send(buf, dst_ip);
    }

    /// Send `payload` to `dst_ip`, fragmenting to fit the link MTU.
    ///
    /// All fragments share one datagram id. Each fragment is resolved on its
    /// own, so while `dst_ip` is unresolved only the first one is kept.
    pub fn ip_send(&mut self, payload: &[u8], dst_ip: Ipv4Addr, protocol: u8) {
        if payload.len() > IPV4_MAX_DATAGRAM - IPV4_HEADER_LEN {
            warn!(
                %dst_ip,
                reason = %DropReason::Oversized(payload.len()),
                "ipv4 datagram dropped"
            );
            return;
        }

        let id = self.next_datagram_id;
        let max_payload = self.config.mtu - IPV4_HEADER_LEN;

        if payload.len() <= max_payload {
            self.ip_send_fragment(PacketBuf::from_slice(payload), dst_ip, protocol, id, 0, false);
        } else {
            // every fragment but the last must carry a multiple of 8 bytes
            let chunk_len = max_payload & !7;
            let count = (payload.len() + chunk_len - 1) / chunk_len;
            debug!(%dst_ip, id, len = payload.len(), count, "fragmenting datagram");

            let mut offset = 0;
            for chunk in payload.chunks(chunk_len) {
                let more_fragments = offset + chunk.len() < payload.len();
                self.ip_send_fragment(
                    PacketBuf::from_slice(chunk),
                    dst_ip,
                    protocol,
                    id,
                    (offset / 8) as u16,
                    more_fragments,
                );
                offset += chunk.len();
            }
        }

        self.next_datagram_id = id.wrapping_add(1);
    }
}
