use tracing::{trace, warn};

use crate::buffer::PacketBuf;
use crate::error::DropReason;
use crate::iface::NetStack;
use crate::link::ethernet::{EthernetHeader, ETHERNET_HEADER_LEN, ETHERNET_MIN_PAYLOAD};
use crate::link::{ethertype, Device, MacAddr};
use crate::table::Clock;

impl<D: Device, C: Clock> NetStack<D, C> {
    /// Frame `buf` for `dst` and hand it to the device.
    ///
    /// Best effort: short payloads are zero padded to the Ethernet minimum and
    /// a failed transmit is logged, never reported.
    pub fn ethernet_send(&mut self, mut buf: PacketBuf, dst: MacAddr, ethertype: u16) {
        if buf.len() < ETHERNET_MIN_PAYLOAD {
            buf.add_padding(ETHERNET_MIN_PAYLOAD - buf.len());
        }

        let header = EthernetHeader {
            dst,
            src: self.config.mac,
            ethertype,
        };
        header.write(buf.add_header(ETHERNET_HEADER_LEN));

        if let Err(e) = self.device.transmit(buf.as_slice()) {
            warn!(%dst, error = %e, "frame transmit failed");
        }
    }

    pub(crate) fn ethernet_in(&mut self, buf: &mut PacketBuf) {
        let Some(header) = EthernetHeader::from_bytes(buf.as_slice()) else {
            trace!(
                reason = %DropReason::Truncated(ETHERNET_HEADER_LEN),
                len = buf.len(),
                "frame dropped"
            );
            return;
        };
        buf.remove_header(ETHERNET_HEADER_LEN);

        match header.ethertype {
            ethertype::ARP => self.arp_in(buf, header.src),
            ethertype::IPV4 => self.ip_in(buf, header.src),
            other => trace!(
                reason = %DropReason::UnsupportedEtherType(other),
                src = %header.src,
                "frame dropped"
            ),
        }
    }
}
