use std::net::Ipv4Addr;

use tracing::{debug, trace, warn};

use crate::buffer::PacketBuf;
use crate::error::{DropReason, UdpError};
use crate::iface::NetStack;
use crate::link::Device;
use crate::network::icmp::UnreachableCode;
use crate::network::ipv4::{protocol, Ipv4Header, IPV4_HEADER_LEN, IPV4_MAX_DATAGRAM};
use crate::table::Clock;
use crate::transport::udp::{self, UdpHeader, UDP_HEADER_LEN};

/// Largest payload one UDP datagram can carry over IPv4
pub const UDP_MAX_PAYLOAD: usize = IPV4_MAX_DATAGRAM - IPV4_HEADER_LEN - UDP_HEADER_LEN;

/// Callback for datagrams arriving on a bound port.
///
/// Receives the stack (so it can answer), the payload, and the sender's
/// address and port.
pub type UdpHandler<D, C> = Box<dyn FnMut(&mut NetStack<D, C>, &[u8], Ipv4Addr, u16)>;

impl<D: Device, C: Clock> NetStack<D, C> {
    /// Deliver datagrams for `port` to `handler`
    pub fn udp_bind<F>(&mut self, port: u16, handler: F) -> Result<(), UdpError>
    where
        F: FnMut(&mut NetStack<D, C>, &[u8], Ipv4Addr, u16) + 'static,
    {
        if port == 0 {
            return Err(UdpError::PortZero);
        }
        if self.udp_handlers.contains_key(&port) {
            return Err(UdpError::PortInUse(port));
        }
        self.udp_handlers.insert(port, Box::new(handler));
        debug!(port, "udp port bound");
        Ok(())
    }

    /// Release `port`; returns whether it was bound.
    ///
    /// A handler cannot release its own port while it is running.
    pub fn udp_unbind(&mut self, port: u16) -> bool {
        self.udp_handlers.remove(&port).is_some()
    }

    /// Send one datagram from `src_port` to `dst_ip:dst_port`
    pub fn udp_send(
        &mut self,
        src_port: u16,
        dst_ip: Ipv4Addr,
        dst_port: u16,
        data: &[u8],
    ) -> Result<(), UdpError> {
        if data.len() > UDP_MAX_PAYLOAD {
            warn!(%dst_ip, dst_port, len = data.len(), "udp payload too large");
            return Err(UdpError::PayloadTooLarge(data.len()));
        }
        let segment = udp::build_segment(self.config.ip, dst_ip, src_port, dst_port, data);
        self.ip_send(&segment, dst_ip, protocol::UDP);
        Ok(())
    }

    pub(crate) fn udp_in(&mut self, buf: &mut PacketBuf, ip_header: &Ipv4Header) {
        if let Err(reason) = self.udp_deliver(buf, ip_header) {
            trace!(src = %ip_header.src_addr, %reason, "udp datagram dropped");
        }
    }

    fn udp_deliver(
        &mut self,
        buf: &mut PacketBuf,
        ip_header: &Ipv4Header,
    ) -> Result<(), DropReason> {
        let header = UdpHeader::from_bytes(buf.as_slice())
            .ok_or(DropReason::Truncated(UDP_HEADER_LEN))?;

        // Validate length
        if header.length as usize != buf.len() {
            return Err(DropReason::LengthMismatch {
                declared: header.length as usize,
                actual: buf.len(),
            });
        }

        // Validate checksum (if not zero)
        if header.checksum != 0
            && udp::udp_checksum(ip_header.src_addr, ip_header.dst_addr, buf.as_slice()) != 0
        {
            return Err(DropReason::BadChecksum);
        }

        let Some(mut handler) = self.udp_handlers.remove(&header.dst_port) else {
            // quote the datagram as received, ip header included
            buf.add_header(ip_header.header_len());
            self.icmp_unreachable(buf.as_slice(), ip_header.src_addr, UnreachableCode::Port);
            return Err(DropReason::NoListener(header.dst_port));
        };

        handler(
            self,
            &buf.as_slice()[UDP_HEADER_LEN..],
            ip_header.src_addr,
            header.src_port,
        );
        self.udp_handlers.entry(header.dst_port).or_insert(handler);
        Ok(())
    }
}
