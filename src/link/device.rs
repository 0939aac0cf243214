//! Frame transports
//!
//! - [`TapDevice`]: a Linux TAP interface opened through `tun-tap`
//! - [`QueueDevice`]: an in-memory transport, used to drive the stack
//!   deterministically from tests

use std::collections::VecDeque;
use std::io;

use tracing::warn;
use tun_tap::{Iface, Mode};

use super::Device;

/// In-memory frame transport.
///
/// Frames pushed with [`QueueDevice::inject`] are handed to the stack one per
/// poll; every transmitted frame is recorded in order.
#[derive(Debug, Default)]
pub struct QueueDevice {
    rx_queue: VecDeque<Vec<u8>>,
    transmitted: Vec<Vec<u8>>,
}

impl QueueDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound frame
    pub fn inject(&mut self, frame: Vec<u8>) {
        self.rx_queue.push_back(frame);
    }

    pub fn pending_rx(&self) -> usize {
        self.rx_queue.len()
    }

    /// Frames transmitted so far
    pub fn transmitted(&self) -> &[Vec<u8>] {
        &self.transmitted
    }

    /// Take and clear the transmitted frames
    pub fn drain_transmitted(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.transmitted)
    }
}

impl Device for QueueDevice {
    fn transmit(&mut self, frame: &[u8]) -> io::Result<()> {
        self.transmitted.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> usize {
        match self.rx_queue.pop_front() {
            Some(frame) => {
                let n = frame.len().min(buf.len());
                buf[..n].copy_from_slice(&frame[..n]);
                n
            }
            None => 0,
        }
    }
}

/// Ethernet frames over a Linux TAP interface
pub struct TapDevice {
    iface: Iface,
}

impl TapDevice {
    /// Open (or create) the TAP interface `name` in non-blocking mode
    pub fn open(name: &str) -> io::Result<Self> {
        let iface = Iface::without_packet_info(name, Mode::Tap)?;
        iface.set_non_blocking()?;
        Ok(TapDevice { iface })
    }

    /// Kernel-assigned interface name
    pub fn name(&self) -> &str {
        self.iface.name()
    }
}

impl Device for TapDevice {
    fn transmit(&mut self, frame: &[u8]) -> io::Result<()> {
        self.iface.send(frame).map(|_| ())
    }

    fn recv(&mut self, buf: &mut [u8]) -> usize {
        match self.iface.recv(buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => 0,
            Err(e) => {
                warn!(iface = self.iface.name(), error = %e, "tap receive failed");
                0
            }
        }
    }
}
