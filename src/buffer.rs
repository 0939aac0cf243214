//! Packet buffer with reserved headroom
//!
//! Each layer prepends or strips its own header in place, so a datagram walks
//! up or down the stack inside one allocation.

/// Bytes reserved in front of the payload for headers added on the way out
/// (Ethernet 14 + IPv4 20 + UDP/ICMP 8, rounded up).
pub const HEADROOM: usize = 64;

/// A byte region `storage[start..end]` with room to grow at the front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBuf {
    storage: Vec<u8>,
    start: usize,
    end: usize,
}

/// Empty buffer with no storage; the first `reset` or `add_header` allocates
impl Default for PacketBuf {
    fn default() -> Self {
        PacketBuf {
            storage: Vec::new(),
            start: 0,
            end: 0,
        }
    }
}

impl PacketBuf {
    /// Zeroed buffer holding `len` payload bytes
    pub fn new(len: usize) -> Self {
        PacketBuf {
            storage: vec![0u8; HEADROOM + len],
            start: HEADROOM,
            end: HEADROOM + len,
        }
    }

    /// Copy `data` into a fresh buffer
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::new(data.len());
        buf.as_mut_slice().copy_from_slice(data);
        buf
    }

    /// Reuse the allocation for `len` bytes of new content.
    ///
    /// Contents are unspecified until overwritten.
    pub fn reset(&mut self, len: usize) {
        if self.storage.len() < HEADROOM + len {
            self.storage.resize(HEADROOM + len, 0);
        }
        self.start = HEADROOM;
        self.end = HEADROOM + len;
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.end]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.end]
    }

    /// Grow the front by `n` bytes and return them.
    ///
    /// The bytes keep whatever the headroom held, so a header stripped with
    /// [`remove_header`](Self::remove_header) reappears intact. Callers
    /// writing a new header overwrite all of it.
    pub fn add_header(&mut self, n: usize) -> &mut [u8] {
        if n > self.start {
            let grow = n - self.start + HEADROOM;
            self.storage.splice(0..0, std::iter::repeat(0).take(grow));
            self.start += grow;
            self.end += grow;
        }
        self.start -= n;
        &mut self.storage[self.start..self.start + n]
    }

    /// Drop `n` bytes from the front
    pub fn remove_header(&mut self, n: usize) {
        self.start = (self.start + n).min(self.end);
    }

    /// Append `n` zero bytes
    pub fn add_padding(&mut self, n: usize) {
        let new_end = self.end + n;
        if self.storage.len() < new_end {
            self.storage.resize(new_end, 0);
        }
        self.storage[self.end..new_end].fill(0);
        self.end = new_end;
    }

    /// Drop `n` bytes from the tail
    pub fn remove_padding(&mut self, n: usize) {
        self.end = self.end.saturating_sub(n).max(self.start);
    }

    /// Shorten to `len` bytes; no-op if already shorter
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.end = self.start + len;
        }
    }
}

impl AsRef<[u8]> for PacketBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
