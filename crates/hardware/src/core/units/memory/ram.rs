//! Simulated RAM.
//!
//! Flat little-endian byte store shared by the memory unit and the CSU's
//! zero-latency instruction fetch. During a tick it is only read; the memory
//! unit stages its byte writes and the driver applies them after sync.

use crate::common::error::SimError;

/// Byte-addressable RAM.
#[derive(Clone, Debug)]
pub struct Ram {
    bytes: Vec<u8>,
}

impl Ram {
    /// Creates a zero-filled RAM of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the RAM has no bytes at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks that `width` bytes starting at `addr` lie inside RAM.
    ///
    /// # Errors
    ///
    /// [`SimError::AddressOutOfRange`] if any byte is past the end.
    pub fn check_range(&self, addr: u32, width: u32) -> Result<(), SimError> {
        let end = u64::from(addr) + u64::from(width);
        if end > self.bytes.len() as u64 {
            return Err(SimError::AddressOutOfRange { addr, width });
        }
        Ok(())
    }

    /// Reads one byte.
    #[inline]
    pub fn read_byte(&self, addr: u32) -> Option<u8> {
        self.bytes.get(addr as usize).copied()
    }

    /// Reads a little-endian value of `width` bytes (1, 2 or 4), zero-extended.
    ///
    /// # Errors
    ///
    /// [`SimError::AddressOutOfRange`] if the access runs past the end of RAM.
    pub fn read(&self, addr: u32, width: u32) -> Result<u32, SimError> {
        self.check_range(addr, width)?;
        let start = addr as usize;
        Ok(self.bytes[start..start + width as usize]
            .iter()
            .rev()
            .fold(0, |acc, &b| (acc << 8) | u32::from(b)))
    }

    /// Zero-latency instruction fetch; `None` past the end of RAM.
    pub fn fetch(&self, pc: u32) -> Option<u32> {
        self.read(pc, 4).ok()
    }

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// [`SimError::AddressOutOfRange`] if `addr` is past the end of RAM.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), SimError> {
        let slot = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(SimError::AddressOutOfRange { addr, width: 1 })?;
        *slot = value;
        Ok(())
    }

    /// Applies a batch of staged byte writes.
    ///
    /// # Errors
    ///
    /// [`SimError::AddressOutOfRange`] on the first write past the end of RAM.
    pub fn apply<I>(&mut self, writes: I) -> Result<(), SimError>
    where
        I: IntoIterator<Item = (u32, u8)>,
    {
        for (addr, value) in writes {
            self.write_byte(addr, value)?;
        }
        Ok(())
    }

    /// Copies `data` to `base`, growing RAM if the block extends past its end.
    pub fn load(&mut self, base: u32, data: &[u8]) {
        let start = base as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
    }
}
