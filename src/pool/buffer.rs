//! Owned transfer buffers

use alloc::boxed::Box;
use alloc::vec;

/// Per-buffer status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferFlags(u8);

impl BufferFlags {
    /// No flags set
    pub const EMPTY: BufferFlags = BufferFlags(0);
    /// Out-of-band header was truncated
    pub const OVERFLOW_OOB: BufferFlags = BufferFlags(1 << 0);
    /// Payload was truncated
    pub const OVERFLOW_DATA: BufferFlags = BufferFlags(1 << 1);

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set
    #[must_use]
    pub const fn contains(self, other: BufferFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set every flag in `other`
    pub fn insert(&mut self, other: BufferFlags) {
        self.0 |= other.0;
    }
}

impl core::ops::BitOr for BufferFlags {
    type Output = BufferFlags;

    fn bitor(self, rhs: BufferFlags) -> BufferFlags {
        BufferFlags(self.0 | rhs.0)
    }
}

/// A fixed-capacity transfer buffer
///
/// Not `Clone`: at any time a buffer is owned by exactly one of the free
/// list, an in-flight slot, the ready queue or the caller. The storage holds
/// the out-of-band header first and the payload right after it, the order in
/// which the hardware streams them through the data window.
#[derive(Debug)]
pub struct Buffer {
    data: Box<[u8]>,
    payload_len: u32,
    oob_len: u32,
    flags: BufferFlags,
    id: u16,
}

impl Buffer {
    pub(crate) fn new(id: u16, capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            payload_len: 0,
            oob_len: 0,
            flags: BufferFlags::EMPTY,
            id,
        }
    }

    /// Identifier assigned when the pool allocated this buffer
    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// Storage size in bytes
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Payload length in bytes
    #[must_use]
    pub const fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// Out-of-band header length in bytes
    #[must_use]
    pub const fn oob_len(&self) -> u32 {
        self.oob_len
    }

    /// Status flags
    #[must_use]
    pub const fn flags(&self) -> BufferFlags {
        self.flags
    }

    /// Header plus payload, in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.payload_len + self.oob_len) as usize
    }

    /// Whether the buffer carries no data
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Out-of-band header bytes
    #[must_use]
    pub fn oob(&self) -> &[u8] {
        &self.data[..self.oob_len as usize]
    }

    /// Payload bytes
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[self.oob_len as usize..self.len()]
    }

    /// Header and payload as they travel through the data window
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Whole storage, for a producer filling a TX buffer
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    pub(crate) fn set_meta(&mut self, payload_len: u32, oob_len: u32, flags: BufferFlags) {
        self.payload_len = payload_len;
        self.oob_len = oob_len;
        self.flags = flags;
    }

    pub(crate) fn clear_meta(&mut self) {
        self.set_meta(0, 0, BufferFlags::EMPTY);
    }

    /// Give up the storage for good
    ///
    /// Used for buffers whose transfer may still complete after the engine
    /// stopped tracking them: leaked memory stays valid for a late hardware
    /// write.
    pub(crate) fn leak(self) {
        let _ = Box::leak(self.data);
    }
}
