//! Register bus abstraction
//!
//! The engine never dereferences register addresses itself. Every access goes
//! through a [`RegisterBus`], so the same engine runs against the real
//! memory-mapped window ([`MmioBus`]) or a host-side mock.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::register::{read_reg, write_reg};

// =============================================================================
// RegisterBus Trait
// =============================================================================

/// Raw 32-bit access into the ZAP register window
///
/// `offset` is a byte offset from the start of the window and is always a
/// multiple of four.
pub trait RegisterBus {
    /// Read the word at `offset`
    fn read_word(&mut self, offset: usize) -> u32;

    /// Write `value` to the word at `offset`
    fn write_word(&mut self, offset: usize, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    #[inline]
    fn read_word(&mut self, offset: usize) -> u32 {
        (**self).read_word(offset)
    }

    #[inline]
    fn write_word(&mut self, offset: usize, value: u32) {
        (**self).write_word(offset, value);
    }
}

// =============================================================================
// Memory-Mapped Bus
// =============================================================================

/// Volatile register access over a mapped base address
#[derive(Debug)]
pub struct MmioBus {
    base: usize,
}

impl MmioBus {
    /// Create a bus over the window starting at `base`
    ///
    /// # Safety
    ///
    /// `base` must point at the mapped ZAP register window, which must stay
    /// mapped for the lifetime of the bus, and no other code may access the
    /// window concurrently.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Create a bus after checking that `base` is usable
    ///
    /// Returns [`ConfigError::RegisterMapFailed`] for a null or non
    /// word-aligned base.
    ///
    /// # Safety
    ///
    /// Same contract as [`MmioBus::new`].
    pub unsafe fn map(base: usize) -> ConfigResult<Self> {
        if base == 0 || base % core::mem::align_of::<u32>() != 0 {
            return Err(ConfigError::RegisterMapFailed);
        }
        // SAFETY: forwarded from the caller.
        Ok(unsafe { Self::new(base) })
    }

    /// Base address of the register window
    #[must_use]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for MmioBus {
    #[inline(always)]
    fn read_word(&mut self, offset: usize) -> u32 {
        // SAFETY: the constructor contract guarantees a mapped, aligned window.
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write_word(&mut self, offset: usize, value: u32) {
        // SAFETY: the constructor contract guarantees a mapped, aligned window.
        unsafe { write_reg(self.base + offset, value) }
    }
}
