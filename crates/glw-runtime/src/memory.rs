//! Checked access to the module's linear memory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use wasmi::{AsContext, AsContextMut};

use crate::error::{Result, RuntimeError};

/// The module's linear memory plus a shared generation counter.
///
/// Addresses are byte offsets into the memory. Every typed accessor is
/// bounds-checked against the memory's current length and alignment-checked
/// against the element width, so a bad address is a typed error instead of
/// silent garbage. The bytes themselves are re-read from the store on every
/// access; the generation counter exists to invalidate outstanding
/// [`AddressView`](crate::AddressView)s after the memory grows.
#[derive(Clone)]
pub struct MemoryRegion {
    memory: wasmi::Memory,
    generation: Arc<AtomicU64>,
}

impl MemoryRegion {
    pub(crate) fn new(memory: wasmi::Memory, generation: Arc<AtomicU64>) -> Self {
        Self { memory, generation }
    }

    /// The underlying wasmi memory handle.
    pub fn memory(&self) -> wasmi::Memory {
        self.memory
    }

    /// Current generation. Views remember the generation they were created
    /// at and refuse to operate once it moves.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Bump the generation, invalidating all outstanding views. The
    /// module's `_grow` import lands here.
    pub fn refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Current length of the memory in bytes.
    pub fn data_len(&self, ctx: &impl AsContext) -> u32 {
        self.memory.data(ctx).len() as u32
    }

    fn check(&self, ctx: &impl AsContext, address: u32, width: u32) -> Result<usize> {
        if address % width != 0 {
            return Err(RuntimeError::Misaligned { address });
        }
        let end = address
            .checked_add(width)
            .ok_or(RuntimeError::OutOfBounds {
                address,
                len: width,
            })?;
        if end as usize > self.memory.data(ctx).len() {
            return Err(RuntimeError::OutOfBounds {
                address,
                len: width,
            });
        }
        Ok(address as usize)
    }

    /// Read one f32 at a 4-aligned byte address.
    pub fn read_f32(&self, ctx: &impl AsContext, address: u32) -> Result<f32> {
        let start = self.check(ctx, address, 4)?;
        let bytes = &self.memory.data(ctx)[start..start + 4];
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Write one f32 at a 4-aligned byte address.
    pub fn write_f32(&self, ctx: &mut impl AsContextMut, address: u32, value: f32) -> Result<()> {
        let start = self.check(ctx, address, 4)?;
        self.memory.data_mut(ctx)[start..start + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Read `count` consecutive f32s starting at a 4-aligned byte address.
    pub fn read_f32_slice(
        &self,
        ctx: &impl AsContext,
        address: u32,
        count: u32,
    ) -> Result<Vec<f32>> {
        if address % 4 != 0 {
            return Err(RuntimeError::Misaligned { address });
        }
        let len = count
            .checked_mul(4)
            .and_then(|bytes| address.checked_add(bytes))
            .ok_or(RuntimeError::OutOfBounds {
                address,
                len: count.saturating_mul(4),
            })?;
        let data = self.memory.data(ctx);
        if len as usize > data.len() {
            return Err(RuntimeError::OutOfBounds {
                address,
                len: count.saturating_mul(4),
            });
        }
        let start = address as usize;
        Ok(data[start..len as usize]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Read one f64 at an 8-aligned byte address.
    pub fn read_f64(&self, ctx: &impl AsContext, address: u32) -> Result<f64> {
        let start = self.check(ctx, address, 8)?;
        let bytes = &self.memory.data(ctx)[start..start + 8];
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(buf))
    }

    /// Write one f64 at an 8-aligned byte address.
    pub fn write_f64(&self, ctx: &mut impl AsContextMut, address: u32, value: f64) -> Result<()> {
        let start = self.check(ctx, address, 8)?;
        self.memory.data_mut(ctx)[start..start + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

impl std::fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegion")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
