//! Typed windows into the memory region.

use wasmi::{AsContext, AsContextMut};

use crate::error::{Result, RuntimeError};
use crate::memory::MemoryRegion;

/// A fixed-length f32 window at a byte address.
///
/// Created by a bridged namespace's `view` method. Remembers the region
/// generation it was created at; once the memory grows (`_grow` bumps the
/// generation) every access fails with [`RuntimeError::StaleView`] and the
/// caller must take a fresh view.
///
/// The identity tag is the originating byte address, recorded only for
/// type shapes that opt in — it lets equality wrappers resolve the view
/// back to the exact operand address it was taken from.
#[derive(Clone)]
pub struct AddressView {
    region: MemoryRegion,
    address: u32,
    len: u32,
    created_at: u64,
    tag: Option<u32>,
}

impl AddressView {
    pub(crate) fn new(
        region: MemoryRegion,
        address: u32,
        len: u32,
        tag: Option<u32>,
    ) -> Result<Self> {
        if address % 4 != 0 {
            return Err(RuntimeError::Misaligned { address });
        }
        let created_at = region.generation();
        Ok(Self {
            region,
            address,
            len,
            created_at,
            tag,
        })
    }

    /// Byte address of element 0.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Identity tag, when the originating type shape records one.
    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// Element count.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The address equality wrappers should use for this view.
    pub(crate) fn operand_address(&self) -> u32 {
        self.tag.unwrap_or(self.address)
    }

    fn check_fresh(&self) -> Result<()> {
        let current = self.region.generation();
        if current != self.created_at {
            return Err(RuntimeError::StaleView {
                created: self.created_at,
                current,
            });
        }
        Ok(())
    }

    fn element_address(&self, index: u32) -> Result<u32> {
        if index >= self.len {
            return Err(RuntimeError::OutOfBounds {
                address: self.address,
                len: index.saturating_mul(4),
            });
        }
        Ok(self.address + index * 4)
    }

    /// Read element `index`.
    pub fn get(&self, ctx: &impl AsContext, index: u32) -> Result<f32> {
        self.check_fresh()?;
        self.region.read_f32(ctx, self.element_address(index)?)
    }

    /// Write element `index`.
    pub fn set(&self, ctx: &mut impl AsContextMut, index: u32, value: f32) -> Result<()> {
        self.check_fresh()?;
        self.region
            .write_f32(ctx, self.element_address(index)?, value)
    }

    /// Read all elements.
    pub fn to_vec(&self, ctx: &impl AsContext) -> Result<Vec<f32>> {
        self.check_fresh()?;
        self.region.read_f32_slice(ctx, self.address, self.len)
    }
}

impl std::fmt::Debug for AddressView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressView")
            .field("address", &self.address)
            .field("len", &self.len)
            .field("created_at", &self.created_at)
            .field("tag", &self.tag)
            .finish()
    }
}
