//! # Physical memory access
//!
//! The allocator has to touch the pages it manages: free pages carry the
//! free-list link in their first bytes, and every page is filled with a junk
//! pattern when it changes hands. Code can only dereference virtual addresses,
//! so a [`PhysMapper`] translates a physical address into a pointer in the
//! current address space.
//!
//! - [`HhdmPhysMapper`]: the kernel's higher-half direct map, `HHDM_BASE + pa`.
//! - [`OffsetPhysMapper`]: any fixed offset, including the identity map
//!   (offset zero) used before paging is enabled.
//!
//! ## Example
//! ```rust
//! use kernel_alloc::phys_mapper::{OffsetPhysMapper, PhysMapper};
//! use kernel_memory_addresses::PhysicalAddress;
//!
//! let identity = OffsetPhysMapper::identity();
//! let ptr = identity.phys_to_ptr::<u8>(PhysicalAddress::new(0x8000_0000));
//! assert_eq!(ptr as u64, 0x8000_0000);
//! ```

use kernel_info::memory::HHDM_BASE;
use kernel_memory_addresses::PhysicalAddress;

/// Converts physical addresses to pointers usable in the current address space.
///
/// Computing the pointer is safe; dereferencing it is only sound if the
/// physical address is mapped writable and no one else accesses the memory
/// concurrently.
pub trait PhysMapper {
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T;
}

/// [`PhysMapper`] adding a fixed offset to every physical address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OffsetPhysMapper {
    offset: u64,
}

impl OffsetPhysMapper {
    #[must_use]
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }

    /// Physical addresses are used as-is.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl PhysMapper for OffsetPhysMapper {
    #[inline]
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T {
        pa.as_u64().wrapping_add(self.offset) as *mut T
    }
}

/// [`PhysMapper`] for kernels with a higher-half direct map (HHDM).
///
/// The HHDM mapping must be present and cover the whole managed range before
/// any returned pointer is dereferenced.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct HhdmPhysMapper;

impl PhysMapper for HhdmPhysMapper {
    #[inline]
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T {
        OffsetPhysMapper::new(HHDM_BASE).phys_to_ptr(pa)
    }
}
