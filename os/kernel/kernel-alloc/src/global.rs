//! # The kernel's page allocator
//!
//! One [`PageFrameAllocator`] for the whole kernel, living in a `static` and
//! covering every page frame below [`PHYSTOP`](kernel_info::memory::PHYSTOP).
//! Physical memory is reached through the higher-half direct map.
//!
//! Boot calls [`initialize`] once with the end of the kernel image; afterwards
//! any core may call the other functions concurrently.

use crate::error::LayoutError;
use crate::frame_alloc::{PageFrameAllocator, PhysLayout};
use crate::phys_mapper::HhdmPhysMapper;
use kernel_info::memory::MANAGED_PAGES;
use kernel_memory_addresses::PhysicalAddress;

pub type KernelPageAllocator = PageFrameAllocator<HhdmPhysMapper, MANAGED_PAGES>;

static KMEM: KernelPageAllocator = PageFrameAllocator::new(HhdmPhysMapper);

#[must_use]
pub fn allocator() -> &'static KernelPageAllocator {
    &KMEM
}

/// See [`PageFrameAllocator::initialize`].
///
/// # Errors
/// See [`PageFrameAllocator::initialize`].
///
/// # Safety
/// See [`PageFrameAllocator::initialize`]; the HHDM must already cover
/// `[layout.kernel_end, PHYSTOP)`.
pub unsafe fn initialize(layout: PhysLayout) -> Result<usize, LayoutError> {
    unsafe { KMEM.initialize(layout) }
}

#[must_use]
pub fn allocate() -> Option<PhysicalAddress> {
    KMEM.allocate()
}

/// See [`PageFrameAllocator::release`].
///
/// # Safety
/// See [`PageFrameAllocator::release`].
pub unsafe fn release(pa: PhysicalAddress) {
    unsafe { KMEM.release(pa) }
}

#[must_use]
pub fn reference_count(pa: PhysicalAddress) -> i32 {
    KMEM.reference_count(pa)
}

pub fn increment_reference_count(pa: PhysicalAddress) {
    KMEM.increment_reference_count(pa);
}

#[must_use]
pub fn free_pages() -> usize {
    KMEM.free_pages()
}
