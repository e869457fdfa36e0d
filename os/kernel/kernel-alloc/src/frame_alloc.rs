//! # Physical page frame allocator
//!
//! Hands out and reclaims whole 4 KiB page frames from a free list and keeps a
//! reference count per frame, so that a page shared by several owners (e.g.
//! after a copy-on-write fork) returns to the free list only when the last
//! owner releases it.
//!
//! ## Locking
//!
//! The free list and the reference count table each have their own spin lock
//! and the two are never held at the same time:
//!
//! - [`release`](PageFrameAllocator::release) finishes the decrement before it
//!   takes the free-list lock.
//! - [`allocate`](PageFrameAllocator::allocate) drops the free-list lock before
//!   it sets the fresh page's count.
//!
//! Between popping a page and setting its count to `1` the page is owned by the
//! allocating context alone; nobody else can name it yet.
//!
//! ## Junk patterns
//!
//! Released pages are filled with [`FREE_JUNK`], freshly allocated ones with
//! [`ALLOC_JUNK`], so reads of stale or uninitialized data show up as
//! recognizable garbage.

use crate::error::{AddressError, LayoutError};
use crate::free_list::FreeList;
use crate::phys_mapper::PhysMapper;
use crate::refcount::RefCountTable;
use crate::FrameAlloc;
use core::fmt;
use kernel_memory_addresses::{PageSize, PhysicalAddress, PhysicalPage, Size4K};
use kernel_sync::{SpinLock, SyncOnceCell};
use log::{debug, info, trace};

/// Byte written over a page when it is released.
pub const FREE_JUNK: u8 = 0x01;

/// Byte written over a page when it is allocated.
pub const ALLOC_JUNK: u8 = 0x05;

#[allow(clippy::cast_possible_truncation)]
const PAGE_BYTES: usize = Size4K::SIZE as usize;

/// Physical layout facts only known at boot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PhysLayout {
    /// First physical address after the kernel image. Pages below it are never
    /// accepted by [`PageFrameAllocator::release`].
    pub kernel_end: PhysicalAddress,
}

/// Page frame allocator with per-page reference counts, managing
/// `[layout.kernel_end, PAGES * 4096)`.
pub struct PageFrameAllocator<M, const PAGES: usize> {
    mapper: M,
    layout: SyncOnceCell<PhysLayout>,
    free: SpinLock<FreeList>,
    counts: RefCountTable<PAGES>,
}

impl<M: PhysMapper, const PAGES: usize> PageFrameAllocator<M, PAGES> {
    /// An empty, uninitialized allocator. Suitable for a `static`.
    pub const fn new(mapper: M) -> Self {
        Self {
            mapper,
            layout: SyncOnceCell::new(),
            free: SpinLock::new("kmem", FreeList::new()),
            counts: RefCountTable::new(),
        }
    }

    /// First physical address beyond the managed range.
    #[must_use]
    pub const fn ceiling(&self) -> PhysicalAddress {
        RefCountTable::<PAGES>::CEILING
    }

    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    #[must_use]
    pub fn layout(&self) -> Option<&PhysLayout> {
        self.layout.get()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.layout.get().is_some()
    }

    /// Record `layout` and seed the free list with every page in
    /// `[layout.kernel_end, ceiling)`. Returns the number of pages seeded.
    ///
    /// Must finish before any other core uses the allocator.
    ///
    /// # Errors
    /// - [`LayoutError::KernelEndAboveCeiling`] if the kernel image ends past the ceiling.
    /// - [`LayoutError::AlreadyInitialized`] on every call after the first successful one.
    ///
    /// # Safety
    /// Every page in `[layout.kernel_end, ceiling)` must be unused RAM, mapped
    /// writable through the allocator's mapper, and not referenced by anyone else.
    pub unsafe fn initialize(&self, layout: PhysLayout) -> Result<usize, LayoutError> {
        let ceiling = self.ceiling();
        if layout.kernel_end > ceiling {
            return Err(LayoutError::KernelEndAboveCeiling {
                kernel_end: layout.kernel_end,
                ceiling,
            });
        }
        self.layout
            .set(layout)
            .map_err(|_| LayoutError::AlreadyInitialized)?;

        // SAFETY: the caller vouches for the whole range above the kernel image.
        let seeded = unsafe { self.seed_range(layout.kernel_end, ceiling) };
        info!(
            "page allocator: {seeded} free pages in [{}, {ceiling})",
            layout.kernel_end
        );
        Ok(seeded)
    }

    /// Take one page off the free list.
    ///
    /// The page is filled with [`ALLOC_JUNK`] and its reference count is `1`.
    /// Returns `None` when no page is free.
    #[must_use]
    pub fn allocate(&self) -> Option<PhysicalAddress> {
        let page = self.free.with_lock(|list| list.pop(&self.mapper));
        let Some(page) = page else {
            debug!("page allocator: out of memory");
            return None;
        };

        // SAFETY: the page just left the free list and is ours alone.
        unsafe { self.fill(page, ALLOC_JUNK) };
        self.counts.set(page.base(), 1);
        trace!("allocate {page}");
        Some(page.base())
    }

    /// Like [`allocate`](Self::allocate), but the page is zero-filled.
    #[must_use]
    pub fn allocate_zeroed(&self) -> Option<PhysicalAddress> {
        let pa = self.allocate()?;
        // SAFETY: freshly allocated with a single owner, the caller.
        unsafe { self.fill(pa.page(), 0) };
        Some(pa)
    }

    /// Drop one reference to the page at `pa`. When the last reference is
    /// gone the page is filled with [`FREE_JUNK`] and pushed onto the free list.
    ///
    /// # Panics
    /// If the allocator is not initialized, or `pa` is not page aligned, lies
    /// inside the kernel image, or is at or above the ceiling.
    ///
    /// # Safety
    /// The caller must own one reference to the page and must not touch the
    /// page through it afterwards. Releasing a page that was never allocated
    /// hands memory to the allocator (only legitimate while seeding).
    pub unsafe fn release(&self, pa: PhysicalAddress) {
        let page = self
            .check_release(pa)
            .unwrap_or_else(|err| panic!("release: {err}"));

        let remaining = self.counts.decrement(pa);
        if remaining > 0 {
            trace!("release {page}: {remaining} references left");
            return;
        }

        // SAFETY: the last reference is gone; the caller no longer touches the page.
        unsafe { self.fill(page, FREE_JUNK) };
        // SAFETY: the page is unused and mapped; a page reaches zero only once per allocation.
        self.free
            .with_lock(|list| unsafe { list.push(&self.mapper, page) });
        trace!("release {page}: free");
    }

    /// Number of owners of the page containing `pa`.
    ///
    /// # Panics
    /// If `pa` lies at or above the ceiling.
    #[must_use]
    pub fn reference_count(&self, pa: PhysicalAddress) -> i32 {
        self.counts.get(pa)
    }

    /// Add an owner to an already allocated page without allocating.
    ///
    /// # Panics
    /// If `pa` is not page aligned or not below the ceiling.
    pub fn increment_reference_count(&self, pa: PhysicalAddress) {
        self.counts.increment(pa);
    }

    /// Number of pages currently on the free list.
    #[must_use]
    pub fn free_pages(&self) -> usize {
        self.free.lock().len()
    }

    fn check_release(&self, pa: PhysicalAddress) -> Result<PhysicalPage<Size4K>, AddressError> {
        let Some(layout) = self.layout.get() else {
            panic!("release: page allocator not initialized");
        };
        RefCountTable::<PAGES>::check(pa)?;
        if pa < layout.kernel_end {
            return Err(AddressError::InsideKernelImage {
                addr: pa,
                kernel_end: layout.kernel_end,
            });
        }
        Ok(pa.page())
    }

    /// # Safety
    /// `page` must be mapped writable and exclusively owned by the caller.
    unsafe fn fill(&self, page: PhysicalPage<Size4K>, byte: u8) {
        let ptr = self.mapper.phys_to_ptr::<u8>(page.base());
        unsafe { ptr.write_bytes(byte, PAGE_BYTES) };
    }
}

impl<M: PhysMapper, const PAGES: usize> FrameAlloc for &PageFrameAllocator<M, PAGES> {
    fn alloc_4k(&mut self) -> Option<PhysicalPage<Size4K>> {
        self.allocate_zeroed().map(PhysicalAddress::page::<Size4K>)
    }
}

impl<M, const PAGES: usize> fmt::Debug for PageFrameAllocator<M, PAGES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFrameAllocator")
            .field("ceiling", &RefCountTable::<PAGES>::CEILING)
            .field("layout", &self.layout.get())
            .field("free", &self.free)
            .finish_non_exhaustive()
    }
}
