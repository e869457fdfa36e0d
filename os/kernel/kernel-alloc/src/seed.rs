//! Feeding physical memory ranges into the allocator.

use crate::frame_alloc::PageFrameAllocator;
use crate::phys_mapper::PhysMapper;
use kernel_memory_addresses::{PageSize, PhysicalAddress, Size4K};
use log::debug;

impl<M: PhysMapper, const PAGES: usize> PageFrameAllocator<M, PAGES> {
    /// Release every whole page in `[start, end)` into the allocator, in
    /// ascending address order. `start` is rounded up to a page boundary and a
    /// trailing partial page is skipped. Returns the number of pages released.
    ///
    /// Pages enter through the ordinary [`release`](Self::release) path. Their
    /// counters have never been incremented, so the decrement leaves them at
    /// `-1` until the page is first allocated.
    ///
    /// # Panics
    /// If the allocator is not initialized, or a page in the range is rejected
    /// by [`release`](Self::release).
    ///
    /// # Safety
    /// Every page in the range must be unused RAM, mapped writable through the
    /// allocator's mapper, and not already owned by the allocator.
    pub unsafe fn seed_range(&self, start: PhysicalAddress, end: PhysicalAddress) -> usize {
        let Some(first) = start.align_up::<Size4K>() else {
            return 0;
        };

        let mut page = first.page::<Size4K>();
        let mut seeded = 0;
        while page
            .base()
            .checked_add(Size4K::SIZE)
            .is_some_and(|page_end| page_end <= end)
        {
            // SAFETY: the caller hands the whole range over.
            unsafe { self.release(page.base()) };
            seeded += 1;

            let Some(next) = page.next() else {
                break;
            };
            page = next;
        }

        debug!("seeded {seeded} pages from [{start}, {end})");
        seeded
    }
}
