//! # Reference Count Table
//!
//! One signed counter per page frame below the physical ceiling, indexed by
//! page number. A counter of `1` or more means the page has that many owners;
//! pages on the free list sit at `0` (or `-1` right after seeding, see
//! [`PageFrameAllocator::seed_range`](crate::PageFrameAllocator::seed_range)).
//!
//! All accesses are serialized by a single table-wide spin lock.

use crate::error::AddressError;
use kernel_memory_addresses::{PageSize, PhysicalAddress, Size4K};
use kernel_sync::SpinLock;
use log::trace;

/// Per-page reference counters covering `[0, PAGES * 4096)`.
pub struct RefCountTable<const PAGES: usize> {
    counts: SpinLock<[i32; PAGES]>,
}

impl<const PAGES: usize> Default for RefCountTable<PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PAGES: usize> RefCountTable<PAGES> {
    /// First physical address not covered by the table.
    pub const CEILING: PhysicalAddress = PhysicalAddress::new(PAGES as u64 * Size4K::SIZE);

    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: SpinLock::new("refcnt", [0; PAGES]),
        }
    }

    #[must_use]
    pub const fn ceiling(&self) -> PhysicalAddress {
        Self::CEILING
    }

    /// Validate `pa` as a page base below the ceiling and return its page number.
    ///
    /// # Errors
    /// [`AddressError::Unaligned`] or [`AddressError::AboveCeiling`].
    pub fn check(pa: PhysicalAddress) -> Result<usize, AddressError> {
        if !pa.is_aligned::<Size4K>() {
            return Err(AddressError::Unaligned(pa));
        }
        if pa >= Self::CEILING {
            return Err(AddressError::AboveCeiling {
                addr: pa,
                ceiling: Self::CEILING,
            });
        }
        Ok(Self::index(pa))
    }

    #[inline]
    fn index(pa: PhysicalAddress) -> usize {
        usize::try_from(pa.page::<Size4K>().number()).unwrap_or(usize::MAX)
    }

    /// Current counter of the page containing `pa`.
    ///
    /// # Panics
    /// If `pa` lies at or above the ceiling.
    #[must_use]
    pub fn get(&self, pa: PhysicalAddress) -> i32 {
        self.counts.lock()[Self::index(pa)]
    }

    /// Add one owner to the page at `pa`.
    ///
    /// # Panics
    /// If `pa` is not page aligned or not below the ceiling.
    pub fn increment(&self, pa: PhysicalAddress) {
        let idx = Self::check(pa).unwrap_or_else(|err| panic!("refcount increment: {err}"));
        let count = self.counts.with_lock(|counts| {
            counts[idx] += 1;
            counts[idx]
        });
        trace!("refcount {pa} -> {count}");
    }

    /// Drop one owner of the page at `pa` and return the remaining count.
    ///
    /// # Panics
    /// If `pa` is not page aligned or not below the ceiling.
    #[must_use]
    pub fn decrement(&self, pa: PhysicalAddress) -> i32 {
        let idx = Self::check(pa).unwrap_or_else(|err| panic!("refcount decrement: {err}"));
        self.counts.with_lock(|counts| {
            counts[idx] -= 1;
            counts[idx]
        })
    }

    /// Overwrite the counter of a page nobody else can reach yet.
    pub(crate) fn set(&self, pa: PhysicalAddress, value: i32) {
        let idx = Self::check(pa).unwrap_or_else(|err| panic!("refcount set: {err}"));
        self.counts.lock()[idx] = value;
    }
}
