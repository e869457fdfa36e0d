use crate::{PageSize, PhysicalAddress};
use core::fmt;
use core::marker::PhantomData;

/// Physical page frame of size `S`.
///
/// Stored as the page number (`base / S::SIZE`), so the base is aligned by
/// construction.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let page = PhysicalPage::<Size4K>::from_number(0x80000);
/// assert_eq!(page.base(), PhysicalAddress::new(0x8000_0000));
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage<S: PageSize> {
    number: u64,
    _phantom: PhantomData<S>,
}

impl<S: PageSize> PhysicalPage<S> {
    #[inline]
    #[must_use]
    pub const fn from_number(number: u64) -> Self {
        Self {
            number,
            _phantom: PhantomData,
        }
    }

    /// The page starting exactly at `pa`, or `None` if `pa` is not aligned.
    #[inline]
    #[must_use]
    pub const fn from_aligned(pa: PhysicalAddress) -> Option<Self> {
        if pa.is_aligned::<S>() {
            Some(pa.page::<S>())
        } else {
            None
        }
    }

    /// Page number, i.e. `base / S::SIZE`.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        self.number
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new(self.number << S::SHIFT)
    }

    /// The page directly following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.number.checked_add(1) {
            Some(number) => Some(Self::from_number(number)),
            None => None,
        }
    }
}

impl<S> fmt::Display for PhysicalPage<S>
where
    S: PageSize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/{}", self.base().as_u64(), S::as_str())
    }
}

impl<S: PageSize> fmt::Debug for PhysicalPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PhysicalPage<{}>({:#018X})",
            S::as_str(),
            self.base().as_u64()
        )
    }
}
