//! # Physical Address Types
//!
//! Strongly typed wrappers for physical addresses and page frames used by the
//! physical memory allocator.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] | An arbitrary byte address in physical memory. |
//! | [`PhysicalPage<S>`] | The page-aligned base of a page frame of size `S`. |
//!
//! The page size is carried at the type level through the [`PageSize`] trait.
//! Only [`Size4K`] is provided; it is the allocator's sole unit of currency.
//!
//! ## Page numbers
//!
//! A page frame is also identified by its page number, `address / S::SIZE`.
//! Page numbers index per-frame metadata such as reference counts.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x3042);
//! assert!(!pa.is_aligned::<Size4K>());
//!
//! let page = pa.page::<Size4K>();
//! assert_eq!(page.base(), PhysicalAddress::new(0x3000));
//! assert_eq!(page.number(), 3);
//!
//! assert_eq!(pa.align_up::<Size4K>(), Some(PhysicalAddress::new(0x4000)));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod page_size;
mod physical_address;
mod physical_page;

pub use page_size::{PageSize, Size4K};
pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
