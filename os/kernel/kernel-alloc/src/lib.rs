//! # Kernel Physical Page Allocation
//!
//! This crate owns the kernel's physical memory: it hands out whole 4 KiB page
//! frames, takes them back, and counts how many owners share each frame so that
//! copy-on-write pages survive until their last owner lets go.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                Range Initializer                    │
//! │    • seed_range(start, end) at boot                 │
//! │    • releases every whole page once, ascending      │
//! └─────────────────┬───────────────────────────────────┘
//!                   │ release
//! ┌─────────────────▼───────────────────────────────────┐
//! │              Page Frame Allocator                   │
//! │    • allocate / release / allocate_zeroed           │
//! │    • intrusive LIFO free list ("kmem" lock)         │
//! │    • junk-fills pages on every hand-over            │
//! └─────────────────┬───────────────────────────────────┘
//!                   │ decrement / set
//! ┌─────────────────▼───────────────────────────────────┐
//! │              Reference Count Table                  │
//! │    • one i32 per page below the ceiling             │
//! │    • get / increment / decrement ("refcnt" lock)    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The two locks are never held at the same time, see [`frame_alloc`].
//!
//! ## Errors
//!
//! Running out of pages is the only recoverable failure: [`PageFrameAllocator::allocate`]
//! returns `None`. Misaligned addresses, addresses outside the managed range
//! and addresses inside the kernel image are caller bugs and abort the kernel
//! with a panic describing the [`AddressError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kernel_alloc::{global, PhysLayout};
//! use kernel_memory_addresses::PhysicalAddress;
//!
//! # let kernel_end = PhysicalAddress::new(0x8020_0000);
//! // Once, on the boot core:
//! unsafe { global::initialize(PhysLayout { kernel_end }) }.expect("page allocator");
//!
//! // Anywhere, later:
//! let page = global::allocate().expect("out of memory");
//! global::increment_reference_count(page); // share it
//! unsafe { global::release(page) };        // still referenced once
//! unsafe { global::release(page) };        // back on the free list
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod error;
mod free_list;
pub mod frame_alloc;
pub mod global;
pub mod phys_mapper;
pub mod refcount;
mod seed;

pub use error::{AddressError, LayoutError};
pub use frame_alloc::{ALLOC_JUNK, FREE_JUNK, PageFrameAllocator, PhysLayout};
pub use phys_mapper::{HhdmPhysMapper, OffsetPhysMapper, PhysMapper};
pub use refcount::RefCountTable;

use kernel_memory_addresses::{PhysicalPage, Size4K};

/// Source of zeroed 4 KiB frames for page-table construction.
pub trait FrameAlloc {
    /// Allocate one zero-filled frame, or `None` when memory is exhausted.
    fn alloc_4k(&mut self) -> Option<PhysicalPage<Size4K>>;
}
