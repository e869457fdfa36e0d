//! # Memory Layout

use kernel_memory_addresses::{PageSize, Size4K};

/// Size of a physical page frame in bytes.
pub const PAGE_SIZE: u64 = Size4K::SIZE;

/// Where RAM starts and the kernel image is loaded.
///
/// # Kernel Build
/// This information is sourced in the kernel's `build.rs` to configure
/// the linker.
pub const PHYS_BASE: u64 = 0x8000_0000;

/// Amount of RAM handed to the physical page allocator.
pub const PHYS_MEMORY_SIZE: u64 = 128 * 1024 * 1024;

/// First physical address past managed RAM (the physical ceiling).
pub const PHYSTOP: u64 = PHYS_BASE + PHYS_MEMORY_SIZE;

/// Number of page frames below [`PHYSTOP`], i.e. the size of per-frame tables
/// indexed by page number.
#[allow(clippy::cast_possible_truncation)]
pub const MANAGED_PAGES: usize = (PHYSTOP / PAGE_SIZE) as usize;

/// A simple Higher Half Direct Map (HHDM) base.
/// Anything you map at [`HHDM_BASE`] + `pa` lets the kernel
/// access physical memory via a fixed offset.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(PHYS_BASE.is_multiple_of(PAGE_SIZE));
    assert!(PHYSTOP.is_multiple_of(PAGE_SIZE));
    assert!(PHYSTOP > PHYS_BASE);
    assert!(HHDM_BASE.checked_add(PHYSTOP).is_some());
};
