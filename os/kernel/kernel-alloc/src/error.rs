//! Error types of the physical page allocator.

use kernel_memory_addresses::PhysicalAddress;

/// Why a physical address was rejected by the allocator or the reference count table.
///
/// These describe caller bugs. The public operations turn them into a fatal
/// `panic!`; they are never returned to the caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AddressError {
    #[error("physical address {0} is not page aligned")]
    Unaligned(PhysicalAddress),
    #[error("physical address {addr} is at or above the physical ceiling {ceiling}")]
    AboveCeiling {
        addr: PhysicalAddress,
        ceiling: PhysicalAddress,
    },
    #[error("physical address {addr} lies inside the kernel image ending at {kernel_end}")]
    InsideKernelImage {
        addr: PhysicalAddress,
        kernel_end: PhysicalAddress,
    },
}

/// Why [`PageFrameAllocator::initialize`](crate::PageFrameAllocator::initialize) refused a layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("the page allocator is already initialized")]
    AlreadyInitialized,
    #[error("kernel image end {kernel_end} lies beyond the physical ceiling {ceiling}")]
    KernelEndAboveCeiling {
        kernel_end: PhysicalAddress,
        ceiling: PhysicalAddress,
    },
}
