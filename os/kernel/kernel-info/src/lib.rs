//! # Kernel Memory Layout Configuration
//!
//! The authoritative source for the physical memory layout shared between the
//! linker script, the physical page allocator and the code that maps physical
//! memory into the kernel's address space.
//!
//! ## Physical Memory Layout
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │   Device MMIO / unmanaged       │
//! PHYS_BASE   ├─────────────────────────────────┤ 0x8000_0000
//!             │       Kernel Image              │
//!             │   (Text, Data, BSS)             │
//! `end`       ├─────────────────────────────────┤ (linker symbol)
//!             │    Available RAM                │
//!             │  (Managed by the page allocator)│
//! PHYSTOP     └─────────────────────────────────┘ PHYS_BASE + 128 MiB
//! ```
//!
//! The end of the kernel image is only known at link time and is therefore
//! passed to the allocator at initialization instead of living here.
//!
//! All constants are `const` and validated by compile-time assertions.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
