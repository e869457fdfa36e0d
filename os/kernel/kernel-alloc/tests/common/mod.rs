#![allow(dead_code)]

use kernel_alloc::{OffsetPhysMapper, PageFrameAllocator, PhysLayout};
use kernel_memory_addresses::PhysicalAddress;

pub const PAGE: u64 = 4096;

#[repr(C, align(4096))]
#[derive(Clone)]
struct PageBuf([u8; 4096]);

/// Heap memory standing in for physical RAM `[0, pages * 4096)`.
pub struct Arena {
    pages: Vec<PageBuf>,
}

impl Arena {
    pub fn new(pages: usize) -> Self {
        Self {
            pages: vec![PageBuf([0; 4096]); pages],
        }
    }

    /// Maps physical address `0` to the first arena page.
    pub fn mapper(&mut self) -> OffsetPhysMapper {
        OffsetPhysMapper::new(self.pages.as_mut_ptr() as u64)
    }

    pub fn bytes(&self, pa: PhysicalAddress) -> &[u8; 4096] {
        &self.pages[(pa.as_u64() / PAGE) as usize].0
    }

    pub fn bytes_mut(&mut self, pa: PhysicalAddress) -> &mut [u8; 4096] {
        &mut self.pages[(pa.as_u64() / PAGE) as usize].0
    }
}

pub fn pa(v: u64) -> PhysicalAddress {
    PhysicalAddress::new(v)
}

/// An allocator over `arena` with the first `reserved` pages acting as the kernel image.
pub fn allocator<const PAGES: usize>(
    arena: &mut Arena,
    reserved: u64,
) -> PageFrameAllocator<OffsetPhysMapper, PAGES> {
    let alloc = PageFrameAllocator::new(arena.mapper());
    let layout = PhysLayout {
        kernel_end: pa(reserved * PAGE),
    };
    unsafe { alloc.initialize(layout) }.expect("valid layout");
    alloc
}
