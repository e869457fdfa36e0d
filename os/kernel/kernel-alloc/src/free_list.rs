use crate::phys_mapper::PhysMapper;
use kernel_memory_addresses::{PhysicalPage, Size4K};

type Frame = PhysicalPage<Size4K>;

/// Link stored at the beginning of every **free** page.
///
/// ```text
/// +-----------------+-------------------------------+
/// | FreeLink (next) |   junk (free pattern)         |
/// +-----------------+-------------------------------+
/// ^ page base                                       ^ page base + 4 KiB
/// ```
#[repr(C)]
struct FreeLink {
    next: Option<Frame>,
}

/// An intrusive LIFO stack of free page frames.
///
/// # Invariants
/// - Every frame on the list is owned by the list; nobody else reads or
///   writes its memory.
/// - No frame appears twice.
/// - `len` equals the number of frames reachable from `head`.
pub struct FreeList {
    head: Option<Frame>,
    len: usize,
}

impl FreeList {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    /// Push `page` onto the list, writing the link into the page itself.
    ///
    /// # Safety
    /// - `page` must be unused and mapped writable through `mapper`.
    /// - `page` must not already be on the list.
    pub unsafe fn push<M: PhysMapper>(&mut self, mapper: &M, page: Frame) {
        let link = mapper.phys_to_ptr::<FreeLink>(page.base());
        // SAFETY: the caller hands the page over; page bases are aligned for `FreeLink`.
        unsafe { link.write(FreeLink { next: self.head }) };
        self.head = Some(page);
        self.len += 1;
    }

    /// Pop the most recently pushed page.
    pub fn pop<M: PhysMapper>(&mut self, mapper: &M) -> Option<Frame> {
        let page = self.head?;
        // SAFETY: frames on the list are owned by it and carry the link written by `push`.
        let link = unsafe { mapper.phys_to_ptr::<FreeLink>(page.base()).read() };
        self.head = link.next;
        self.len -= 1;
        Some(page)
    }
}
