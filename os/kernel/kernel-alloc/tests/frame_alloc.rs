mod common;

use common::{Arena, PAGE, allocator, pa};
use kernel_alloc::{
    ALLOC_JUNK, FREE_JUNK, FrameAlloc, LayoutError, OffsetPhysMapper, PageFrameAllocator,
    PhysLayout,
};

#[test]
fn three_page_walkthrough() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    assert_eq!(alloc.free_pages(), 3);

    assert_eq!(alloc.allocate(), Some(pa(0x3000)));
    assert_eq!(alloc.allocate(), Some(pa(0x2000)));
    unsafe { alloc.release(pa(0x3000)) };
    assert_eq!(alloc.free_pages(), 2);
    assert_eq!(alloc.allocate(), Some(pa(0x3000)));
}

#[test]
fn initialize_reports_seeded_pages() {
    let mut arena = Arena::new(8);
    let alloc = PageFrameAllocator::<_, 8>::new(arena.mapper());
    assert!(!alloc.is_initialized());
    assert_eq!(alloc.ceiling(), pa(0x8000));

    let layout = PhysLayout {
        kernel_end: pa(0x2000),
    };
    assert_eq!(unsafe { alloc.initialize(layout) }, Ok(6));
    assert!(alloc.is_initialized());
    assert_eq!(alloc.layout(), Some(&layout));
}

#[test]
fn unaligned_kernel_end_rounds_up() {
    let mut arena = Arena::new(8);
    let alloc = PageFrameAllocator::<_, 8>::new(arena.mapper());
    let layout = PhysLayout {
        kernel_end: pa(0x1800),
    };
    assert_eq!(unsafe { alloc.initialize(layout) }, Ok(6));
    assert_eq!(alloc.allocate(), Some(pa(0x7000)));
}

#[test]
fn second_initialize_is_rejected() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    let again = unsafe {
        alloc.initialize(PhysLayout {
            kernel_end: pa(0x1000),
        })
    };
    assert_eq!(again, Err(LayoutError::AlreadyInitialized));
    assert_eq!(alloc.free_pages(), 3);
}

#[test]
fn kernel_end_beyond_ceiling_is_rejected() {
    let alloc = PageFrameAllocator::<_, 4>::new(OffsetPhysMapper::identity());
    let res = unsafe {
        alloc.initialize(PhysLayout {
            kernel_end: pa(0x5000),
        })
    };
    assert_eq!(
        res,
        Err(LayoutError::KernelEndAboveCeiling {
            kernel_end: pa(0x5000),
            ceiling: pa(0x4000),
        })
    );
    assert!(!alloc.is_initialized());
}

#[test]
fn kernel_end_at_ceiling_leaves_nothing_to_allocate() {
    let alloc = PageFrameAllocator::<_, 4>::new(OffsetPhysMapper::identity());
    let seeded = unsafe {
        alloc.initialize(PhysLayout {
            kernel_end: pa(0x4000),
        })
    };
    assert_eq!(seeded, Ok(0));
    assert_eq!(alloc.allocate(), None);
}

#[test]
fn seeded_pages_sit_below_zero_until_allocated() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);

    for n in 1..4 {
        assert_eq!(alloc.reference_count(pa(n * PAGE)), -1);
    }
    // The reserved kernel page is never touched.
    assert_eq!(alloc.reference_count(pa(0)), 0);
}

#[test]
fn allocated_pages_have_exactly_one_owner() {
    let mut arena = Arena::new(9);
    let alloc = allocator::<9>(&mut arena, 1);

    let mut pages = Vec::new();
    while let Some(page) = alloc.allocate() {
        assert_eq!(alloc.reference_count(page), 1);
        pages.push(page);
    }
    assert_eq!(pages.len(), 8);

    for page in &pages {
        unsafe { alloc.release(*page) };
        assert_eq!(alloc.reference_count(*page), 0);
    }
    while let Some(page) = alloc.allocate() {
        assert_eq!(alloc.reference_count(page), 1);
    }
}

#[test]
fn free_list_is_a_stack() {
    let mut arena = Arena::new(8);
    let alloc = allocator::<8>(&mut arena, 1);

    let a = alloc.allocate().unwrap();
    let b = alloc.allocate().unwrap();
    unsafe {
        alloc.release(a);
        alloc.release(b);
    }
    assert_eq!(alloc.allocate(), Some(b));
    assert_eq!(alloc.allocate(), Some(a));
}

#[test]
fn shared_page_survives_until_last_release() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);

    let p = alloc.allocate().unwrap();
    alloc.increment_reference_count(p);
    assert_eq!(alloc.reference_count(p), 2);

    unsafe { alloc.release(p) };
    assert_eq!(alloc.reference_count(p), 1);
    assert_eq!(alloc.free_pages(), 2);
    let others = [alloc.allocate(), alloc.allocate()];
    assert!(others.iter().all(|o| o.is_some() && *o != Some(p)));
    assert_eq!(alloc.allocate(), None);

    unsafe { alloc.release(p) };
    assert_eq!(alloc.reference_count(p), 0);
    assert_eq!(alloc.allocate(), Some(p));
}

#[test]
fn pages_are_scrubbed_on_release_and_allocate() {
    const MARKER: &[u8] = b"copy-on-write marker";

    let mut arena = Arena::new(2);
    let alloc = allocator::<2>(&mut arena, 1);

    let p = alloc.allocate().unwrap();
    assert!(arena.bytes(p).iter().all(|b| *b == ALLOC_JUNK));

    arena.bytes_mut(p)[100..100 + MARKER.len()].copy_from_slice(MARKER);
    unsafe { alloc.release(p) };

    let freed = arena.bytes(p);
    assert!(!freed.windows(MARKER.len()).any(|w| w == MARKER));
    // The free-list link occupies the head of the page; the rest is junk.
    assert!(freed[64..].iter().all(|b| *b == FREE_JUNK));

    assert_eq!(alloc.allocate(), Some(p));
    assert!(arena.bytes(p).iter().all(|b| *b == ALLOC_JUNK));
}

#[test]
fn allocate_zeroed_clears_the_page() {
    let mut arena = Arena::new(3);
    let alloc = allocator::<3>(&mut arena, 1);

    let p = alloc.allocate_zeroed().unwrap();
    assert!(arena.bytes(p).iter().all(|b| *b == 0));
    assert_eq!(alloc.reference_count(p), 1);
}

#[test]
fn frame_alloc_hands_out_zeroed_frames() {
    let mut arena = Arena::new(3);
    let alloc = allocator::<3>(&mut arena, 1);

    let mut frames = &alloc;
    let first = frames.alloc_4k().unwrap();
    let second = frames.alloc_4k().unwrap();
    assert_ne!(first, second);
    assert!(frames.alloc_4k().is_none());

    assert!(arena.bytes(first.base()).iter().all(|b| *b == 0));
    assert_eq!(alloc.reference_count(second.base()), 1);
}

#[test]
fn exhaustion_is_recoverable() {
    let mut arena = Arena::new(6);
    let alloc = allocator::<6>(&mut arena, 1);

    let pages: Vec<_> = (0..5).map(|_| alloc.allocate().unwrap()).collect();
    assert_eq!(alloc.allocate(), None);
    assert_eq!(alloc.free_pages(), 0);

    unsafe { alloc.release(pages[2]) };
    assert_eq!(alloc.allocate(), Some(pages[2]));
    assert_eq!(alloc.allocate(), None);
}

#[test]
fn seed_range_skips_partial_pages() {
    let mut arena = Arena::new(8);
    let alloc = allocator::<8>(&mut arena, 1);
    while alloc.allocate().is_some() {}

    // Rounds 0x2800 up to 0x3000; the page at 0x5000 does not fit below 0x5800.
    assert_eq!(unsafe { alloc.seed_range(pa(0x2800), pa(0x5800)) }, 2);
    assert_eq!(alloc.free_pages(), 2);
    assert_eq!(alloc.allocate(), Some(pa(0x4000)));
    assert_eq!(alloc.allocate(), Some(pa(0x3000)));

    assert_eq!(unsafe { alloc.seed_range(pa(0x6000), pa(0x6FFF)) }, 0);
}

#[test]
fn debug_output_names_the_locks() {
    let mut arena = Arena::new(2);
    let alloc = allocator::<2>(&mut arena, 1);
    let dbg = format!("{alloc:?}");
    assert!(dbg.contains("kmem"));
    assert!(dbg.contains("kernel_end"));
}

#[test]
#[should_panic(expected = "release: page allocator not initialized")]
fn release_before_initialize_is_fatal() {
    let alloc = PageFrameAllocator::<_, 4>::new(OffsetPhysMapper::identity());
    unsafe { alloc.release(pa(0x1000)) };
}

#[test]
#[should_panic(expected = "is not page aligned")]
fn release_unaligned_is_fatal() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    let p = alloc.allocate().unwrap();
    unsafe { alloc.release(pa(p.as_u64() + 1)) };
}

#[test]
#[should_panic(expected = "at or above the physical ceiling")]
fn release_at_ceiling_is_fatal() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    unsafe { alloc.release(pa(0x4000)) };
}

#[test]
#[should_panic(expected = "inside the kernel image")]
fn release_inside_kernel_image_is_fatal() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 2);
    unsafe { alloc.release(pa(0x1000)) };
}

#[test]
#[should_panic(expected = "refcount increment")]
fn increment_above_ceiling_is_fatal() {
    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    alloc.increment_reference_count(pa(0x8000));
}

#[test]
fn rejected_release_leaves_state_untouched() {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    let mut arena = Arena::new(4);
    let alloc = allocator::<4>(&mut arena, 1);
    let p = alloc.allocate().unwrap();

    let res = catch_unwind(AssertUnwindSafe(|| unsafe { alloc.release(pa(p.as_u64() + 8)) }));
    assert!(res.is_err());
    assert_eq!(alloc.reference_count(p), 1);
    assert_eq!(alloc.free_pages(), 2);
}
