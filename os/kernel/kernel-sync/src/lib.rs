//! # Kernel synchronization primitives
//!
//! * [`SpinLock`]: a named busy-waiting lock for short, non-sleeping critical sections.
//! * [`SyncOnceCell`]: a value published once during boot and read lock-free afterwards.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;
mod sync_once_cell;

pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
