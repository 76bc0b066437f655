//! # Kernel Heap Allocator
//!
//! A `no_std` dynamic memory allocator for the kernel's SRAM heap, built
//! around a deterministic multi-level free list (a skip list indexed by block
//! size rather than by coin flips).
//!
//! ## Design outline
//! - **Storage**: a single contiguous region, taken over at init as one big
//!   free block. All allocator metadata lives inside the free blocks; the
//!   only fixed state is four list heads and a few counters.
//! - **Free lists**: four singly-linked lists sorted by address, one per size
//!   class (thresholds in [`level`]). A free block links into every list its
//!   size reaches, so searches for big blocks skip the small ones.
//! - **Walker**: traversal carries a per-level trail of "predecessor slots" —
//!   the link fields that must be rewritten to splice at the current
//!   position. This stands in for back-pointers: coalescing with the
//!   *previous* block works even though the lists are singly linked.
//! - **Allocation**: best-fit-by-class, first-fit within the class list,
//!   splitting the chosen block unless the remainder would be sub-minimum.
//! - **Free / resize**: freed blocks coalesce with both address-adjacent
//!   neighbors; resize moves the boundary shared with the following free
//!   block when there is one.
//! - **Façade**: [`KernelHeap`] wraps the sized engine API into C-style
//!   `malloc`/`calloc`/`realloc`/`free` by storing each block's size in a
//!   two-word header before the payload.
//! - **Synchronization**: none inside; [`static_heap`] serializes the
//!   kernel's instance with a spin lock.
//!
//! ## Constraints & caveats
//! - Fixed word alignment only; callers needing more aligned memory must
//!   over-allocate and align themselves.
//! - Freeing a pointer the heap did not hand out is unchecked and corrupts
//!   the heap.
//! - The heap does not grow by itself; on exhaustion the memory manager may
//!   donate more SRAM via [`KernelHeap::extend`].
//!
//! ## Related items
//! - [`debug`] walks the whole structure and validates its invariants — for
//!   bring-up and the test suite, not for hot paths.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod debug;
mod entry;
mod free_list;
mod heap;
pub mod level;
pub mod static_heap;
mod walker;

pub use free_list::{Allocation, SkipListAllocator};
pub use heap::{HEADER_SIZE, KernelHeap};
pub use level::{MIN_BLOCK_SIZE, NUM_LEVELS, WORD};
pub use static_heap::{KHEAP, ensure_init, kcalloc, kfree, kheap_extend, kmalloc, krealloc};
