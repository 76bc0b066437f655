//! User-visible allocation interface over the free-list engine.
//!
//! The engine deals in sized blocks and expects the caller to remember block
//! sizes. This layer makes the familiar pointer-only interface out of that by
//! prefixing every allocation with a header of [`HEADER_SIZE`] bytes whose
//! first word records the block's total size:
//!
//! ```text
//! +--------+--------+--------------------------+
//! | size   | unused |       user payload       |
//! +--------+--------+--------------------------+
//! ^ block base      ^ pointer handed to caller
//! ```
//!
//! Requests are rounded up to the word so every block boundary, block size
//! and user pointer stays word-aligned. Null is the only failure signal.
//!
//! Nothing here locks: the caller serializes (the kernel's static instance
//! in [`crate::static_heap`] wraps this type in a spin lock).

use core::ptr::{self, null_mut};

use log::{debug, info};

use crate::free_list::SkipListAllocator;
use crate::level::WORD;

/// Bytes between the block base and the user payload. The first word holds
/// the block size; the second keeps the payload a nicely even two words in.
pub const HEADER_SIZE: usize = 2 * WORD;

/// `req` rounded up to the word, plus the header — the total block size to
/// request from the engine. `None` when the arithmetic would wrap.
#[inline]
fn request_size(req: usize) -> Option<usize> {
    debug_assert!(req > 0);
    ((req - 1) & !(WORD - 1))
        .checked_add(WORD)?
        .checked_add(HEADER_SIZE)
}

#[inline]
fn is_aligned(ptr: *mut u8) -> bool {
    (ptr as usize).is_multiple_of(WORD)
}

/// The kernel heap: engine plus header bookkeeping.
pub struct KernelHeap {
    list: SkipListAllocator,
}

impl KernelHeap {
    pub const fn new() -> Self {
        Self {
            list: SkipListAllocator::new(),
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.list.is_initialized()
    }

    /// Bytes currently free.
    pub const fn free_bytes(&self) -> usize {
        self.list.free_bytes()
    }

    /// Bytes under management, free or allocated.
    pub const fn total_bytes(&self) -> usize {
        self.list.total_bytes()
    }

    /// The underlying free-list engine, e.g. for [`crate::debug`] walks.
    pub const fn engine(&self) -> &SkipListAllocator {
        &self.list
    }

    /// Hand the heap its memory. See [`SkipListAllocator::init`].
    ///
    /// # Safety
    /// As [`SkipListAllocator::init`].
    pub unsafe fn init(&mut self, start: usize, size: usize) {
        unsafe { self.list.init(start, size) };
        info!("heap: managing {} KiB at {start:#x}", size / 1024);
    }

    /// Donate a further region, e.g. after the memory manager grew the heap
    /// in response to an out-of-memory return.
    ///
    /// # Safety
    /// As [`SkipListAllocator::extend`].
    pub unsafe fn extend(&mut self, start: usize, size: usize) {
        unsafe { self.list.extend(start, size) };
        debug!("heap: extended by {size} bytes at {start:#x}");
    }

    /// Allocate `req` bytes. Returns a word-aligned pointer, or null when
    /// `req` is zero or nothing fits.
    ///
    /// # Safety
    /// Exclusive access to the heap for the duration of the call.
    pub unsafe fn malloc(&mut self, req: usize) -> *mut u8 {
        if req == 0 {
            return null_mut();
        }
        let Some(size) = request_size(req) else {
            return null_mut();
        };
        match unsafe { self.list.malloc(size) } {
            Some(grant) => {
                // record what the engine actually gave out, which may exceed
                // the request; free() returns exactly this many bytes
                unsafe { grant.ptr.cast::<usize>().write(grant.size) };
                unsafe { grant.ptr.add(HEADER_SIZE) }
            }
            None => null_mut(),
        }
    }

    /// Allocate `req` bytes and zero them. Every word of the block past the
    /// stored size is cleared, so the payload reads zero.
    ///
    /// # Safety
    /// As [`malloc`](Self::malloc).
    pub unsafe fn calloc(&mut self, req: usize) -> *mut u8 {
        let payload = unsafe { self.malloc(req) };
        if payload.is_null() {
            return payload;
        }
        let base = unsafe { payload.sub(HEADER_SIZE) }.cast::<usize>();
        let words = unsafe { base.read() } / WORD;
        unsafe { ptr::write_bytes(base.add(1), 0, words - 1) };
        payload
    }

    /// Release an allocation. Null and misaligned pointers are ignored;
    /// anything else must be a live pointer from this heap.
    ///
    /// # Safety
    /// As [`malloc`](Self::malloc); `payload` must be null, misaligned, or a
    /// pointer previously returned by this heap and not freed since.
    pub unsafe fn free(&mut self, payload: *mut u8) {
        if payload.is_null() || !is_aligned(payload) {
            return;
        }
        let base = unsafe { payload.sub(HEADER_SIZE) };
        let size = unsafe { base.cast::<usize>().read() };
        unsafe { self.list.free(size, base) };
    }

    /// Resize an allocation to `req` bytes, in place when the neighboring
    /// memory allows it and by allocate-copy-free otherwise.
    ///
    /// Degenerate forms follow the C convention: a null `payload` allocates,
    /// `req == 0` frees (returning null). A misaligned `payload` is returned
    /// unchanged. When neither in-place resize nor a fresh allocation is
    /// possible the result is null and the original block stays valid.
    ///
    /// # Safety
    /// As [`free`](Self::free).
    pub unsafe fn realloc(&mut self, req: usize, payload: *mut u8) -> *mut u8 {
        if payload.is_null() {
            return unsafe { self.malloc(req) };
        }
        if req == 0 {
            unsafe { self.free(payload) };
            return null_mut();
        }
        if !is_aligned(payload) {
            return payload;
        }

        let base = unsafe { payload.sub(HEADER_SIZE) };
        let old_size = unsafe { base.cast::<usize>().read() };
        let Some(new_size) = request_size(req) else {
            return null_mut();
        };
        if new_size == old_size {
            return payload;
        }

        if let Some(effective) = unsafe { self.list.resize(old_size, new_size, base) } {
            unsafe { base.cast::<usize>().write(effective) };
            return payload;
        }

        // no room in place: allocate fresh, carry the payload over, release
        let Some(grant) = (unsafe { self.list.malloc(new_size) }) else {
            return null_mut();
        };
        unsafe { grant.ptr.cast::<usize>().write(grant.size) };
        let fresh = unsafe { grant.ptr.add(HEADER_SIZE) };
        let carry = old_size.min(new_size) - HEADER_SIZE;
        unsafe { ptr::copy_nonoverlapping(payload, fresh, carry) };
        unsafe { self.list.free(old_size, base) };
        fresh
    }
}

impl Default for KernelHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_size_rounds_and_prefixes() {
        // one word for any 1..=WORD request, plus the header
        assert_eq!(request_size(1), Some(WORD + HEADER_SIZE));
        assert_eq!(request_size(WORD), Some(WORD + HEADER_SIZE));
        assert_eq!(request_size(WORD + 1), Some(2 * WORD + HEADER_SIZE));
        assert_eq!(request_size(16), Some(16 + HEADER_SIZE));
    }

    #[test]
    fn request_size_refuses_wrapping() {
        assert_eq!(request_size(usize::MAX), None);
        assert_eq!(request_size(usize::MAX - HEADER_SIZE), None);
    }
}
