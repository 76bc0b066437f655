//! # Static Kernel Heap
//!
//! The single heap instance the kernel allocates from, backed by the SRAM
//! left over after the kernel image. The backing storage is a `.bss.heap`
//! array so the linker places it (and the image budget in `kernel-info`
//! keeps the sum inside SRAM).
//!
//! The façade itself takes no locks; this module is where the kernel's
//! serialization lives. Every entry point goes through one [`SpinLock`]
//! around the whole operation, so the engine always runs under mutual
//! exclusion. Callers in interrupt context must not re-enter.

use core::sync::atomic::{AtomicBool, Ordering};

use kernel_info::memory::{HEAP_ALIGN, HEAP_SIZE};
use kernel_sync::SpinLock;

use crate::heap::KernelHeap;

/// Heap storage, aligned for the free-block headers and the strictest
/// primitive types the kernel stores in heap memory.
#[repr(align(16))]
struct HeapMem([u8; HEAP_SIZE]);

const _: () = assert!(align_of::<HeapMem>() == HEAP_ALIGN);

/// Backing storage, placed in a dedicated `.bss` section by the linker.
#[unsafe(link_section = ".bss.heap")]
static mut HEAP: HeapMem = HeapMem([0; HEAP_SIZE]);

/// The kernel heap, serialized by a spin lock.
pub static KHEAP: SpinLock<KernelHeap> = SpinLock::new(KernelHeap::new());

/// One-time initialization flag.
static DID_INIT: AtomicBool = AtomicBool::new(false);

/// Ensure the heap manages its backing storage (idempotent).
pub fn ensure_init() {
    if !DID_INIT.load(Ordering::Acquire) {
        KHEAP.with_lock(|heap| {
            if !heap.is_initialized() {
                // Safety: the static array is exclusively the heap's, and the
                // flag protocol runs this once.
                let start = unsafe { (&raw mut HEAP.0).cast::<u8>() as usize };
                unsafe { heap.init(start, HEAP_SIZE) };
                DID_INIT.store(true, Ordering::Release);
            }
        });
    }
}

/// Allocate `size` bytes of kernel heap. Null on failure; the caller may ask
/// the memory manager for more SRAM and retry after [`kheap_extend`].
pub fn kmalloc(size: usize) -> *mut u8 {
    ensure_init();
    KHEAP.with_lock(|heap| unsafe { heap.malloc(size) })
}

/// Allocate `size` zeroed bytes of kernel heap.
pub fn kcalloc(size: usize) -> *mut u8 {
    ensure_init();
    KHEAP.with_lock(|heap| unsafe { heap.calloc(size) })
}

/// Resize the allocation at `ptr` to `size` bytes.
///
/// # Safety
/// `ptr` must be null or a live pointer from [`kmalloc`]/[`kcalloc`]/
/// [`krealloc`]. On a non-null return other than `ptr` itself, `ptr` is gone.
pub unsafe fn krealloc(size: usize, ptr: *mut u8) -> *mut u8 {
    ensure_init();
    KHEAP.with_lock(|heap| unsafe { heap.realloc(size, ptr) })
}

/// Release an allocation. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a live pointer from this heap's entry points.
pub unsafe fn kfree(ptr: *mut u8) {
    ensure_init();
    KHEAP.with_lock(|heap| unsafe { heap.free(ptr) });
}

/// Donate `[start, start + size)` — fresh SRAM from the memory manager — to
/// the kernel heap.
///
/// # Safety
/// The region must be valid, writable, word-aligned, unused, and disjoint
/// from everything already under heap management.
pub unsafe fn kheap_extend(start: usize, size: usize) {
    ensure_init();
    KHEAP.with_lock(|heap| unsafe { heap.extend(start, size) });
}
