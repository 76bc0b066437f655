//! # SRAM Layout
//!
//! The target carries a single 128 KiB bank of static RAM. The linker places
//! the kernel image (text/data/bss) at the front of the bank; everything
//! behind it belongs to the heap. The image budget below caps how much the
//! linker may use, so the heap size is a compile-time constant.

/// Total size of on-chip static RAM.
pub const SRAM_SIZE: usize = 128 * 1024;

/// Upper bound on the kernel image footprint in SRAM.
///
/// # Kernel Build
/// The linker script asserts the image fits this budget; growing the image
/// means growing this constant (and shrinking the heap with it).
pub const KERNEL_IMAGE_RESERVED: usize = 32 * 1024;

/// Bytes of SRAM handed to the kernel heap allocator.
pub const HEAP_SIZE: usize = SRAM_SIZE - KERNEL_IMAGE_RESERVED;

/// Alignment of the heap region. Covers the allocator's header words and the
/// strictest primitive types the kernel stores in heap memory.
pub const HEAP_ALIGN: usize = 16;

const _: () = {
    assert!(KERNEL_IMAGE_RESERVED < SRAM_SIZE);
    assert!(HEAP_SIZE.is_multiple_of(HEAP_ALIGN));
    assert!(HEAP_SIZE >= 4096);
};
