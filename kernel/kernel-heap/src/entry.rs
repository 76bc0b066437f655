//! Header stored at the beginning of every **free** block.

use core::ptr::null_mut;

use crate::level::{NUM_LEVELS, level_for_size};

/// A free block in memory has the following layout:
///
/// ```text
/// +--------+-----------+------------------------------------+
/// | size   | next[0..=k] |     unused remainder of block    |
/// +--------+-----------+------------------------------------+
/// ^ block base          ^ base + (2 + k) words
/// ```
///
/// - `size` is the total block size in bytes, header included.
/// - `next[i]` links to the next free block of the level-`i` list; the lists
///   are kept **sorted by address** so neighbors can be found and coalesced.
/// - `k` is the block's classification. The forward-pointer array physically
///   present in the block has length `k + 1`, so a minimum-size block carries
///   `next[0]` only. The declaration below spans all levels purely to give
///   the lanes fixed offsets; lanes above a block's level do not belong to
///   the header and must never be read or written.
///
/// Because small blocks are shorter than this struct, no reference to a
/// `FreeEntry` is ever created: all access goes through raw-pointer place
/// projections, which only touch the named field.
#[repr(C)]
pub(crate) struct FreeEntry {
    /// Total block size in bytes, including this header.
    pub size: usize,
    /// Forward pointers, one per list the block belongs to (or null).
    pub next: [*mut FreeEntry; NUM_LEVELS],
}

/// Deepest list `entry` belongs to.
///
/// # Safety
/// `entry` must point at an initialized free-block header.
#[inline]
pub(crate) unsafe fn entry_level(entry: *const FreeEntry) -> usize {
    level_for_size(unsafe { (*entry).size })
}

/// A free-block header copied out of the heap.
///
/// Splits and relocations overwrite header bytes that still need to be read
/// while the lists are re-threaded; the snapshot decouples the two.
#[derive(Clone, Copy)]
pub(crate) struct EntrySnapshot {
    pub size: usize,
    pub next: [*mut FreeEntry; NUM_LEVELS],
}

impl EntrySnapshot {
    /// # Safety
    /// `entry` must point at an initialized free-block header.
    pub(crate) unsafe fn capture(entry: *const FreeEntry) -> Self {
        let size = unsafe { (*entry).size };
        let mut next = [null_mut(); NUM_LEVELS];
        let mut level = 0;
        while level <= level_for_size(size) {
            next[level] = unsafe { (*entry).next[level] };
            level += 1;
        }
        Self { size, next }
    }

    #[inline]
    pub(crate) fn level(&self) -> usize {
        level_for_size(self.size)
    }
}
