//! Heap structure validation.
//!
//! Walks every free list and checks the structural invariants the engine
//! promises between calls. Linear in the number of free blocks — meant for
//! bring-up, assertions after suspicious operations, and the test suite, not
//! for hot paths.

use core::fmt;

use log::{debug, error};

use crate::free_list::SkipListAllocator;
use crate::level::{MIN_BLOCK_SIZE, NUM_LEVELS, WORD, level_for_size};

/// Summary of a consistent heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapReport {
    /// Free blocks on the level-0 list.
    pub free_blocks: usize,
    /// Sum of their sizes.
    pub free_bytes: usize,
    /// Largest single free block (0 when the heap is exhausted).
    pub largest_free: usize,
    /// Blocks linked into each list.
    pub blocks_per_level: [usize; NUM_LEVELS],
}

/// First structural violation found, with enough context to locate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckError {
    /// A linked block lies outside the managed region.
    OutOfBounds { level: usize, addr: usize },
    /// A linked block is not word-aligned.
    Unaligned { level: usize, addr: usize },
    /// A block's size field is sub-minimum or not a word multiple.
    BadSize { addr: usize, size: usize },
    /// A list revisits or goes below an address (also trips on cycles).
    OutOfOrder { level: usize, addr: usize },
    /// An upper list skips a block whose size qualifies it.
    MissingFromList { level: usize, addr: usize },
    /// An upper list holds a block the level-0 list does not know there, or
    /// one below the level's size threshold.
    StrayInList { level: usize, addr: usize },
    /// Two free blocks touch without having been coalesced.
    AdjacentBlocks { first: usize, second: usize },
    /// Walked free bytes disagree with the engine's counter.
    AccountingDrift { walked: usize, recorded: usize },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OutOfBounds { level, addr } => {
                write!(f, "level {level}: block {addr:#x} outside the heap")
            }
            Self::Unaligned { level, addr } => {
                write!(f, "level {level}: block {addr:#x} not word-aligned")
            }
            Self::BadSize { addr, size } => {
                write!(f, "block {addr:#x}: invalid size {size}")
            }
            Self::OutOfOrder { level, addr } => {
                write!(f, "level {level}: block {addr:#x} breaks address order")
            }
            Self::MissingFromList { level, addr } => {
                write!(f, "level {level}: qualifying block {addr:#x} is not linked")
            }
            Self::StrayInList { level, addr } => {
                write!(f, "level {level}: block {addr:#x} does not belong there")
            }
            Self::AdjacentBlocks { first, second } => {
                write!(f, "free blocks {first:#x} and {second:#x} touch uncoalesced")
            }
            Self::AccountingDrift { walked, recorded } => {
                write!(f, "free bytes drifted: walked {walked}, recorded {recorded}")
            }
        }
    }
}

/// Validate every free-list invariant and tally the free blocks.
///
/// # Safety
/// The engine must be initialized, its region valid, and no other party may
/// mutate the heap during the walk.
pub unsafe fn check(list: &SkipListAllocator) -> Result<HeapReport, CheckError> {
    let mut report = HeapReport {
        free_blocks: 0,
        free_bytes: 0,
        largest_free: 0,
        blocks_per_level: [0; NUM_LEVELS],
    };

    // Level 0 holds every free block: bounds, alignment, sizing, strict
    // address order, and the no-adjacent-neighbors rule all check here.
    let mut last: Option<(usize, usize)> = None;
    let mut cursor = list.heads[0];
    while !cursor.is_null() {
        let addr = cursor as usize;
        if addr < list.region_start || addr >= list.region_end {
            return Err(CheckError::OutOfBounds { level: 0, addr });
        }
        if !addr.is_multiple_of(WORD) {
            return Err(CheckError::Unaligned { level: 0, addr });
        }
        let size = unsafe { (*cursor).size };
        if size < MIN_BLOCK_SIZE || !size.is_multiple_of(WORD) || addr + size > list.region_end {
            return Err(CheckError::BadSize { addr, size });
        }
        if let Some((prev_addr, prev_size)) = last {
            if addr <= prev_addr {
                return Err(CheckError::OutOfOrder { level: 0, addr });
            }
            if prev_addr + prev_size == addr {
                return Err(CheckError::AdjacentBlocks {
                    first: prev_addr,
                    second: addr,
                });
            }
        }
        report.free_blocks += 1;
        report.free_bytes += size;
        report.largest_free = report.largest_free.max(size);
        last = Some((addr, size));
        cursor = unsafe { (*cursor).next[0] };
    }
    report.blocks_per_level[0] = report.free_blocks;

    if report.free_bytes != list.free_bytes {
        return Err(CheckError::AccountingDrift {
            walked: report.free_bytes,
            recorded: list.free_bytes,
        });
    }

    // Each upper list must be exactly the qualifying subsequence of level 0;
    // walking both in lockstep checks membership, order and the heads at
    // once.
    for level in 1..NUM_LEVELS {
        let mut cursor = list.heads[level];
        let mut scan = list.heads[0];
        let mut count = 0;
        while !scan.is_null() {
            if level_for_size(unsafe { (*scan).size }) >= level {
                if cursor != scan {
                    return Err(CheckError::MissingFromList {
                        level,
                        addr: scan as usize,
                    });
                }
                count += 1;
                cursor = unsafe { (*cursor).next[level] };
            }
            scan = unsafe { (*scan).next[0] };
        }
        if !cursor.is_null() {
            return Err(CheckError::StrayInList {
                level,
                addr: cursor as usize,
            });
        }
        report.blocks_per_level[level] = count;
    }

    Ok(report)
}

/// Run [`check`] and log the outcome. Returns whether the heap held up.
///
/// # Safety
/// As [`check`].
pub unsafe fn verify_logged(list: &SkipListAllocator) -> bool {
    match unsafe { check(list) } {
        Ok(report) => {
            debug!(
                "heap check: {} free blocks, {} bytes, largest {}",
                report.free_blocks, report.free_bytes, report.largest_free
            );
            true
        }
        Err(err) => {
            error!("heap check failed: {err}");
            false
        }
    }
}
