//! Size classification for the multi-level free list.

/// Number of parallel free lists.
pub const NUM_LEVELS: usize = 4;

/// One machine word, the allocation alignment unit. Block boundaries, block
/// sizes and user pointers are all multiples of this.
pub const WORD: usize = size_of::<usize>();

/// Smallest block the allocator will track or hand out: one word for the
/// size field plus one word for a level-0 forward pointer.
pub const MIN_BLOCK_SIZE: usize = 2 * WORD;

/// Byte size a free block must reach to be linked into each list. Level 0
/// holds every free block.
///
/// A class-`k` block physically stores `k + 1` forward pointers behind its
/// size word, so a threshold may never admit a block too small for that
/// footprint — linking it would write past the block's end. The nominal
/// level-1 bound of 16 only covers three header words when the word is 4
/// bytes, so it rises with the word size.
pub(crate) const LEVEL_THRESHOLDS: [usize; NUM_LEVELS] = [
    0,
    if 3 * WORD > 16 { 3 * WORD } else { 16 },
    64,
    1024,
];

const _: () = {
    // the smallest block admitted to each level must fit that level's header
    let mut level = 0;
    while level < NUM_LEVELS {
        let smallest = if LEVEL_THRESHOLDS[level] > MIN_BLOCK_SIZE {
            LEVEL_THRESHOLDS[level]
        } else {
            MIN_BLOCK_SIZE
        };
        assert!((level + 2) * WORD <= smallest);
        level += 1;
    }
};

/// The deepest list a block of `size` bytes qualifies for.
#[inline]
pub(crate) const fn level_for_size(size: usize) -> usize {
    if size >= LEVEL_THRESHOLDS[3] {
        3
    } else if size >= LEVEL_THRESHOLDS[2] {
        2
    } else if size >= LEVEL_THRESHOLDS[1] {
        1
    } else {
        0
    }
}
