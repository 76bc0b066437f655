//! Deterministic allocation storms against a shadow model.
//!
//! Bounded and reproducible by construction: a fixed set of seeds drives an
//! xorshift64* generator through malloc/calloc/realloc/free sequences while
//! every live payload carries a slot-specific byte pattern. The debug walk
//! runs after every step, so any structural damage is caught at the operation
//! that caused it, not at the end.

use kernel_heap::debug::check;
use kernel_heap::{HEADER_SIZE, KernelHeap};

const HEAP_BYTES: usize = 16 * 1024;
const SLOTS: usize = 24;
const STEPS: usize = 2_000;
const SEEDS: [u64; 4] = [1, 2, 3, 0xC0FFEE];
const MAX_REQ: usize = 600;

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn range(&mut self, low: usize, high_inclusive: usize) -> usize {
        low + (self.next_u64() as usize) % (high_inclusive - low + 1)
    }
}

struct Slot {
    ptr: *mut u8,
    req: usize,
    pattern: u8,
}

fn fill(slot: &Slot) {
    for i in 0..slot.req {
        unsafe { slot.ptr.add(i).write(slot.pattern) };
    }
}

fn assert_intact(slot: &Slot, upto: usize) {
    for i in 0..upto {
        let got = unsafe { slot.ptr.add(i).read() };
        assert_eq!(got, slot.pattern, "payload byte {i} clobbered");
    }
}

fn assert_conserved(heap: &KernelHeap, live: &[Option<Slot>]) {
    let report = unsafe { check(heap.engine()) }.expect("heap invariants violated");
    let allocated: usize = live
        .iter()
        .flatten()
        .map(|slot| unsafe { slot.ptr.sub(HEADER_SIZE).cast::<usize>().read() })
        .sum();
    assert_eq!(report.free_bytes + allocated, heap.total_bytes());
}

#[test]
fn random_sequences_hold_invariants() {
    for seed in SEEDS {
        let slice = Box::leak(vec![0x77_u64; HEAP_BYTES / 8].into_boxed_slice());
        let mut heap = KernelHeap::new();
        unsafe { heap.init(slice.as_mut_ptr() as usize, HEAP_BYTES) };

        let mut rng = XorShift64::new(seed);
        let mut slots: Vec<Option<Slot>> = (0..SLOTS).map(|_| None).collect();

        for step in 0..STEPS {
            let index = rng.range(0, SLOTS - 1);
            match rng.range(0, 99) {
                // allocate (biased towards keeping the heap busy)
                0..=39 => {
                    if slots[index].is_none() {
                        let req = rng.range(1, MAX_REQ);
                        let ptr = unsafe { heap.malloc(req) };
                        if !ptr.is_null() {
                            let slot = Slot {
                                ptr,
                                req,
                                pattern: ((seed as u8) ^ (index as u8)) | 1,
                            };
                            fill(&slot);
                            slots[index] = Some(slot);
                        }
                    }
                }
                // calloc: must hand back zeroed payload
                40..=49 => {
                    if slots[index].is_none() {
                        let req = rng.range(1, MAX_REQ);
                        let ptr = unsafe { heap.calloc(req) };
                        if !ptr.is_null() {
                            for i in 0..req {
                                assert_eq!(
                                    unsafe { ptr.add(i).read() },
                                    0,
                                    "seed={seed} step={step}: calloc byte {i} not zero"
                                );
                            }
                            let slot = Slot {
                                ptr,
                                req,
                                pattern: ((seed as u8) ^ (index as u8)) | 1,
                            };
                            fill(&slot);
                            slots[index] = Some(slot);
                        }
                    }
                }
                // free
                50..=74 => {
                    if let Some(slot) = slots[index].take() {
                        assert_intact(&slot, slot.req);
                        unsafe { heap.free(slot.ptr) };
                    }
                }
                // realloc, in place or moving
                _ => {
                    if let Some(mut slot) = slots[index].take() {
                        let new_req = rng.range(1, MAX_REQ);
                        let fresh = unsafe { heap.realloc(new_req, slot.ptr) };
                        if fresh.is_null() {
                            // grow refused: the old block must still be whole
                            assert!(new_req > slot.req);
                            assert_intact(&slot, slot.req);
                        } else {
                            slot.ptr = fresh;
                            assert_intact(&slot, slot.req.min(new_req));
                            slot.req = new_req;
                            fill(&slot);
                        }
                        slots[index] = Some(slot);
                    }
                }
            }
            assert_conserved(&heap, &slots);
        }

        // hand everything back: the heap must collapse to one block
        for slot in slots.iter_mut() {
            if let Some(slot) = slot.take() {
                assert_intact(&slot, slot.req);
                unsafe { heap.free(slot.ptr) };
            }
        }
        let report = unsafe { check(heap.engine()) }.expect("heap invariants violated");
        assert_eq!(report.free_blocks, 1, "seed={seed}: fragmentation left over");
        assert_eq!(report.free_bytes, HEAP_BYTES);
    }
}
