//! Bump-pointer memory regions.
//!
//! An [`Arena`] hands out byte ranges as offset handles ([`ArenaSlice`]) rather
//! than references, so callers can hold several allocations at once and the
//! backing storage can grow without invalidating them. Scoped scratch use goes
//! through [`ScratchAllocator::temp_region`]: everything pushed inside the
//! closure is released when it returns.
//!
//! Every slice carries the generation it was pushed in. Rewinding below a
//! slice's end retires it for good, even after the same bytes are handed out
//! again.

const DEFAULT_ALIGN: usize = 4;

/// Position in an arena that can later be rewound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArenaMark(usize);

/// A byte range previously pushed onto an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSlice {
    offset: usize,
    len: usize,
    generation: u64,
}

impl ArenaSlice {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Allocation capability consumed by the resource loader.
pub trait ScratchAllocator {
    fn mark(&self) -> ArenaMark;

    /// Pushes `len` zeroed bytes. `None` when the allocation cannot be satisfied.
    fn push(&mut self, len: usize) -> Option<ArenaSlice>;

    fn bytes(&self, slice: ArenaSlice) -> Option<&[u8]>;

    fn bytes_mut(&mut self, slice: ArenaSlice) -> Option<&mut [u8]>;

    /// Releases everything pushed after `mark`.
    fn reset_to(&mut self, mark: ArenaMark);

    fn push_copy(&mut self, src: &[u8]) -> Option<ArenaSlice> {
        let slice = self.push(src.len())?;
        self.bytes_mut(slice)?.copy_from_slice(src);
        Some(slice)
    }

    /// Runs `f` and rewinds to the position held before it ran.
    fn temp_region<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mark = self.mark();
        let result = f(self);
        self.reset_to(mark);
        result
    }
}

/// A rewind that moved the top of the arena down to `to`.
#[derive(Debug, Clone, Copy)]
struct Rewind {
    generation: u64,
    to: usize,
}

/// Growable bump allocator.
#[derive(Debug)]
pub struct Arena {
    buf: Vec<u8>,
    used: usize,
    align: usize,
    high_water: usize,
    generation: u64,
    // Strictly increasing in both fields. Entry `i` is the lowest point any
    // rewind has reached since generation `rewinds[i - 1].generation`.
    rewinds: Vec<Rewind>,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_align(capacity, DEFAULT_ALIGN)
    }

    pub fn with_capacity_and_align(capacity: usize, align: usize) -> Self {
        debug_assert!(align.is_power_of_two());
        Self {
            buf: vec![0; capacity],
            used: 0,
            align,
            high_water: 0,
            generation: 0,
            rewinds: Vec::new(),
        }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Largest `used()` value observed since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn reset(&mut self) {
        self.rewind(0);
    }

    fn rewind(&mut self, to: usize) {
        if to < self.used {
            self.generation += 1;
            while self.rewinds.last().is_some_and(|r| r.to >= to) {
                self.rewinds.pop();
            }
            self.rewinds.push(Rewind {
                generation: self.generation,
                to,
            });
        }
        self.used = to.min(self.used);
    }

    fn is_live(&self, slice: ArenaSlice) -> bool {
        if slice.end() > self.used {
            return false;
        }
        let later = self
            .rewinds
            .partition_point(|r| r.generation <= slice.generation);
        self.rewinds
            .get(later)
            .map_or(true, |lowest| slice.end() <= lowest.to)
    }

    /// `None` when the doubled capacity overflows or the allocator refuses it.
    fn grow_to_fit(&mut self, required: usize) -> Option<()> {
        let mut new_capacity = self.buf.len().max(self.align);
        while new_capacity < required {
            new_capacity = new_capacity.checked_mul(2)?;
        }
        if let Err(err) = self.buf.try_reserve_exact(new_capacity - self.buf.len()) {
            log::warn!("Arena cannot grow to {} bytes: {}", new_capacity, err);
            return None;
        }
        log::debug!(
            "Arena growing from {} to {} bytes",
            self.buf.len(),
            new_capacity
        );
        self.buf.resize(new_capacity, 0);
        Some(())
    }
}

impl ScratchAllocator for Arena {
    fn mark(&self) -> ArenaMark {
        ArenaMark(self.used)
    }

    fn push(&mut self, len: usize) -> Option<ArenaSlice> {
        let offset = self.used.checked_add(self.align - 1)? & !(self.align - 1);
        let end = offset.checked_add(len)?;
        if end > self.buf.len() {
            self.grow_to_fit(end)?;
        }
        self.buf[offset..end].fill(0);
        self.used = end;
        self.high_water = self.high_water.max(end);
        Some(ArenaSlice {
            offset,
            len,
            generation: self.generation,
        })
    }

    fn bytes(&self, slice: ArenaSlice) -> Option<&[u8]> {
        if !self.is_live(slice) {
            return None;
        }
        Some(&self.buf[slice.offset..slice.end()])
    }

    fn bytes_mut(&mut self, slice: ArenaSlice) -> Option<&mut [u8]> {
        if !self.is_live(slice) {
            return None;
        }
        Some(&mut self.buf[slice.offset..slice.end()])
    }

    fn reset_to(&mut self, mark: ArenaMark) {
        debug_assert!(mark.0 <= self.used, "arena mark is ahead of the arena");
        self.rewind(mark.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_zeroed_aligned_ranges() {
        let mut arena = Arena::with_capacity(64);
        let a = arena.push(3).expect("push a");
        let b = arena.push(5).expect("push b");
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 4, "second push should start on a 4-byte boundary");
        assert!(arena.bytes(b).expect("b valid").iter().all(|&v| v == 0));
    }

    #[test]
    fn push_copy_round_trips_bytes() {
        let mut arena = Arena::with_capacity(16);
        let slice = arena.push_copy(&[1, 2, 3, 4, 5]).expect("copy");
        assert_eq!(arena.bytes(slice), Some(&[1u8, 2, 3, 4, 5][..]));
    }

    #[test]
    fn reset_to_mark_invalidates_later_slices() {
        let mut arena = Arena::with_capacity(64);
        let kept = arena.push_copy(&[9; 8]).expect("kept");
        let mark = arena.mark();
        let scratch = arena.push(16).expect("scratch");
        arena.reset_to(mark);

        assert!(arena.bytes(scratch).is_none());
        assert_eq!(arena.bytes(kept), Some(&[9u8; 8][..]));
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn temp_region_rewinds_after_closure() {
        let mut arena = Arena::with_capacity(32);
        arena.push(4).expect("prefix");
        let inner_len = arena.temp_region(|a| {
            a.push(20).expect("inner");
            a.used()
        });
        assert_eq!(inner_len, 24);
        assert_eq!(arena.used(), 4);
        assert_eq!(arena.high_water(), 24);
    }

    #[test]
    fn arena_grows_and_keeps_earlier_slices_valid() {
        let mut arena = Arena::with_capacity(8);
        let first = arena.push_copy(&[7; 8]).expect("fits");
        let second = arena.push(100).expect("grows");
        assert!(arena.capacity() >= 108);
        assert_eq!(arena.bytes(first), Some(&[7u8; 8][..]));
        assert_eq!(arena.bytes(second).map(<[u8]>::len), Some(100));
    }

    #[test]
    fn zero_capacity_arena_can_still_grow() {
        let mut arena = Arena::with_capacity(0);
        let slice = arena.push(10).expect("grows from empty");
        assert_eq!(slice.len(), 10);
    }

    #[test]
    fn stale_slice_stays_invalid_after_its_bytes_are_reused() {
        let mut arena = Arena::with_capacity(64);
        let kept = arena.push_copy(&[5; 4]).expect("kept");
        let mark = arena.mark();
        let old = arena.push_copy(&[1, 2, 3, 4]).expect("old");
        arena.reset_to(mark);
        let new = arena.push_copy(&[9, 9, 9, 9]).expect("new");

        assert_eq!(new.offset, old.offset);
        assert!(arena.bytes(old).is_none());
        assert!(arena.bytes_mut(old).is_none());
        assert_eq!(arena.bytes(new), Some(&[9u8; 4][..]));
        assert_eq!(arena.bytes(kept), Some(&[5u8; 4][..]));
    }

    #[test]
    fn nested_rewinds_only_retire_slices_above_the_lowest_point() {
        let mut arena = Arena::with_capacity(64);
        let outer_mark = arena.mark();
        let a = arena.push_copy(&[1; 4]).expect("a");
        let inner_mark = arena.mark();
        let b = arena.push_copy(&[2; 4]).expect("b");
        arena.reset_to(inner_mark);
        let c = arena.push_copy(&[3; 4]).expect("c");

        assert_eq!(arena.bytes(a), Some(&[1u8; 4][..]));
        assert!(arena.bytes(b).is_none());
        assert_eq!(arena.bytes(c), Some(&[3u8; 4][..]));

        arena.reset_to(outer_mark);
        let d = arena.push_copy(&[4; 8]).expect("d");
        assert!(arena.bytes(a).is_none());
        assert!(arena.bytes(c).is_none());
        assert_eq!(arena.bytes(d), Some(&[4u8; 8][..]));
    }

    #[test]
    fn rewinding_to_the_current_top_keeps_slices() {
        let mut arena = Arena::with_capacity(16);
        let slice = arena.push_copy(&[7; 4]).expect("push");
        let mark = arena.mark();
        arena.reset_to(mark);
        let next = arena.push(4).expect("next");
        assert_eq!(arena.bytes(slice), Some(&[7u8; 4][..]));
        assert!(arena.bytes(next).is_some());
    }

    #[test]
    fn oversized_push_fails_without_disturbing_the_arena() {
        let mut arena = Arena::with_capacity(16);
        let kept = arena.push_copy(&[3; 4]).expect("kept");

        assert!(arena.push(usize::MAX / 2 + 8).is_none());
        assert!(arena.push(isize::MAX as usize - 64).is_none());

        assert_eq!(arena.used(), 4);
        assert_eq!(arena.capacity(), 16);
        assert_eq!(arena.bytes(kept), Some(&[3u8; 4][..]));
        let next = arena.push(8).expect("arena still usable");
        assert_eq!(arena.bytes(next).map(<[u8]>::len), Some(8));
    }

    #[test]
    fn reset_clears_everything() {
        let mut arena = Arena::with_capacity(16);
        let slice = arena.push(8).expect("push");
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert!(arena.bytes(slice).is_none());
    }
}
