//! Position-to-node lookup: a chained hash table over the arena.
//!
//! Buckets hold `(hash2, index)` pairs. `hash2` folds the whole position
//! into 32 bits and is compared first; only on a match is the position
//! confirmed against the arena node, which may touch cold memory. The table
//! never owns nodes — rehashing just re-files index entries.

use crate::node::{NodeArena, NodeIdx};
use crate::{OutOfMemory, Pos, PosType};

/// Entries per bucket before the bucket count doubles. Roughly one cache
/// line worth of `HashLoc`.
const LOAD_FACTOR: usize = 8;
/// Initial bucket count. Must be a power of two greater than 1.
const INITIAL_BUCKETS: usize = 16;

#[derive(Clone, Copy)]
struct HashLoc {
    hash2: u32,
    idx: NodeIdx,
}

/// Bucket selector. Only the low bits are used, so they must mix well.
#[inline(always)]
fn hash1(x: PosType, y: PosType) -> u32 {
    x ^ y
}

/// Early-out filter. Uses all bits and loses as little as possible.
#[inline(always)]
fn hash2(x: PosType, y: PosType) -> u32 {
    (y << 16) ^ x
}

pub(crate) struct NodeMap {
    buckets: Vec<Vec<HashLoc>>,
}

impl NodeMap {
    pub fn new() -> Self {
        NodeMap { buckets: Vec::new() }
    }

    /// Empties every bucket but keeps the bucket array and its allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Returns all allocations to the system.
    pub fn release(&mut self) {
        self.buckets = Vec::new();
    }

    /// Finds the node for `pos`, allocating a fresh one in `arena` when
    /// there is none yet.
    pub fn lookup_or_create(
        &mut self,
        arena: &mut NodeArena,
        pos: Pos,
    ) -> Result<NodeIdx, OutOfMemory> {
        let h = hash1(pos.x, pos.y) as usize;
        let h2 = hash2(pos.x, pos.y);
        if !self.buckets.is_empty() {
            let bucket = &self.buckets[h & (self.buckets.len() - 1)];
            for loc in bucket {
                if loc.hash2 == h2 && arena.get(loc.idx).pos == pos {
                    return Ok(loc.idx);
                }
            }
        }

        self.enlarge(arena)?;

        let idx = arena.alloc(pos)?;
        let mask = self.buckets.len() - 1;
        try_push(&mut self.buckets[h & mask], HashLoc { hash2: h2, idx })?;
        Ok(idx)
    }

    /// Doubles the bucket count once the arena outgrows the load factor and
    /// re-files every node. Failure to grow the bucket array itself is
    /// tolerated — the old buckets keep working, just with longer chains.
    /// Failure partway through re-filing is an error; the caller aborts the
    /// search and the next `clear` restores consistency.
    fn enlarge(&mut self, arena: &NodeArena) -> Result<(), OutOfMemory> {
        let oldsz = self.buckets.len();
        if arena.len() < oldsz * LOAD_FACTOR {
            return Ok(());
        }

        let newsz = if oldsz == 0 { INITIAL_BUCKETS } else { oldsz * 2 };
        if self.buckets.try_reserve_exact(newsz - oldsz).is_err() {
            // Without at least the initial buckets there is nowhere to file
            // the entry at all.
            return if oldsz == 0 { Err(OutOfMemory) } else { Ok(()) };
        }
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.buckets.resize_with(newsz, Vec::new);

        let mask = newsz - 1;
        for idx in 0..arena.len() as NodeIdx {
            let pos = arena.get(idx).pos;
            let loc = HashLoc {
                hash2: hash2(pos.x, pos.y),
                idx,
            };
            try_push(&mut self.buckets[hash1(pos.x, pos.y) as usize & mask], loc)?;
        }
        Ok(())
    }

    pub fn mem_size(&self) -> usize {
        let entries: usize = self
            .buckets
            .iter()
            .map(|b| b.capacity() * std::mem::size_of::<HashLoc>())
            .sum();
        self.buckets.capacity() * std::mem::size_of::<Vec<HashLoc>>() + entries
    }
}

fn try_push(bucket: &mut Vec<HashLoc>, loc: HashLoc) -> Result<(), OutOfMemory> {
    if bucket.len() == bucket.capacity() {
        bucket.try_reserve(1)?;
    }
    bucket.push(loc);
    Ok(())
}
