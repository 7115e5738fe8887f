//! Partition enumeration
//!
//! A partition assigns `⌈N/2⌉` of `N` candidates to side one; the rest form
//! side two. Partitions are bitmasks over candidate indices, so `N` is capped
//! at 63. Enumeration walks index subsets in lexicographic order, which makes
//! "first encountered" a stable tie-break across calls.

use crate::types::Side;
use crate::utils::binomial;

/// Side-one membership over candidate indices `0..size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    mask: u64,
    size: usize,
}

fn bits(mut mask: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let index = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(index)
    })
}

fn full_mask(size: usize) -> u64 {
    if size >= 64 {
        u64::MAX
    } else {
        (1u64 << size) - 1
    }
}

impl Partition {
    /// Build a partition from side-one indices
    pub fn from_indices(side_one: &[usize], size: usize) -> Self {
        let mask = side_one
            .iter()
            .filter(|&&i| i < size)
            .fold(0u64, |mask, &i| mask | (1u64 << i));
        Self { mask, size }
    }

    /// Bitmask of side one
    pub fn side_one_mask(&self) -> u64 {
        self.mask
    }

    /// Bitmask of side two
    pub fn side_two_mask(&self) -> u64 {
        full_mask(self.size) & !self.mask
    }

    /// Number of candidates covered
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn side_of(&self, index: usize) -> Side {
        if self.mask & (1u64 << index) != 0 {
            Side::One
        } else {
            Side::Two
        }
    }

    /// Candidate indices on side one, ascending
    pub fn side_one(&self) -> impl Iterator<Item = usize> {
        bits(self.side_one_mask())
    }

    /// Candidate indices on side two, ascending
    pub fn side_two(&self) -> impl Iterator<Item = usize> {
        bits(self.side_two_mask())
    }

    /// Candidate indices on the given side
    pub fn members(&self, side: Side) -> impl Iterator<Item = usize> {
        match side {
            Side::One => bits(self.side_one_mask()),
            Side::Two => bits(self.side_two_mask()),
        }
    }
}

/// Enumerates every way to put `⌈N/2⌉` of `N` candidates on side one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamPartitionEnumerator {
    size: usize,
    side_one_size: usize,
}

impl TeamPartitionEnumerator {
    /// Enumerator over `size` candidates, which must already be in canonical order
    pub fn new(size: usize) -> Self {
        Self {
            size,
            side_one_size: size.div_ceil(2),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn side_one_size(&self) -> usize {
        self.side_one_size
    }

    /// C(N, ⌈N/2⌉)
    pub fn partition_count(&self) -> u64 {
        binomial(self.size, self.side_one_size)
    }

    /// A fresh pass over all partitions; every call yields the same order
    pub fn enumerate(&self) -> PartitionIter {
        PartitionIter {
            indices: (0..self.side_one_size).collect(),
            size: self.size,
            done: self.size >= 64,
        }
    }
}

/// Lexicographic walk over `k`-subsets of `0..size`
#[derive(Debug, Clone)]
pub struct PartitionIter {
    indices: Vec<usize>,
    size: usize,
    done: bool,
}

impl PartitionIter {
    fn advance(&mut self) {
        let k = self.indices.len();
        // Rightmost index that can still move right
        let pivot = (0..k)
            .rev()
            .find(|&i| self.indices[i] < self.size - k + i);
        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
    }
}

impl Iterator for PartitionIter {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.done {
            return None;
        }
        let partition = Partition::from_indices(&self.indices, self.size);
        self.advance();
        Some(partition)
    }
}
