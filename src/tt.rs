//! Transposition table: a power-of-two bucketed map from Zobrist hash to
//! the best result a previous search reached at that position.
//!
//! Depth-preferred replacement within each bucket, as spec.md §4.4
//! describes. Mate scores are made depth-relative on store and ply-relative
//! again on probe (spec.md §4.4, §9), so a TT hit reached at a different
//! ply from root reports the correct mate distance instead of the distance
//! from whatever ply first stored it.

use std::mem;

use crate::search::MATE_SCORE;
use crate::types::Move;

const BUCKET_SIZE: usize = 4;
const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// Score is the exact minimax value within the search window.
    Exact,
    /// Fail-high: score is a lower bound; the stored move caused the cutoff.
    Lower,
    /// Fail-low: score is an upper bound.
    Upper,
}

#[derive(Clone, Copy, Debug)]
struct TTEntry {
    hash: u64,
    depth: u32,
    score: i32,
    bound: BoundType,
    best_move: Option<Move>,
}

/// Convert a mate-distance-from-root score to a depth-relative (TT-stored)
/// score, and back. Both directions are the same transform: shift the mate
/// distance by `ply`.
#[must_use]
pub fn score_to_tt(score: i32, ply: u32) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[must_use]
pub fn score_from_tt(score: i32, ply: u32) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

pub struct TranspositionTable {
    table: Vec<[Option<TTEntry>; BUCKET_SIZE]>,
    mask: usize,
    occupied: usize,
}

impl TranspositionTable {
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<[Option<TTEntry>; BUCKET_SIZE]>();
        let mut num_entries = (size_mb * 1024 * 1024) / entry_size.max(1);
        num_entries = num_entries.next_power_of_two();
        if num_entries == 0 {
            num_entries = 1024;
        }
        TranspositionTable {
            table: vec![[None; BUCKET_SIZE]; num_entries],
            mask: num_entries - 1,
            occupied: 0,
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Look up `hash`. Returns `None` both on a true miss and on a slot
    /// collision with a different hash (a hash collision is indistinguishable
    /// from a miss by construction, per spec.md §7).
    pub fn probe(&self, hash: u64, ply: u32) -> Option<(u32, i32, BoundType, Option<Move>)> {
        let bucket = &self.table[self.index(hash)];
        bucket
            .iter()
            .flatten()
            .find(|entry| entry.hash == hash)
            .map(|entry| {
                (
                    entry.depth,
                    score_from_tt(entry.score, ply),
                    entry.bound,
                    entry.best_move,
                )
            })
    }

    /// Store a result. Writes into an empty slot, replaces a matching hash
    /// (refresh), or otherwise replaces whichever slot has the lowest
    /// depth — depth-preferred replacement.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        ply: u32,
        bound: BoundType,
        best_move: Option<Move>,
    ) {
        let index = self.index(hash);
        let bucket = &mut self.table[index];
        let new_entry = TTEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
        };

        for slot in bucket.iter_mut() {
            if let Some(existing) = slot {
                if existing.hash == hash {
                    if depth >= existing.depth {
                        *slot = Some(new_entry);
                    }
                    return;
                }
            }
        }

        for slot in bucket.iter_mut() {
            if slot.is_none() {
                *slot = Some(new_entry);
                self.occupied += 1;
                return;
            }
        }

        let mut replace_idx = 0;
        let mut worst_depth = u32::MAX;
        for (idx, slot) in bucket.iter().enumerate() {
            if let Some(entry) = slot {
                if entry.depth < worst_depth {
                    worst_depth = entry.depth;
                    replace_idx = idx;
                }
            }
        }
        bucket[replace_idx] = Some(new_entry);
    }

    /// Reset all contents and occupancy counters, per `ucinewgame` and the
    /// `Clear Hash` button.
    pub fn clear(&mut self) {
        for bucket in &mut self.table {
            *bucket = [None; BUCKET_SIZE];
        }
        self.occupied = 0;
    }

    /// Resize, discarding all contents (used when the `Hash` option changes).
    pub fn resize(&mut self, size_mb: usize) {
        *self = Self::new(size_mb);
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let total_slots = self.table.len().saturating_mul(BUCKET_SIZE);
        if total_slots == 0 {
            return 0;
        }
        ((self.occupied as u64 * 1000) / total_slots as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_probe_same_hash_hits() {
        let mut tt = TranspositionTable::new(1);
        tt.store(12345, 4, 100, 0, BoundType::Exact, None);
        let (depth, score, bound, _) = tt.probe(12345, 0).unwrap();
        assert_eq!(depth, 4);
        assert_eq!(score, 100);
        assert_eq!(bound, BoundType::Exact);
    }

    #[test]
    fn probe_miss_on_collision() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 4, 100, 0, BoundType::Exact, None);
        // Index collides (same low bits via mask=0 for a 1-entry bucket
        // table would be contrived); assert a genuinely different hash
        // that still lands in-bucket reports a miss.
        let other_hash = 1u64 ^ (1 << 40);
        if tt.index(1) == tt.index(other_hash) {
            assert!(tt.probe(other_hash, 0).is_none());
        }
    }

    #[test]
    fn mate_score_relativizes_across_ply() {
        let mate_in_3_from_root = MATE_SCORE - 6;
        let stored = score_to_tt(mate_in_3_from_root, 2);
        // Stored at ply 2, closer to the mating side's perspective at the
        // node, so the TT-relative score is larger in magnitude.
        assert!(stored > mate_in_3_from_root);
        let recovered = score_from_tt(stored, 2);
        assert_eq!(recovered, mate_in_3_from_root);
    }
}
