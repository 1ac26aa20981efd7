//! Deterministic random number generation and weighted sampling
//!
//! Uses a simple xorshift64 algorithm for reproducibility across platforms.
//! The same seed produces the same map and the same loot on every machine.

use serde::{Deserialize, Serialize};

/// A deterministic random number generator
///
/// Uses xorshift64 for simplicity and reproducibility.
/// Never use thread-local or OS randomness in map or combat logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure non-zero state (xorshift requires this)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Derive an independent generator, advancing this one
    pub fn fork(&mut self) -> GameRng {
        GameRng::new(self.next_u64() ^ 0x9E37_79B9_7F4A_7C15)
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64 algorithm
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // top 53 bits give an exactly representable value strictly below 1.0
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random i64 in range [min, max]
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let range = (max - min + 1) as u64;
        let value = self.next_u64() % range;
        min + value as i64
    }

    /// Generate a random bool with given probability of true
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick a random element from a slice
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let i = (self.next_u64() % slice.len() as u64) as usize;
            Some(&slice[i])
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// A cumulative-weight sampler over a fixed set of entries
///
/// Probability of entry `i` is `weight_i / total`. Zero-weight entries are
/// kept for inspection but can never be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<T> {
    entries: Vec<T>,
    cumulative: Vec<u64>,
}

impl<T> WeightedTable<T> {
    /// Build a table from `(entry, weight)` pairs
    pub fn new(pairs: impl IntoIterator<Item = (T, u32)>) -> Self {
        let mut entries = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0u64;
        for (entry, weight) in pairs {
            total += u64::from(weight);
            entries.push(entry);
            cumulative.push(total);
        }
        Self {
            entries,
            cumulative,
        }
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Draw one entry; `None` if the table has no positive weight
    pub fn sample(&self, rng: &mut GameRng) -> Option<&T> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let roll = rng.next_u64() % total;
        let index = self.cumulative.partition_point(|&c| c <= roll);
        self.entries.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_range() {
        let mut rng = GameRng::new(42);

        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }

        for _ in 0..100 {
            let i = rng.range_i64(10, 20);
            assert!((10..=20).contains(&i));
        }

        assert_eq!(rng.range_i64(3, 3), 3);
    }

    #[test]
    fn test_weighted_table_distribution() {
        let mut rng = GameRng::new(42);
        let table = WeightedTable::new([("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(table.total_weight(), 6);

        let mut counts = [0; 3];
        for _ in 0..6000 {
            match table.sample(&mut rng) {
                Some(&"a") => counts[0] += 1,
                Some(&"b") => counts[1] += 1,
                Some(&"c") => counts[2] += 1,
                _ => unreachable!(),
            }
        }

        // Rough check that weighting works (c should have ~3x a)
        assert!(counts[2] > counts[0] * 2);
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn test_weighted_table_skips_zero_weights() {
        let mut rng = GameRng::new(7);
        let table = WeightedTable::new([("never", 0), ("always", 5), ("nope", 0)]);
        for _ in 0..200 {
            assert_eq!(table.sample(&mut rng), Some(&"always"));
        }
    }

    #[test]
    fn test_weighted_table_empty() {
        let mut rng = GameRng::new(7);
        let table: WeightedTable<u8> = WeightedTable::new([]);
        assert!(table.sample(&mut rng).is_none());
        let zero = WeightedTable::new([(1u8, 0)]);
        assert!(zero.sample(&mut rng).is_none());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let table = WeightedTable::new([(1, 10), (2, 20), (3, 30)]);
        let mut rng1 = GameRng::new(99);
        let mut rng2 = GameRng::new(99);
        let a: Vec<_> = (0..50).map(|_| *table.sample(&mut rng1).unwrap()).collect();
        let b: Vec<_> = (0..50).map(|_| *table.sample(&mut rng2).unwrap()).collect();
        assert_eq!(a, b);
    }
}
