//! Age-Counter LRU Replacement Policy.
//!
//! Each way carries an age: 0 for the most recently used line, larger for older ones.
//! Touching a way ages every way of its set by one and resets the touched way to 0,
//! which keeps the ages of the valid lines in a set pairwise distinct. Ages start at
//! the way index, so a set that has never been touched evicts its highest way first.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(W) where W is the number of ways (associativity)
//!   - `get_victim()`: O(W)
//! - **Space Complexity:** O(S × W) where S is the number of sets

use super::ReplacementPolicy;

/// Age-counter LRU state.
#[derive(Clone, Debug)]
pub struct AgeLruPolicy {
    /// Flat `sets * ways` age table, row-major by set.
    ages: Vec<u32>,
    ways: usize,
}

impl AgeLruPolicy {
    /// Creates a new policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        let mut policy = Self {
            ages: vec![0; sets * ways],
            ways,
        };
        policy.reset();
        policy
    }

    fn set_ages(&self, set: usize) -> &[u32] {
        let base = set * self.ways;
        &self.ages[base..base + self.ways]
    }

    /// Current age of `way` in `set`.
    pub fn age(&self, set: usize, way: usize) -> u32 {
        self.set_ages(set)[way]
    }
}

impl ReplacementPolicy for AgeLruPolicy {
    /// Ages every way of the set and makes `way` the youngest.
    ///
    /// Ages of invalid ways are never consulted (an invalid way is always filled before
    /// any victim is requested, and a fill resets its age), so they are aged along with
    /// the rest.
    fn update(&mut self, set: usize, way: usize) {
        let base = set * self.ways;
        let ages = &mut self.ages[base..base + self.ways];
        for age in ages.iter_mut() {
            *age = age.saturating_add(1);
        }
        ages[way] = 0;
    }

    /// Returns the oldest way; equal ages resolve to the highest way index.
    fn get_victim(&self, set: usize) -> usize {
        let mut victim = 0;
        let mut max_age = 0;
        for (way, &age) in self.set_ages(set).iter().enumerate() {
            if age >= max_age {
                max_age = age;
                victim = way;
            }
        }
        victim
    }

    fn recency_order(&self, set: usize) -> Vec<usize> {
        let ages = self.set_ages(set);
        let mut order: Vec<usize> = (0..self.ways).collect();
        order.sort_by_key(|&way| ages[way]);
        order
    }

    fn reset(&mut self) {
        for (i, age) in self.ages.iter_mut().enumerate() {
            *age = (i % self.ways) as u32;
        }
    }
}
