//! Deterministic value queues for randomized outcomes
//!
//! Tests seed dice values per category; the fabricator consumes them in FIFO
//! order and falls back to uniform random draws once a queue is empty.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::DiceEmoji;
use crate::utils::errors::Result;
use crate::utils::logging::log_override_queued;

/// Per-category override queues plus the RNG used when they run dry
#[derive(Debug)]
pub struct DiceOverrides {
    queues: HashMap<DiceEmoji, VecDeque<u8>>,
    rng: StdRng,
}

impl DiceOverrides {
    /// Create empty queues; `seed` makes fallback draws reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            queues: HashMap::new(),
            rng,
        }
    }

    /// Queue `value` for the next roll of `category`
    ///
    /// Out-of-range values are rejected and leave the queue untouched.
    pub fn push(&mut self, category: DiceEmoji, value: u8) -> Result<()> {
        let value = category.validate(value)?;
        let queue = self.queues.entry(category).or_default();
        queue.push_back(value);
        log_override_queued(category, value, queue.len());
        Ok(())
    }

    /// Pop the queued value for `category`, or draw one uniformly in range
    pub fn pop_or_random(&mut self, category: DiceEmoji) -> u8 {
        match self.queues.get_mut(&category).and_then(VecDeque::pop_front) {
            Some(value) => value,
            None => self.rng.gen_range(category.range()),
        }
    }

    /// Number of queued values for `category`
    pub fn pending(&self, category: DiceEmoji) -> usize {
        self.queues.get(&category).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.queues.clear();
    }
}

impl Default for DiceOverrides {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::utils::errors::TestkitError;

    #[test]
    fn test_fifo_then_random() {
        let mut overrides = DiceOverrides::new(Some(7));
        overrides.push(DiceEmoji::Dice, 3).unwrap();
        overrides.push(DiceEmoji::Dice, 1).unwrap();
        overrides.push(DiceEmoji::Dice, 6).unwrap();

        assert_eq!(overrides.pop_or_random(DiceEmoji::Dice), 3);
        assert_eq!(overrides.pop_or_random(DiceEmoji::Dice), 1);
        assert_eq!(overrides.pop_or_random(DiceEmoji::Dice), 6);
        assert_eq!(overrides.pending(DiceEmoji::Dice), 0);

        for _ in 0..50 {
            assert!(DiceEmoji::Dice.range().contains(&overrides.pop_or_random(DiceEmoji::Dice)));
        }
    }

    #[test]
    fn test_queues_are_independent() {
        let mut overrides = DiceOverrides::new(None);
        overrides.push(DiceEmoji::SlotMachine, 64).unwrap();
        overrides.push(DiceEmoji::Basketball, 2).unwrap();

        assert_eq!(overrides.pending(DiceEmoji::Dice), 0);
        assert_eq!(overrides.pop_or_random(DiceEmoji::Basketball), 2);
        assert_eq!(overrides.pending(DiceEmoji::SlotMachine), 1);
        assert_eq!(overrides.pop_or_random(DiceEmoji::SlotMachine), 64);
    }

    #[test]
    fn test_invalid_push_leaves_queue_unchanged() {
        let mut overrides = DiceOverrides::new(None);
        overrides.push(DiceEmoji::Dice, 2).unwrap();

        assert_matches!(
            overrides.push(DiceEmoji::Dice, 99),
            Err(TestkitError::InvalidOverrideValue { category: DiceEmoji::Dice, value: 99, min: 1, max: 6 })
        );
        assert_eq!(overrides.pending(DiceEmoji::Dice), 1);
        assert_eq!(overrides.pop_or_random(DiceEmoji::Dice), 2);
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = DiceOverrides::new(Some(42));
        let mut b = DiceOverrides::new(Some(42));
        let left: Vec<_> = (0..20).map(|_| a.pop_or_random(DiceEmoji::SlotMachine)).collect();
        let right: Vec<_> = (0..20).map(|_| b.pop_or_random(DiceEmoji::SlotMachine)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_clear_drops_pending_values() {
        let mut overrides = DiceOverrides::new(None);
        overrides.push(DiceEmoji::Darts, 6).unwrap();
        overrides.clear();
        assert_eq!(overrides.pending(DiceEmoji::Darts), 0);
    }
}
