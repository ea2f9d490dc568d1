//! Worldview ledger: an append-only history of 32-bit opinion words.
//!
//! Each entry is one iteration's opinion state, one bit per binary issue.
//! Two ledgers are compared only over their overlapping trailing window:
//! the last `min(len_a, len_b, window)` entries of each, paired from the
//! newest backwards. Alignment of a pair is the share of matching bits.
//!
//! Children inherit a uniform bitmask crossover of their parents' current
//! words and start a fresh ledger from it.

use rand::Rng;

/// Bits per opinion word.
const OPINION_BITS: u32 = u32::BITS;

/// Append-only opinion history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Worldview {
    history: Vec<u32>,
}

impl Worldview {
    /// An empty ledger.
    pub const fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// A ledger starting from a single opinion word.
    pub fn from_opinion(opinion: u32) -> Self {
        Self {
            history: vec![opinion],
        }
    }

    /// The most recent opinion word, if any.
    pub fn current(&self) -> Option<u32> {
        self.history.last().copied()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append an opinion word.
    pub fn record(&mut self, opinion: u32) {
        self.history.push(opinion);
    }

    /// Append the current word with each bit flipped independently with
    /// probability `flip_probability`. An empty ledger starts from a
    /// random word.
    pub fn drift(&mut self, flip_probability: f64, rng: &mut impl Rng) {
        let p = flip_probability.clamp(0.0, 1.0);
        let mut next = self.current().unwrap_or_else(|| rng.random());
        for bit in 0..OPINION_BITS {
            if rng.random_bool(p) {
                next ^= 1 << bit;
            }
        }
        self.record(next);
    }

    /// Mean bit alignment with another ledger over the trailing window.
    ///
    /// Returns `0.0` when the overlap is empty (including a zero window).
    pub fn alignment(&self, other: &Self, window: usize) -> f64 {
        let overlap = self.len().min(other.len()).min(window);
        if overlap == 0 {
            return 0.0;
        }
        let matching: u32 = self
            .history
            .iter()
            .rev()
            .zip(other.history.iter().rev())
            .take(overlap)
            .map(|(a, b)| (!(a ^ b)).count_ones())
            .sum();
        let compared = u32::try_from(overlap)
            .unwrap_or(u32::MAX)
            .saturating_mul(OPINION_BITS);
        f64::from(matching) / f64::from(compared)
    }
}

/// Uniform bitmask crossover of two opinion words.
///
/// Each bit of the child comes from `a` where the mask is set and from `b`
/// elsewhere.
pub fn crossover(a: u32, b: u32, rng: &mut impl Rng) -> u32 {
    let mask: u32 = rng.random();
    (a & mask) | (b & !mask)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn empty_ledgers_align_to_zero() {
        let a = Worldview::new();
        let b = Worldview::new();
        assert!(a.alignment(&b, 5).abs() < f64::EPSILON);
    }

    #[test]
    fn one_empty_ledger_aligns_to_zero() {
        let a = Worldview::from_opinion(u32::MAX);
        let b = Worldview::new();
        assert!(a.alignment(&b, 5).abs() < f64::EPSILON);
        assert!(b.alignment(&a, 5).abs() < f64::EPSILON);
    }

    #[test]
    fn identical_ledgers_align_fully() {
        let a = Worldview::from_opinion(0xDEAD_BEEF);
        let b = a.clone();
        assert!((a.alignment(&b, 3) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn complementary_words_do_not_align() {
        let a = Worldview::from_opinion(0);
        let b = Worldview::from_opinion(u32::MAX);
        assert!(a.alignment(&b, 3).abs() < f64::EPSILON);
    }

    #[test]
    fn only_trailing_window_is_compared() {
        let mut a = Worldview::from_opinion(0);
        let mut b = Worldview::from_opinion(u32::MAX);
        // Newest entries agree; the disagreeing first entry falls outside a
        // window of one.
        a.record(7);
        b.record(7);
        assert!((a.alignment(&b, 1) - 1.0).abs() < f64::EPSILON);
        assert!((a.alignment(&b, 2) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn overlap_is_limited_by_shorter_ledger() {
        let mut a = Worldview::from_opinion(0);
        a.record(0);
        a.record(u32::MAX);
        let b = Worldview::from_opinion(u32::MAX);
        // Only the newest of `a` is paired with `b`.
        assert!((a.alignment(&b, 10) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn drift_appends_one_entry() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut w = Worldview::from_opinion(0b1010);
        w.drift(0.0, &mut rng);
        assert_eq!(w.len(), 2);
        assert_eq!(w.current(), Some(0b1010));
        w.drift(1.0, &mut rng);
        assert_eq!(w.current(), Some(!0b1010));
    }

    #[test]
    fn crossover_keeps_shared_bits() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..32 {
            let child = crossover(0xF0F0_0000, 0xF0F0_FFFF, &mut rng);
            assert_eq!(child & 0xFFFF_0000, 0xF0F0_0000);
        }
        assert_eq!(crossover(5, 5, &mut rng), 5);
    }
}
