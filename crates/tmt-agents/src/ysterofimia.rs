//! Ysterofimia: posthumous-esteem bookkeeping.
//!
//! Every time a network peer dies, the survivor records the esteem it held
//! for that peer in one of two buckets: peers who sacrificed themselves, and
//! peers who died any other way (naturally or by force). The ratio used by
//! the decision model compares the mean esteem-per-death of the two buckets.

/// Count and esteem sum for one death-attribution bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EsteemBucket {
    /// Number of peer deaths recorded.
    pub count: u32,
    /// Sum of the esteem held for those peers at death.
    pub esteem_sum: f64,
}

impl EsteemBucket {
    fn record(&mut self, esteem: f64) {
        self.count = self.count.saturating_add(1);
        self.esteem_sum += esteem.clamp(0.0, 1.0);
    }

    /// Mean esteem per recorded death (`0.0` when empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.esteem_sum / f64::from(self.count)
    }
}

/// Per-agent posthumous-esteem ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ysterofimia {
    self_sacrifice: EsteemBucket,
    other_elimination: EsteemBucket,
}

impl Ysterofimia {
    /// An empty ledger.
    pub const fn new() -> Self {
        Self {
            self_sacrifice: EsteemBucket {
                count: 0,
                esteem_sum: 0.0,
            },
            other_elimination: EsteemBucket {
                count: 0,
                esteem_sum: 0.0,
            },
        }
    }

    /// Record the death of a peer held at `esteem`.
    pub fn record_death(&mut self, voluntary: bool, esteem: f64) {
        if voluntary {
            self.self_sacrifice.record(esteem);
        } else {
            self.other_elimination.record(esteem);
        }
    }

    /// The self-sacrifice bucket.
    pub const fn self_sacrifice(&self) -> EsteemBucket {
        self.self_sacrifice
    }

    /// The natural-or-forced bucket.
    pub const fn other_elimination(&self) -> EsteemBucket {
        self.other_elimination
    }

    /// Total deaths observed across both buckets.
    pub const fn observed_deaths(&self) -> u32 {
        self.self_sacrifice
            .count
            .saturating_add(self.other_elimination.count)
    }

    /// Share of the dominant bucket by mean esteem-per-death.
    ///
    /// `max(m_v, m_o) / (m_v + m_o)`; `0.0` if no deaths were observed or
    /// every recorded esteem was zero.
    pub fn ratio(&self) -> f64 {
        let voluntary = self.self_sacrifice.mean();
        let other = self.other_elimination.mean();
        let total = voluntary + other;
        if self.observed_deaths() == 0 || total <= 0.0 {
            return 0.0;
        }
        voluntary.max(other) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_deaths_is_zero() {
        assert!(Ysterofimia::new().ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn single_bucket_dominates_fully() {
        let mut y = Ysterofimia::new();
        y.record_death(true, 0.8);
        y.record_death(true, 0.4);
        assert_eq!(y.self_sacrifice().count, 2);
        assert!((y.self_sacrifice().mean() - 0.6).abs() < 1e-12);
        assert!((y.ratio() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ratio_uses_mean_esteem_per_death() {
        let mut y = Ysterofimia::new();
        y.record_death(true, 0.9);
        y.record_death(false, 0.3);
        y.record_death(false, 0.3);
        // m_v = 0.9, m_o = 0.3 -> 0.9 / 1.2
        assert!((y.ratio() - 0.75).abs() < 1e-12);
        assert_eq!(y.observed_deaths(), 3);
    }

    #[test]
    fn zero_esteem_deaths_are_neutral() {
        let mut y = Ysterofimia::new();
        y.record_death(false, 0.0);
        assert!(y.ratio().abs() < f64::EPSILON);
    }
}
