//! Age-dependent mortality.
//!
//! The telomere maps an agent's age to the probability that it dies in the
//! current iteration:
//!
//! ```text
//! p(0)              = 0
//! p(age >= max_age) = 1
//! p(age)            = min(alpha * exp(beta * age), 1)
//! ```
//!
//! Newborns are never drawn. With `alpha, beta >= 0` the curve is
//! non-decreasing in age, and it saturates to exactly `1.0` at the
//! configured maximum age so no agent outlives it.

use rand::Rng;

/// Per-agent age to death-probability function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telomere {
    /// Scale of the exponential hazard.
    alpha: f64,
    /// Growth rate of the exponential hazard.
    beta: f64,
    /// Age at which death becomes certain.
    max_age: u32,
}

impl Telomere {
    /// Create a telomere.
    ///
    /// Negative or non-finite coefficients are treated as zero so the curve
    /// stays a valid probability.
    pub fn new(alpha: f64, beta: f64, max_age: u32) -> Self {
        Self {
            alpha: non_negative(alpha),
            beta: non_negative(beta),
            max_age,
        }
    }

    /// The age at which death becomes certain.
    pub const fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Probability of dying this iteration at the given age.
    pub fn death_probability(&self, age: u32) -> f64 {
        if age >= self.max_age {
            return 1.0;
        }
        if age == 0 {
            return 0.0;
        }
        let hazard = self.alpha * (self.beta * f64::from(age)).exp();
        if hazard.is_finite() { hazard.clamp(0.0, 1.0) } else { 1.0 }
    }

    /// Draw once against the death probability.
    ///
    /// Returns `true` when the uniform draw falls below the probability.
    pub fn sample_death(&self, age: u32, rng: &mut impl Rng) -> bool {
        let p = self.death_probability(age);
        rng.random::<f64>() < p
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
