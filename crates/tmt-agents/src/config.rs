//! Tunable parameters for the self-sacrifice decision model.
//!
//! These values correspond to the `decision` and `worldview` keys of
//! `tmt-config.yaml`. The engine builds a [`DecisionConfig`] from the
//! validated simulation configuration at startup and passes it into
//! [`crate::decision::adjudicate`]; tests construct it directly.

/// Sub-factor weights of the three ASP scores.
///
/// Within each score the weights are expected to sum to one. The
/// configuration loader enforces this; the decision model does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspWeights {
    /// Mortality Salience: clipped cluster-elimination exposure (w1).
    pub cluster_exposure: f64,
    /// Mortality Salience: clipped network-elimination exposure (w2).
    pub network_exposure: f64,
    /// Mortality Salience: relative-age rank within the network (w3).
    pub relative_age: f64,
    /// Mortality Salience: memorial proximity (w4).
    pub memorial_proximity: f64,
    /// Worldview Validation: alignment with cluster-mates (w5).
    pub cluster_alignment: f64,
    /// Worldview Validation: alignment with network peers (w6).
    pub network_alignment: f64,
    /// Worldview Validation: ysterofimia ratio (w7).
    pub ysterofimia: f64,
    /// Relationship Validation: estrangement (w8).
    pub estrangement: f64,
    /// Relationship Validation: mean esteem across ties (w9).
    pub mean_esteem: f64,
    /// Relationship Validation: heroism rank among peers (w10).
    pub heroism_rank: f64,
}

impl AspWeights {
    /// Sum of the Mortality Salience weights.
    pub fn mortality_salience_total(&self) -> f64 {
        self.cluster_exposure + self.network_exposure + self.relative_age + self.memorial_proximity
    }

    /// Sum of the Worldview Validation weights.
    pub fn worldview_validation_total(&self) -> f64 {
        self.cluster_alignment + self.network_alignment + self.ysterofimia
    }

    /// Sum of the Relationship Validation weights.
    pub fn relationship_validation_total(&self) -> f64 {
        self.estrangement + self.mean_esteem + self.heroism_rank
    }
}

impl Default for AspWeights {
    fn default() -> Self {
        Self {
            cluster_exposure: 0.25,
            network_exposure: 0.25,
            relative_age: 0.25,
            memorial_proximity: 0.25,
            cluster_alignment: 0.25,
            network_alignment: 0.25,
            ysterofimia: 0.5,
            estrangement: 0.25,
            mean_esteem: 0.25,
            heroism_rank: 0.5,
        }
    }
}

/// Configuration for the per-agent self-sacrifice adjudication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionConfig {
    /// Vote threshold τ shared by the three scores (default: 0.5).
    pub threshold: f64,

    /// Cluster eliminations at which cluster exposure saturates
    /// (default: 10). Zero disables the factor.
    pub cluster_elimination_tolerance: u32,

    /// Network-peer eliminations at which network exposure saturates
    /// (default: 5). Zero disables the factor.
    pub network_elimination_tolerance: u32,

    /// Trailing window used for worldview alignment (default: 5).
    pub alignment_window: usize,

    /// Sub-factor weights.
    pub weights: AspWeights,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            cluster_elimination_tolerance: 10,
            network_elimination_tolerance: 5,
            alignment_window: 5,
            weights: AspWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one_per_score() {
        let w = AspWeights::default();
        assert!((w.mortality_salience_total() - 1.0).abs() < 1e-12);
        assert!((w.worldview_validation_total() - 1.0).abs() < 1e-12);
        assert!((w.relationship_validation_total() - 1.0).abs() < 1e-12);
    }
}
