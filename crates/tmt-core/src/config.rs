//! Configuration loading and typed config structures for the TMT simulation.
//!
//! The canonical configuration lives in `tmt-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, a loader
//! that reads the file, and [`SimulationConfig::validate`], which rejects
//! parameter sets the engine cannot run with. Every section and field has
//! a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::Deserialize;
use tmt_agents::{AspWeights, DecisionConfig, FertilityBounds, Telomere};

/// Allowed deviation of a sum that must equal one.
const SUM_TOLERANCE: f64 = 0.05;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot be used.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `tmt-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid, seed, and scheduling.
    #[serde(default)]
    pub world: WorldConfig,

    /// Seeding, quota, and reproduction.
    #[serde(default)]
    pub population: PopulationConfig,

    /// k-means parameters.
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Mortality curve.
    #[serde(default)]
    pub telomere: TelomereConfig,

    /// Worldview ledger parameters.
    #[serde(default)]
    pub worldview: WorldviewConfig,

    /// Self-sacrifice decision model.
    #[serde(default)]
    pub decision: DecisionSection,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The result is not validated; call [`SimulationConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.population.validate()?;
        if self.clustering.k == 0 {
            return Err(invalid("clustering.k", "must be at least 1"));
        }
        if self.clustering.max_iterations == 0 {
            return Err(invalid("clustering.max_iterations", "must be at least 1"));
        }
        let cells = u64::from(self.world.width).saturating_mul(u64::from(self.world.height));
        if u64::from(self.population.initial_agents) > cells {
            return Err(invalid(
                "population.initial_agents",
                format!("{} agents do not fit a {cells}-cell grid", self.population.initial_agents),
            ));
        }
        non_negative("telomere.alpha", self.telomere.alpha)?;
        non_negative("telomere.beta", self.telomere.beta)?;
        probability("worldview.drift_probability", self.worldview.drift_probability)?;
        self.decision.validate()
    }

    /// Decision-model parameters for the agents crate.
    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            threshold: self.decision.threshold,
            cluster_elimination_tolerance: self.decision.cluster_elimination_tolerance,
            network_elimination_tolerance: self.decision.network_elimination_tolerance,
            alignment_window: self.worldview.window,
            weights: self.decision.weights.to_weights(),
        }
    }

    /// The mortality curve given to every agent.
    pub fn telomere(&self) -> Telomere {
        Telomere::new(self.telomere.alpha, self.telomere.beta, self.telomere.max_age)
    }

    /// Bounds for the expected-children drift.
    pub const fn fertility_bounds(&self) -> FertilityBounds {
        FertilityBounds {
            min: self.population.min_expected_children,
            max: self.population.max_expected_children,
            drift: self.population.expected_children_drift,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Grid columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of iterations to run.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Movement turns per iteration.
    #[serde(default = "default_turns")]
    pub turns: u32,
}

impl WorldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(
                "world.width",
                format!("grid {}x{} has no cells", self.width, self.height),
            ));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(invalid("world.width", "grid dimensions are too large"));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            iterations: default_iterations(),
            turns: default_turns(),
        }
    }
}

/// Seed proportions of the four attachment styles.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StyleProportions {
    /// Share of secure agents.
    #[serde(default = "default_quarter")]
    pub secure: f64,
    /// Share of dismissive agents.
    #[serde(default = "default_quarter")]
    pub dismissive: f64,
    /// Share of preoccupied agents.
    #[serde(default = "default_quarter")]
    pub preoccupied: f64,
    /// Share of fearful agents.
    #[serde(default = "default_quarter")]
    pub fearful: f64,
}

impl StyleProportions {
    /// Weights ordered as `AttachmentStyle::ALL`.
    pub const fn as_weights(&self) -> [f64; 4] {
        [self.secure, self.dismissive, self.preoccupied, self.fearful]
    }
}

impl Default for StyleProportions {
    fn default() -> Self {
        Self {
            secure: default_quarter(),
            dismissive: default_quarter(),
            preoccupied: default_quarter(),
            fearful: default_quarter(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents seeded at start.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Style proportions used at seeding.
    #[serde(default)]
    pub proportions: StyleProportions,

    /// Seed agents get a uniform age in `[0, seed_age_max)`.
    #[serde(default = "default_seed_age_max")]
    pub seed_age_max: u32,

    /// Probability of a tie between two agents at seeding or birth.
    #[serde(default = "default_connection_probability")]
    pub connection_probability: f64,

    /// Share of the population that must be eliminated each iteration (ρ).
    /// Also the voluntary share that pushes expected children up.
    #[serde(default = "default_rho")]
    pub rho: f64,

    /// Starting expected children per pair.
    #[serde(default = "default_initial_expected_children")]
    pub initial_expected_children: f64,

    /// Lowest expected children per pair.
    #[serde(default = "default_min_expected_children")]
    pub min_expected_children: f64,

    /// Highest expected children per pair.
    #[serde(default = "default_max_expected_children")]
    pub max_expected_children: f64,

    /// Multiplicative step for expected children per iteration.
    #[serde(default = "default_expected_children_drift")]
    pub expected_children_drift: f64,

    /// Probability mass spread over non-parental styles at birth.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Whether the unpaired member of an odd pool reproduces alone.
    #[serde(default)]
    pub clone_unpaired_parent: bool,
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let weights = self.proportions.as_weights();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid(
                "population.proportions",
                format!("proportions must be non-negative, got {weights:?}"),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(invalid(
                "population.proportions",
                format!("proportions sum to {total}, expected 1"),
            ));
        }
        probability("population.connection_probability", self.connection_probability)?;
        probability("population.rho", self.rho)?;
        probability("population.mutation_rate", self.mutation_rate)?;
        non_negative("population.min_expected_children", self.min_expected_children)?;
        if self.min_expected_children > self.max_expected_children {
            return Err(invalid(
                "population.min_expected_children",
                format!(
                    "minimum {} exceeds maximum {}",
                    self.min_expected_children, self.max_expected_children
                ),
            ));
        }
        if !(self.min_expected_children..=self.max_expected_children)
            .contains(&self.initial_expected_children)
        {
            return Err(invalid(
                "population.initial_expected_children",
                format!(
                    "{} lies outside [{}, {}]",
                    self.initial_expected_children,
                    self.min_expected_children,
                    self.max_expected_children
                ),
            ));
        }
        if !self.expected_children_drift.is_finite() || self.expected_children_drift < 1.0 {
            return Err(invalid(
                "population.expected_children_drift",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            proportions: StyleProportions::default(),
            seed_age_max: default_seed_age_max(),
            connection_probability: default_connection_probability(),
            rho: default_rho(),
            initial_expected_children: default_initial_expected_children(),
            min_expected_children: default_min_expected_children(),
            max_expected_children: default_max_expected_children(),
            expected_children_drift: default_expected_children_drift(),
            mutation_rate: default_mutation_rate(),
            clone_unpaired_parent: false,
        }
    }
}

/// k-means configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusteringConfig {
    /// Number of clusters.
    #[serde(default = "default_k")]
    pub k: u32,

    /// Iteration bound for one clustering pass.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Telomere configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelomereConfig {
    /// Hazard scale.
    #[serde(default = "default_telomere_alpha")]
    pub alpha: f64,

    /// Hazard growth rate.
    #[serde(default = "default_telomere_beta")]
    pub beta: f64,

    /// Age of certain death.
    #[serde(default = "default_max_age")]
    pub max_age: u32,
}

impl Default for TelomereConfig {
    fn default() -> Self {
        Self {
            alpha: default_telomere_alpha(),
            beta: default_telomere_beta(),
            max_age: default_max_age(),
        }
    }
}

/// Worldview configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldviewConfig {
    /// Trailing window for alignment.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Per-bit flip probability when appending each iteration.
    #[serde(default = "default_drift_probability")]
    pub drift_probability: f64,
}

impl Default for WorldviewConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            drift_probability: default_drift_probability(),
        }
    }
}

/// Sub-factor weights as they appear in YAML (`w1` .. `w10`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WeightsConfig {
    /// Cluster-elimination exposure.
    #[serde(default = "default_quarter")]
    pub w1: f64,
    /// Network-elimination exposure.
    #[serde(default = "default_quarter")]
    pub w2: f64,
    /// Relative age.
    #[serde(default = "default_quarter")]
    pub w3: f64,
    /// Memorial proximity.
    #[serde(default = "default_quarter")]
    pub w4: f64,
    /// Cluster alignment.
    #[serde(default = "default_quarter")]
    pub w5: f64,
    /// Network alignment.
    #[serde(default = "default_quarter")]
    pub w6: f64,
    /// Ysterofimia ratio.
    #[serde(default = "default_half")]
    pub w7: f64,
    /// Estrangement.
    #[serde(default = "default_quarter")]
    pub w8: f64,
    /// Mean esteem.
    #[serde(default = "default_quarter")]
    pub w9: f64,
    /// Heroism rank.
    #[serde(default = "default_half")]
    pub w10: f64,
}

impl WeightsConfig {
    /// Convert to the agents crate's named weights.
    pub const fn to_weights(&self) -> AspWeights {
        AspWeights {
            cluster_exposure: self.w1,
            network_exposure: self.w2,
            relative_age: self.w3,
            memorial_proximity: self.w4,
            cluster_alignment: self.w5,
            network_alignment: self.w6,
            ysterofimia: self.w7,
            estrangement: self.w8,
            mean_esteem: self.w9,
            heroism_rank: self.w10,
        }
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            w1: default_quarter(),
            w2: default_quarter(),
            w3: default_quarter(),
            w4: default_quarter(),
            w5: default_quarter(),
            w6: default_quarter(),
            w7: default_half(),
            w8: default_quarter(),
            w9: default_quarter(),
            w10: default_half(),
        }
    }
}

/// Decision-model configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionSection {
    /// Vote threshold τ.
    #[serde(default = "default_half")]
    pub threshold: f64,

    /// Saturation count for cluster exposure.
    #[serde(default = "default_cluster_elimination_tolerance")]
    pub cluster_elimination_tolerance: u32,

    /// Saturation count for network exposure.
    #[serde(default = "default_network_elimination_tolerance")]
    pub network_elimination_tolerance: u32,

    /// Sub-factor weights.
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl DecisionSection {
    fn validate(&self) -> Result<(), ConfigError> {
        probability("decision.threshold", self.threshold)?;
        let w = self.weights;
        for (name, value) in [
            ("decision.weights.w1", w.w1),
            ("decision.weights.w2", w.w2),
            ("decision.weights.w3", w.w3),
            ("decision.weights.w4", w.w4),
            ("decision.weights.w5", w.w5),
            ("decision.weights.w6", w.w6),
            ("decision.weights.w7", w.w7),
            ("decision.weights.w8", w.w8),
            ("decision.weights.w9", w.w9),
            ("decision.weights.w10", w.w10),
        ] {
            non_negative(name, value)?;
        }
        let named = w.to_weights();
        for (name, total) in [
            ("decision.weights (mortality salience)", named.mortality_salience_total()),
            ("decision.weights (worldview validation)", named.worldview_validation_total()),
            (
                "decision.weights (relationship validation)",
                named.relationship_validation_total(),
            ),
        ] {
            if (total - 1.0).abs() > SUM_TOLERANCE {
                return Err(invalid(name, format!("weights sum to {total}, expected 1")));
            }
        }
        Ok(())
    }
}

impl Default for DecisionSection {
    fn default() -> Self {
        Self {
            threshold: default_half(),
            cluster_elimination_tolerance: default_cluster_elimination_tolerance(),
            network_elimination_tolerance: default_network_elimination_tolerance(),
            weights: WeightsConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be a non-negative number")))
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_width() -> u32 {
    50
}

const fn default_height() -> u32 {
    50
}

const fn default_seed() -> u64 {
    42
}

const fn default_iterations() -> u32 {
    100
}

const fn default_turns() -> u32 {
    10
}

const fn default_initial_agents() -> u32 {
    40
}

const fn default_seed_age_max() -> u32 {
    50
}

const fn default_connection_probability() -> f64 {
    0.35
}

const fn default_rho() -> f64 {
    0.2
}

const fn default_initial_expected_children() -> f64 {
    2.0
}

const fn default_min_expected_children() -> f64 {
    1.9
}

const fn default_max_expected_children() -> f64 {
    2.1
}

const fn default_expected_children_drift() -> f64 {
    1.05
}

const fn default_mutation_rate() -> f64 {
    0.2
}

const fn default_k() -> u32 {
    3
}

const fn default_max_iterations() -> u32 {
    100
}

const fn default_telomere_alpha() -> f64 {
    0.001
}

const fn default_telomere_beta() -> f64 {
    0.05
}

const fn default_max_age() -> u32 {
    100
}

const fn default_window() -> usize {
    5
}

const fn default_drift_probability() -> f64 {
    0.05
}

const fn default_cluster_elimination_tolerance() -> u32 {
    10
}

const fn default_network_elimination_tolerance() -> u32 {
    5
}

const fn default_quarter() -> f64 {
    0.25
}

const fn default_half() -> f64 {
    0.5
}
