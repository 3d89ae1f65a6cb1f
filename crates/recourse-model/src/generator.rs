use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::InputError;
use crate::instance::{labels, uniform_probabilities, Instance};

/// Scenario count used when the operator is not asked for one
pub const DEFAULT_SCENARIOS: usize = 2;

/// Half-open integer sampling ranges for each generated array
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// `l[i]`
    pub additional_cost: Range<i64>,
    /// `q[i]`
    pub selling_price: Range<i64>,
    /// `b[j]`
    pub preorder_cost: Range<i64>,
    /// `s[j]`, before repair
    pub salvage_value: Range<i64>,
    /// `A[i,j]`
    pub requirement: Range<i64>,
    /// `d[i,k]`
    pub demand: Range<i64>,
    /// A salvage value at or above `b[j]` is replaced by `b[j] - salvage_margin`
    pub salvage_margin: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            additional_cost: 50..200,
            selling_price: 100..500,
            preorder_cost: 0..20,
            salvage_value: 0..10,
            requirement: 0..10,
            demand: 0..15,
            salvage_margin: 10,
        }
    }
}

impl GeneratorConfig {
    fn ranges(&self) -> [(&'static str, &Range<i64>); 6] {
        [
            ("additional_cost", &self.additional_cost),
            ("selling_price", &self.selling_price),
            ("preorder_cost", &self.preorder_cost),
            ("salvage_value", &self.salvage_value),
            ("requirement", &self.requirement),
            ("demand", &self.demand),
        ]
    }
}

/// Random instance source with its own seeded RNG
pub struct InstanceGenerator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl InstanceGenerator {
    /// Generator whose output is fully determined by `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: GeneratorConfig::default(),
        }
    }

    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Draws one instance.
    ///
    /// Arrays are sampled in the order `l, q, b, s, A, d`; `A` and `d` are
    /// drawn flat and filled row by row. Probabilities are uniform.
    pub fn generate(&mut self, sites: usize, warehouses: usize, scenarios: usize) -> Result<Instance, InputError> {
        for (name, value) in [("sites", sites), ("warehouses", warehouses), ("scenarios", scenarios)] {
            if value == 0 {
                return Err(InputError::InvalidCount {
                    name,
                    value: value.to_string(),
                });
            }
        }
        for (name, range) in self.config.ranges() {
            if range.is_empty() {
                return Err(InputError::EmptyRange {
                    name,
                    start: range.start,
                    end: range.end,
                });
            }
        }
        // The repair pass subtracts the margin from preorder costs as low as `start`
        let margin = self.config.salvage_margin;
        let lowest = self.config.preorder_cost.start;
        if margin <= 0 || lowest.checked_sub(margin).is_none() {
            return Err(InputError::InvalidMargin {
                margin,
                preorder_cost: lowest,
            });
        }

        let config = self.config.clone();
        let additional_cost = self.sample(&config.additional_cost, warehouses);
        let selling_price = self.sample(&config.selling_price, warehouses);
        let preorder_cost = self.sample(&config.preorder_cost, sites);
        let mut salvage_value = self.sample(&config.salvage_value, sites);
        let requirements = self.sample(&config.requirement, warehouses * sites);
        let demand = self.sample(&config.demand, warehouses * scenarios);

        for (j, (s, &b)) in salvage_value.iter_mut().zip(&preorder_cost).enumerate() {
            if *s >= b {
                let repaired = b - config.salvage_margin;
                warn!(site = j + 1, preorder_cost = b, salvage = *s, repaired, "salvage value repaired");
                *s = repaired;
            }
        }

        debug!(sites, warehouses, scenarios, "instance generated");

        Ok(Instance {
            sites: labels("Site", sites),
            warehouses: labels("Warehouse", warehouses),
            scenarios: labels("Scenario", scenarios),
            preorder_cost: to_f64(&preorder_cost),
            salvage_value: to_f64(&salvage_value),
            additional_cost: to_f64(&additional_cost),
            selling_price: to_f64(&selling_price),
            requirements: reshape(&requirements, sites),
            demand: reshape(&demand, scenarios),
            probabilities: uniform_probabilities(scenarios),
        })
    }

    fn sample(&mut self, range: &Range<i64>, count: usize) -> Vec<i64> {
        (0..count).map(|_| self.rng.gen_range(range.clone())).collect()
    }
}

fn to_f64(values: &[i64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn reshape(flat: &[i64], columns: usize) -> Vec<Vec<f64>> {
    flat.chunks(columns).map(to_f64).collect()
}
