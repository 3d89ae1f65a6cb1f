use crate::error::BuildError;

/// Allowed distance between the scenario probability total and 1
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One fully populated problem instance.
///
/// Matrices are stored row-major: `requirements[i][j]` is the number of
/// site-`j` parts needed per unit built at warehouse `i`, and
/// `demand[i][k]` is warehouse `i`'s need under scenario `k`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub sites: Vec<String>,
    pub warehouses: Vec<String>,
    pub scenarios: Vec<String>,
    /// `b[j]`, cost of pre-ordering one part at site `j`
    pub preorder_cost: Vec<f64>,
    /// `s[j]`, credit per leftover part at site `j` (may be negative)
    pub salvage_value: Vec<f64>,
    /// `l[i]`, additional cost per unit built at warehouse `i`
    pub additional_cost: Vec<f64>,
    /// `q[i]`, selling price per unit built at warehouse `i`
    pub selling_price: Vec<f64>,
    /// `A`, warehouses x sites
    pub requirements: Vec<Vec<f64>>,
    /// `d`, warehouses x scenarios
    pub demand: Vec<Vec<f64>>,
    /// `p[k]`
    pub probabilities: Vec<f64>,
}

impl Instance {
    /// Builds an instance with `Site 1..m`, `Warehouse 1..n` and
    /// `Scenario 1..K` labels derived from the array lengths.
    pub fn from_arrays(
        preorder_cost: Vec<f64>,
        salvage_value: Vec<f64>,
        additional_cost: Vec<f64>,
        selling_price: Vec<f64>,
        requirements: Vec<Vec<f64>>,
        demand: Vec<Vec<f64>>,
        probabilities: Vec<f64>,
    ) -> Self {
        Self {
            sites: labels("Site", preorder_cost.len()),
            warehouses: labels("Warehouse", additional_cost.len()),
            scenarios: labels("Scenario", probabilities.len()),
            preorder_cost,
            salvage_value,
            additional_cost,
            selling_price,
            requirements,
            demand,
            probabilities,
        }
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn num_warehouses(&self) -> usize {
        self.warehouses.len()
    }

    pub fn num_scenarios(&self) -> usize {
        self.scenarios.len()
    }

    /// `c[i] = l[i] - q[i]`; negative when a unit sells for more than it costs
    pub fn net_cost(&self) -> Vec<f64> {
        self.additional_cost
            .iter()
            .zip(&self.selling_price)
            .map(|(l, q)| l - q)
            .collect()
    }

    /// Checks shapes, the probability total, then value domains.
    pub fn validate(&self) -> Result<(), BuildError> {
        let m = self.num_sites();
        let n = self.num_warehouses();
        let k = self.num_scenarios();

        for (parameter, len) in [("sites", m), ("warehouses", n), ("scenarios", k)] {
            if len == 0 {
                return Err(BuildError::dimension(parameter, "at least 1 member", 0));
            }
        }

        check_len("b", &self.preorder_cost, m)?;
        check_len("s", &self.salvage_value, m)?;
        check_len("l", &self.additional_cost, n)?;
        check_len("q", &self.selling_price, n)?;
        check_len("p", &self.probabilities, k)?;
        check_matrix("A", &self.requirements, n, m)?;
        check_matrix("d", &self.demand, n, k)?;

        let total: f64 = self.probabilities.iter().sum();
        if !((total - 1.0).abs() <= PROBABILITY_TOLERANCE) {
            return Err(BuildError::dimension("p", "probabilities summing to 1", format!("sum {total}")));
        }

        self.check_nonnegative("b", &self.preorder_cost, &self.sites)?;
        self.check_nonnegative("l", &self.additional_cost, &self.warehouses)?;
        self.check_nonnegative("q", &self.selling_price, &self.warehouses)?;
        self.check_nonnegative("p", &self.probabilities, &self.scenarios)?;
        for (i, row) in self.requirements.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                if !(value.is_finite() && value >= 0.0) {
                    let index = format!("{},{}", self.warehouses[i], self.sites[j]);
                    return Err(BuildError::domain("A", index, format!("{value} is not a nonnegative number")));
                }
            }
        }
        for (i, row) in self.demand.iter().enumerate() {
            for (k, &value) in row.iter().enumerate() {
                if !(value.is_finite() && value >= 0.0) {
                    let index = format!("{},{}", self.warehouses[i], self.scenarios[k]);
                    return Err(BuildError::domain("d", index, format!("{value} is not a nonnegative number")));
                }
            }
        }

        // Salvage may be negative, but never reach the pre-order cost
        for (j, (&s, &b)) in self.salvage_value.iter().zip(&self.preorder_cost).enumerate() {
            if !s.is_finite() {
                return Err(BuildError::domain("s", &self.sites[j], format!("{s} is not finite")));
            }
            if s >= b {
                return Err(BuildError::domain(
                    "s",
                    &self.sites[j],
                    format!("salvage value {s} must be below pre-order cost {b}"),
                ));
            }
        }

        Ok(())
    }

    fn check_nonnegative(&self, parameter: &'static str, values: &[f64], labels: &[String]) -> Result<(), BuildError> {
        match values.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            Some(idx) => Err(BuildError::domain(
                parameter,
                &labels[idx],
                format!("{} is not a nonnegative number", values[idx]),
            )),
            None => Ok(()),
        }
    }
}

/// `["{prefix} 1", ..., "{prefix} count"]`
pub fn labels(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|idx| format!("{prefix} {idx}")).collect()
}

/// Equal weight for each of `count` scenarios
pub fn uniform_probabilities(count: usize) -> Vec<f64> {
    vec![1.0 / count as f64; count]
}

fn check_len(parameter: &'static str, values: &[f64], expected: usize) -> Result<(), BuildError> {
    if values.len() != expected {
        return Err(BuildError::dimension(parameter, expected, values.len()));
    }
    Ok(())
}

fn check_matrix(parameter: &'static str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Result<(), BuildError> {
    let expected = format!("{n_rows} x {n_cols}");
    if rows.len() != n_rows {
        return Err(BuildError::dimension(parameter, expected, format!("{} rows", rows.len())));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != n_cols) {
        return Err(BuildError::dimension(parameter, expected, format!("a row of {}", row.len())));
    }
    Ok(())
}
