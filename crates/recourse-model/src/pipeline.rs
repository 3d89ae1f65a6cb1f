use tracing::{info, info_span};

use crate::adapter::{solve, SolverBackend};
use crate::builder::ModelBuilder;
use crate::error::{Error, InputError};
use crate::instance::Instance;
use crate::results::Results;

/// Parses an operator-supplied count such as the number of sites
pub fn parse_count(name: &'static str, raw: &str) -> Result<usize, InputError> {
    let trimmed = raw.trim();
    match trimmed.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(InputError::InvalidCount {
            name,
            value: trimmed.to_string(),
        }),
    }
}

/// Builds, solves and reads back one instance with the default builder
pub fn run<B: SolverBackend + ?Sized>(instance: &Instance, backend: &B) -> Result<Results, Error> {
    run_with(&ModelBuilder::new(), instance, backend)
}

pub fn run_with<B: SolverBackend + ?Sized>(
    builder: &ModelBuilder,
    instance: &Instance,
    backend: &B,
) -> Result<Results, Error> {
    let model = {
        let _span = info_span!("build").entered();
        builder.build(instance)?
    };
    info!(
        sites = instance.num_sites(),
        warehouses = instance.num_warehouses(),
        scenarios = instance.num_scenarios(),
        "model assembled"
    );

    let solved = {
        let _span = info_span!("solve", backend = backend.name()).entered();
        solve(&model, backend)?
    };
    info!(objective = solved.objective_value, iterations = solved.iterations, "model solved");

    let _span = info_span!("extract").entered();
    Ok(Results::extract(&model, &solved)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SimplexBackend;
    use crate::error::BuildError;
    use crate::generator::{GeneratorConfig, InstanceGenerator, DEFAULT_SCENARIOS};

    const TOL: f64 = 1e-6;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= TOL * expected.abs().max(1.0)
    }

    /// Prices high enough that most warehouses are worth running
    fn profitable() -> GeneratorConfig {
        GeneratorConfig {
            selling_price: 1000..3000,
            ..GeneratorConfig::default()
        }
    }

    /// `c[i] + sum_j A[i,j] b[j]`: cost of one unit of product `i` when its
    /// parts are bought up front and fully used
    fn unit_margins(instance: &Instance) -> Vec<f64> {
        instance
            .net_cost()
            .iter()
            .zip(&instance.requirements)
            .map(|(c, row)| c + row.iter().zip(&instance.preorder_cost).map(|(a, b)| a * b).sum::<f64>())
            .collect()
    }

    /// Bounds on the optimal expected cost that do not go through the solver.
    ///
    /// Lower: every profitable unit produced, every part priced at `b`, no
    /// salvage. Upper: the same production covered by the per-site maximum
    /// over scenarios, leftovers salvaged.
    fn cost_bounds(instance: &Instance) -> (f64, f64) {
        let margins = unit_margins(instance);
        let net_cost = instance.net_cost();
        let (n, m, scenarios) = (instance.num_warehouses(), instance.num_sites(), instance.num_scenarios());
        let production = |i: usize, k: usize| if margins[i] < 0.0 { instance.demand[i][k] } else { 0.0 };

        let mut lower = 0.0;
        let mut upper = 0.0;
        for (k, &p) in instance.probabilities.iter().enumerate() {
            for i in 0..n {
                lower += p * margins[i].min(0.0) * instance.demand[i][k];
                upper += p * net_cost[i] * production(i, k);
            }
        }
        for j in 0..m {
            let consumed: Vec<f64> = (0..scenarios)
                .map(|k| (0..n).map(|i| instance.requirements[i][j] * production(i, k)).sum())
                .collect();
            let x = consumed.iter().copied().fold(0.0, f64::max);
            upper += instance.preorder_cost[j] * x;
            for (k, &p) in instance.probabilities.iter().enumerate() {
                upper -= p * instance.salvage_value[j] * (x - consumed[k]);
            }
        }
        (lower, upper)
    }

    /// One site, one warehouse, two equally likely scenarios
    fn single_site(net_cost: f64) -> Instance {
        let (l, q) = if net_cost >= 0.0 { (net_cost, 0.0) } else { (0.0, -net_cost) };
        Instance::from_arrays(
            vec![10.0],
            vec![2.0],
            vec![l],
            vec![q],
            vec![vec![1.0]],
            vec![vec![5.0, 10.0]],
            vec![0.5, 0.5],
        )
    }

    fn assert_inventory_balance(instance: &Instance, results: &Results) {
        for (j, site) in instance.sites.iter().enumerate() {
            let x = results.orders.get(j).unwrap();
            for (k, scenario) in instance.scenarios.iter().enumerate() {
                let consumed: f64 = (0..instance.num_warehouses())
                    .map(|i| instance.requirements[i][j] * results.production.get(i, k).unwrap())
                    .sum();
                let y = results.inventory.get(j, k).unwrap();
                assert!(
                    (y - (x - consumed)).abs() <= TOL,
                    "{site}/{scenario}: y = {y}, x = {x}, consumed = {consumed}"
                );
            }
        }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("sites", " 3\n"), Ok(3));
        for raw in ["0", "-2", "abc", "", "2.5"] {
            assert!(parse_count("sites", raw).is_err(), "{raw:?} accepted");
        }
        assert_eq!(
            parse_count("warehouses", "x"),
            Err(InputError::InvalidCount {
                name: "warehouses",
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn test_positive_net_cost_produces_nothing() {
        // Objective reduces to 8x + 2.5 z1 + 2.5 z2, so everything stays at zero
        let results = run(&single_site(3.0), &SimplexBackend::new()).unwrap();

        assert!(results.objective_value.abs() <= TOL, "obj = {}", results.objective_value);
        assert_eq!(results.orders.get(0), Some(0.0));
        assert_eq!(results.production.values, vec![vec![0.0, 0.0]]);
        assert_eq!(results.inventory.values, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_profitable_production_baseline() {
        // c = -20: objective 8x - 9 z1 - 9 z2 with x >= z1, z2
        let instance = single_site(-20.0);
        let results = run(&instance, &SimplexBackend::new()).unwrap();

        assert!((results.objective_value + 55.0).abs() <= TOL, "obj = {}", results.objective_value);
        assert!((results.orders.get(0).unwrap() - 10.0).abs() <= TOL);
        let z1 = results.production.get_labeled("Warehouse 1", "Scenario 1").unwrap();
        let z2 = results.production.get_labeled("Warehouse 1", "Scenario 2").unwrap();
        assert!((z1 - 5.0).abs() <= TOL, "z1 = {z1}");
        assert!((z2 - 10.0).abs() <= TOL, "z2 = {z2}");
        assert!((results.inventory.get(0, 0).unwrap() - 5.0).abs() <= TOL);
        assert!(results.inventory.get(0, 1).unwrap().abs() <= TOL);
        assert_inventory_balance(&instance, &results);
    }

    #[test]
    fn test_zero_demand_orders_nothing() {
        for seed in 0..10 {
            let mut instance = InstanceGenerator::new(seed).generate(3, 3, DEFAULT_SCENARIOS).unwrap();
            for row in instance.demand.iter_mut() {
                row.iter_mut().for_each(|d| *d = 0.0);
            }

            let results = run(&instance, &SimplexBackend::new()).unwrap();
            assert!(results.production.iter().all(|(_, _, z)| z.abs() <= TOL), "seed {seed}");
            assert!(results.orders.iter().all(|(_, x)| x.abs() <= TOL), "seed {seed}");
            assert!(results.objective_value.abs() <= TOL, "seed {seed}");
        }
    }

    #[test]
    fn test_generated_instances_balance_inventory() {
        let sizes = [(4, 3, 0..20), (15, 15, 0..3), (20, 20, 0..3), (30, 30, 0..1), (50, 50, 0..1)];
        for (sites, warehouses, seeds) in sizes {
            for seed in seeds {
                let instance = InstanceGenerator::new(seed)
                    .generate(sites, warehouses, DEFAULT_SCENARIOS)
                    .unwrap();
                let results = run(&instance, &SimplexBackend::new())
                    .unwrap_or_else(|e| panic!("{sites}x{warehouses} seed {seed}: {e}"));

                assert_inventory_balance(&instance, &results);
                for (i, row) in results.production.values.iter().enumerate() {
                    for (k, &z) in row.iter().enumerate() {
                        assert!(z >= -TOL && z <= instance.demand[i][k] + TOL, "seed {seed}: z = {z}");
                    }
                }
                assert!(results.inventory.iter().all(|(_, _, y)| y >= -TOL), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_large_instances_stay_within_cost_bounds() {
        for (seed, config) in [(1, GeneratorConfig::default()), (2, profitable()), (3, profitable())] {
            let instance = InstanceGenerator::new(seed)
                .with_config(config)
                .generate(20, 20, DEFAULT_SCENARIOS)
                .unwrap();
            let (lower, upper) = cost_bounds(&instance);
            let results = run(&instance, &SimplexBackend::new()).unwrap();
            let objective = results.objective_value;

            assert!(objective <= TOL, "seed {seed}: {objective} above the empty plan");
            assert!(objective >= lower - TOL * lower.abs().max(1.0), "seed {seed}: {objective} < {lower}");
            assert!(objective <= upper + TOL * upper.abs().max(1.0), "seed {seed}: {objective} > {upper}");
            assert_inventory_balance(&instance, &results);
        }
    }

    #[test]
    fn test_identical_scenarios_match_closed_form() {
        // With one demand vector there is nothing to hedge: buy exactly what
        // the profitable warehouses consume and nothing is salvaged
        for seed in 0..3 {
            let mut instance = InstanceGenerator::new(seed)
                .with_config(profitable())
                .generate(20, 20, DEFAULT_SCENARIOS)
                .unwrap();
            for row in instance.demand.iter_mut() {
                row[1] = row[0];
            }
            let expected: f64 = unit_margins(&instance)
                .iter()
                .zip(&instance.demand)
                .map(|(w, d)| w.min(0.0) * d[0])
                .sum();
            assert!(expected < 0.0, "seed {seed}: nothing worth producing");

            let results = run(&instance, &SimplexBackend::new()).unwrap();
            assert!(
                close(results.objective_value, expected),
                "seed {seed}: {} != {expected}",
                results.objective_value
            );
            assert!(results.inventory.iter().all(|(_, _, y)| close(y, 0.0)), "seed {seed}");
        }
    }

    #[test]
    fn test_more_scenarios() {
        let instance = InstanceGenerator::new(9).generate(2, 2, 4).unwrap();
        let results = run(&instance, &SimplexBackend::new()).unwrap();
        assert_eq!(results.production.columns.len(), 4);
        assert_inventory_balance(&instance, &results);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let instance = InstanceGenerator::new(77).generate(3, 4, DEFAULT_SCENARIOS).unwrap();
        let backend = SimplexBackend::new();
        let first = run(&instance, &backend).unwrap();
        let second = run(&instance, &backend).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_probabilities_stop_before_solving() {
        let mut instance = single_site(3.0);
        instance.probabilities = vec![-0.25, -0.75];
        assert!(matches!(
            run(&instance, &SimplexBackend::new()),
            Err(Error::Build(BuildError::DimensionMismatch { parameter: "p", .. }))
        ));
    }
}
