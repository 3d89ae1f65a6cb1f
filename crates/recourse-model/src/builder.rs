use tracing::debug;

use crate::error::BuildError;
use crate::instance::Instance;
use crate::model::{Expr, Model, ProblemClass, Relation, Sense};

/// Formulates the two-stage parts-ordering program from an [`Instance`]:
///
/// ```text
/// min  sum_j b[j] x[j] + sum_k p[k] (sum_i c[i] z[i,k] - sum_j s[j] y[j,k])
/// s.t. y[j,k] = x[j] - sum_i A[i,j] z[i,k]
///      z[i,k] <= d[i,k]
///      x, y, z >= 0
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    name: String,
    class: ProblemClass,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            name: "problem_1".to_string(),
            class: ProblemClass::Lp,
        }
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_class(mut self, class: ProblemClass) -> Self {
        self.class = class;
        self
    }

    pub fn build(&self, instance: &Instance) -> Result<Model, BuildError> {
        instance.validate()?;

        let n = instance.num_warehouses();
        let m = instance.num_sites();
        let requirements = &instance.requirements;
        let demand = &instance.demand;
        let net_cost = instance.net_cost();

        let mut model = Model::new(&self.name, self.class);
        let i = model.add_set("i", "Warehouses", instance.warehouses.clone());
        let j = model.add_set("j", "Sites", instance.sites.clone());
        let k = model.add_set("k", "Scenarios", instance.scenarios.clone());

        let x = model.add_variable("x", "Number of parts to be ordered before production", vec![j]);
        let y = model.add_variable("y", "Number of parts left in inventory", vec![j, k]);
        let z = model.add_variable("z", "Number of units produced", vec![i, k]);

        model.add_equation(
            "need_constraint",
            "Leftover inventory equals orders less parts consumed",
            vec![j, k],
            |idx| {
                let (site, scenario) = (idx[0], idx[1]);
                let consumed = Expr::sum(
                    (0..n).map(|w| Expr::var(z, vec![w, scenario]).scale(requirements[w][site])),
                );
                (
                    Expr::var(y, vec![site, scenario]),
                    Relation::Eq,
                    Expr::var(x, vec![site]).minus(consumed),
                )
            },
        );
        model.add_equation("non_negative_order_constraint", "Orders are nonnegative", vec![j], |idx| {
            (Expr::var(x, idx.to_vec()), Relation::Ge, Expr::constant(0.0))
        });
        model.add_equation(
            "non_negative_inventory_constraint",
            "Leftover inventory is nonnegative",
            vec![j, k],
            |idx| (Expr::var(y, idx.to_vec()), Relation::Ge, Expr::constant(0.0)),
        );
        model.add_equation(
            "non_negative_production_constraint",
            "Production is nonnegative",
            vec![i, k],
            |idx| (Expr::var(z, idx.to_vec()), Relation::Ge, Expr::constant(0.0)),
        );
        model.add_equation(
            "production_need_constraint",
            "Production never exceeds scenario demand",
            vec![i, k],
            |idx| {
                let (warehouse, scenario) = (idx[0], idx[1]);
                (
                    Expr::var(z, idx.to_vec()),
                    Relation::Le,
                    Expr::constant(demand[warehouse][scenario]),
                )
            },
        );
        model.add_equation(
            "inventory_salvage_constraint",
            "Only nonnegative inventory can be salvaged",
            vec![j, k],
            |idx| (Expr::var(y, idx.to_vec()), Relation::Ge, Expr::constant(0.0)),
        );

        let first_stage = Expr::sum((0..m).map(|site| Expr::var(x, vec![site]).scale(instance.preorder_cost[site])));
        let recourse = Expr::sum(instance.probabilities.iter().enumerate().map(|(scenario, &p)| {
            let production_cost =
                Expr::sum((0..n).map(|w| Expr::var(z, vec![w, scenario]).scale(net_cost[w])));
            let salvage = Expr::sum(
                (0..m).map(|site| Expr::var(y, vec![site, scenario]).scale(instance.salvage_value[site])),
            );
            production_cost.minus(salvage).scale(p)
        }));
        model.set_objective(first_stage.plus(recourse), Sense::Minimize);

        debug!(
            model = %model.name,
            columns = model.column_count(),
            equations = model.equations.len(),
            rows = model.equations.iter().map(|e| e.rows.len()).sum::<usize>(),
            "model built"
        );

        Ok(model)
    }
}
