use crate::adapter::SolvedModel;
use crate::error::BuildError;
use crate::model::Model;

/// Values of a one-dimensional variable keyed by set member
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub index_set: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Values of a two-dimensional variable keyed by (row member, column member)
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub row_set: String,
    pub column_set: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Everything a caller needs from a solved run
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    pub objective_value: f64,
    /// `x[j]`
    pub orders: Series,
    /// `y[j,k]`
    pub inventory: Table,
    /// `z[i,k]`
    pub production: Table,
}

impl Series {
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied()
    }

    pub fn get_labeled(&self, label: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

impl Table {
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row)?.get(column).copied()
    }

    pub fn get_labeled(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        self.get(r, c)
    }

    /// `(row label, column label, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.rows.iter().zip(&self.values).flat_map(move |(row, values)| {
            self.columns
                .iter()
                .zip(values)
                .map(move |(column, &value)| (row.as_str(), column.as_str(), value))
        })
    }
}

impl Results {
    /// Reads the objective and the `x`, `y`, `z` values back out of a solve
    pub fn extract(model: &Model, solved: &SolvedModel) -> Result<Self, BuildError> {
        Ok(Self {
            objective_value: solved.objective_value,
            orders: series(model, solved, "x")?,
            inventory: table(model, solved, "y")?,
            production: table(model, solved, "z")?,
        })
    }
}

fn lookup<'a>(model: &'a Model, name: &'static str, arity: usize) -> Result<(usize, &'a [usize]), BuildError> {
    let Some(variable) = model.variable_id(name) else {
        return Err(BuildError::dimension(name, "a declared variable", "none"));
    };
    let domain = model.variables[variable].domain.as_slice();
    if domain.len() != arity {
        return Err(BuildError::dimension(name, format!("{arity} indices"), domain.len()));
    }
    Ok((variable, domain))
}

fn series(model: &Model, solved: &SolvedModel, name: &'static str) -> Result<Series, BuildError> {
    let (variable, domain) = lookup(model, name, 1)?;
    let set = &model.sets[domain[0]];
    Ok(Series {
        name: name.to_string(),
        index_set: set.name.clone(),
        labels: set.members.clone(),
        values: solved.variable_values(model, variable)?.to_vec(),
    })
}

fn table(model: &Model, solved: &SolvedModel, name: &'static str) -> Result<Table, BuildError> {
    let (variable, domain) = lookup(model, name, 2)?;
    let (row_set, column_set) = (&model.sets[domain[0]], &model.sets[domain[1]]);
    let width = column_set.members.len();
    let values = solved
        .variable_values(model, variable)?
        .chunks(width.max(1))
        .map(<[f64]>::to_vec)
        .collect();
    Ok(Table {
        name: name.to_string(),
        row_set: row_set.name.clone(),
        column_set: column_set.name.clone(),
        rows: row_set.members.clone(),
        columns: column_set.members.clone(),
        values,
    })
}
