//! In-memory representation of an algebraic optimization model.
//!
//! A [`Model`] holds named index sets, continuous nonnegative variables
//! declared over those sets, named equations with one row per domain tuple,
//! and an objective expression. Nothing here knows about a particular solver;
//! [`crate::adapter`] lowers the model to matrix form.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::BuildError;

/// A named, ordered index set
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SetDecl {
    pub name: String,
    pub description: String,
    pub members: Vec<String>,
}

/// A continuous nonnegative variable indexed by a tuple of sets
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub description: String,
    /// Set ids, outermost first
    pub domain: Vec<usize>,
}

/// One scalar element of a declared variable
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub variable: usize,
    /// Member position within each domain set
    pub index: Vec<usize>,
}

/// Expression tree over variables and constants
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Var(VarRef),
    Sum(Vec<Expr>),
    Scaled(f64, Box<Expr>),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

/// `lhs (relation) rhs` for one tuple of an equation's domain
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EquationRow {
    pub index: Vec<usize>,
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: Expr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub name: String,
    pub description: String,
    pub domain: Vec<usize>,
    pub rows: Vec<EquationRow>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Declared problem class. No variable carries an integrality
/// restriction, so both classes solve as a linear program.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemClass {
    Lp,
    Mip,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub expr: Expr,
    pub sense: Sense,
}

/// An affine function of the flat model columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearForm {
    pub terms: BTreeMap<usize, f64>,
    pub constant: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub class: ProblemClass,
    pub sets: Vec<SetDecl>,
    pub variables: Vec<VariableDecl>,
    pub equations: Vec<Equation>,
    pub objective: Objective,
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn var(variable: usize, index: Vec<usize>) -> Self {
        Expr::Var(VarRef { variable, index })
    }

    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Sum(terms.into_iter().collect())
    }

    pub fn scale(self, factor: f64) -> Self {
        Expr::Scaled(factor, Box::new(self))
    }

    pub fn plus(self, other: Expr) -> Self {
        Expr::Sum(vec![self, other])
    }

    pub fn minus(self, other: Expr) -> Self {
        Expr::Sum(vec![self, other.scale(-1.0)])
    }

    /// Collapses the tree into coefficients per column plus a constant
    pub fn linearize(&self, model: &Model) -> Result<LinearForm, BuildError> {
        let mut form = LinearForm::default();
        self.accumulate(model, 1.0, &mut form)?;
        Ok(form)
    }

    fn accumulate(&self, model: &Model, factor: f64, form: &mut LinearForm) -> Result<(), BuildError> {
        match self {
            Expr::Constant(value) => form.constant += factor * value,
            Expr::Var(var) => {
                let column = model.column_of(var)?;
                *form.terms.entry(column).or_insert(0.0) += factor;
            }
            Expr::Sum(terms) => {
                for term in terms {
                    term.accumulate(model, factor, form)?;
                }
            }
            Expr::Scaled(inner_factor, inner) => inner.accumulate(model, factor * inner_factor, form)?,
        }
        Ok(())
    }
}

impl LinearForm {
    /// Dense coefficient vector of length `columns`
    pub fn dense(&self, columns: usize) -> Vec<f64> {
        let mut coefficients = vec![0.0; columns];
        for (&column, &coef) in &self.terms {
            coefficients[column] = coef;
        }
        coefficients
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Eq => f.write_str("=="),
            Relation::Le => f.write_str("<="),
            Relation::Ge => f.write_str(">="),
        }
    }
}

impl Model {
    pub fn new(name: impl Into<String>, class: ProblemClass) -> Self {
        Self {
            name: name.into(),
            class,
            sets: Vec::new(),
            variables: Vec::new(),
            equations: Vec::new(),
            objective: Objective {
                expr: Expr::Constant(0.0),
                sense: Sense::Minimize,
            },
        }
    }

    pub fn add_set(&mut self, name: impl Into<String>, description: impl Into<String>, members: Vec<String>) -> usize {
        self.sets.push(SetDecl {
            name: name.into(),
            description: description.into(),
            members,
        });
        self.sets.len() - 1
    }

    pub fn add_variable(&mut self, name: impl Into<String>, description: impl Into<String>, domain: Vec<usize>) -> usize {
        self.variables.push(VariableDecl {
            name: name.into(),
            description: description.into(),
            domain,
        });
        self.variables.len() - 1
    }

    /// Declares an equation over `domain`, calling `define` once per tuple
    /// in row-major order to produce `(lhs, relation, rhs)`.
    pub fn add_equation<F>(&mut self, name: impl Into<String>, description: impl Into<String>, domain: Vec<usize>, mut define: F)
    where
        F: FnMut(&[usize]) -> (Expr, Relation, Expr),
    {
        let rows = self
            .domain_tuples(&domain)
            .into_iter()
            .map(|index| {
                let (lhs, relation, rhs) = define(&index);
                EquationRow {
                    index,
                    lhs,
                    relation,
                    rhs,
                }
            })
            .collect();
        self.equations.push(Equation {
            name: name.into(),
            description: description.into(),
            domain,
            rows,
        });
    }

    pub fn set_objective(&mut self, expr: Expr, sense: Sense) {
        self.objective = Objective { expr, sense };
    }

    pub fn variable_id(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn equation(&self, name: &str) -> Option<&Equation> {
        self.equations.iter().find(|e| e.name == name)
    }

    pub fn domain_size(&self, domain: &[usize]) -> usize {
        domain.iter().map(|&set| self.sets[set].members.len()).product()
    }

    /// Every tuple of `domain`, last set varying fastest
    pub fn domain_tuples(&self, domain: &[usize]) -> Vec<Vec<usize>> {
        let mut tuples = vec![Vec::with_capacity(domain.len())];
        for &set in domain {
            let size = self.sets[set].members.len();
            tuples = tuples
                .into_iter()
                .flat_map(|prefix| {
                    (0..size).map(move |member| {
                        let mut tuple = prefix.clone();
                        tuple.push(member);
                        tuple
                    })
                })
                .collect();
        }
        tuples
    }

    /// Total number of scalar columns across all variables
    pub fn column_count(&self) -> usize {
        self.variables.iter().map(|v| self.domain_size(&v.domain)).sum()
    }

    /// First column of `variable` in the flat layout
    pub fn variable_offset(&self, variable: usize) -> usize {
        self.variables[..variable]
            .iter()
            .map(|v| self.domain_size(&v.domain))
            .sum()
    }

    /// Flat column of a variable element, checking arity and bounds
    pub fn column_of(&self, var: &VarRef) -> Result<usize, BuildError> {
        let Some(decl) = self.variables.get(var.variable) else {
            return Err(BuildError::dimension(
                "variable reference",
                format!("a variable id below {}", self.variables.len()),
                var.variable,
            ));
        };
        if var.index.len() != decl.domain.len() {
            return Err(BuildError::dimension(
                "variable reference",
                format!("{} with {} indices", decl.name, decl.domain.len()),
                var.index.len(),
            ));
        }

        let mut position = 0;
        for (&member, &set) in var.index.iter().zip(&decl.domain) {
            let size = self.sets[set].members.len();
            if member >= size {
                return Err(BuildError::dimension(
                    "variable reference",
                    format!("{} member below {}", self.sets[set].name, size),
                    member,
                ));
            }
            position = position * size + member;
        }
        Ok(self.variable_offset(var.variable) + position)
    }

    /// `Site 1,Scenario 2` style label for a tuple of `domain`
    pub fn tuple_label(&self, domain: &[usize], index: &[usize]) -> String {
        domain
            .iter()
            .zip(index)
            .map(|(&set, &member)| self.sets[set].members[member].as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Labels for every flat column, e.g. `y[Site 1,Scenario 2]`
    pub fn column_labels(&self) -> Vec<String> {
        self.variables
            .iter()
            .flat_map(|decl| {
                self.domain_tuples(&decl.domain)
                    .into_iter()
                    .map(move |index| format!("{}[{}]", decl.name, self.tuple_label(&decl.domain, &index)))
            })
            .collect()
    }
}
