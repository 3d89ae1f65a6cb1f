use thiserror::Error;

/// Bad operator input, rejected before any data is generated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidCount { name: &'static str, value: String },
    #[error("sampling range for {name} is empty: {start}..{end}")]
    EmptyRange { name: &'static str, start: i64, end: i64 },
    #[error("salvage margin {margin} must be positive and fit below a preorder cost of {preorder_cost}")]
    InvalidMargin { margin: i64, preorder_cost: i64 },
}

/// Malformed instance data, rejected before a model is assembled
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("dimension mismatch in {parameter}: expected {expected}, found {found}")]
    DimensionMismatch {
        parameter: &'static str,
        expected: String,
        found: String,
    },
    #[error("invalid value in {parameter}[{index}]: {reason}")]
    InvalidDomain {
        parameter: &'static str,
        index: String,
        reason: String,
    },
}

/// Terminal outcomes of the solve step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("model is infeasible: no point satisfies every constraint")]
    Infeasible,
    #[error("model is unbounded: the objective has no finite minimum")]
    Unbounded,
    #[error("solver {backend} unavailable: {reason}")]
    SolverUnavailable { backend: String, reason: String },
}

/// Any failure of a run, tagged with the stage that produced it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("input: {0}")]
    Input(#[from] InputError),
    #[error("model build: {0}")]
    Build(#[from] BuildError),
    #[error("solve: {0}")]
    Solve(#[from] SolveError),
}

impl BuildError {
    pub(crate) fn dimension(parameter: &'static str, expected: impl ToString, found: impl ToString) -> Self {
        BuildError::DimensionMismatch {
            parameter,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn domain(parameter: &'static str, index: impl ToString, reason: impl Into<String>) -> Self {
        BuildError::InvalidDomain {
            parameter,
            index: index.to_string(),
            reason: reason.into(),
        }
    }
}
