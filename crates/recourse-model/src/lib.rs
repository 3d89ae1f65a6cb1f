pub mod adapter;
pub mod builder;
pub mod error;
pub mod generator;
pub mod instance;
pub mod model;
pub mod pipeline;
pub mod results;

pub use adapter::{lower, solve, SimplexBackend, SolvedModel, SolverBackend};
pub use builder::ModelBuilder;
pub use error::{BuildError, Error, InputError, SolveError};
pub use generator::{GeneratorConfig, InstanceGenerator, DEFAULT_SCENARIOS};
pub use instance::Instance;
pub use model::{
    Equation, EquationRow, Expr, LinearForm, Model, Objective, ProblemClass, Relation, Sense, SetDecl, VarRef,
    VariableDecl,
};
pub use pipeline::{parse_count, run, run_with};
pub use results::{Results, Series, Table};
