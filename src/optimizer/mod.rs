//! Budget optimization
//!
//! [`lp`] holds a solver-independent model of a linear program and the
//! absolute-deviation helper, [`solver`] the backends, and [`budget`] the
//! allocation problem itself.

pub mod budget;
pub mod lp;
pub mod solver;

pub use budget::{optimize_budget, BudgetBounds, BudgetOptimizer};
pub use lp::{add_absolute_deviation, AbsoluteDeviation, LinearProgram, Relation, VarId};
pub use solver::{LpSolution, LpSolver, MinilpSolver};
