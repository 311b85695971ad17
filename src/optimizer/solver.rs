//! LP solver backends

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};
use tracing::debug;

use super::lp::{LinearProgram, Relation};
use crate::models::SolverStatus;

/// Feasibility tolerance for trivially decided programs
const TOLERANCE: f64 = 1e-9;

/// Outcome of one solve
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: SolverStatus,
    /// One value per variable, in [`VarId`](super::lp::VarId) order; `None`
    /// unless the status is optimal
    pub values: Option<Vec<f64>>,
    pub objective: Option<f64>,
}

impl LpSolution {
    fn without_values(status: SolverStatus) -> Self {
        Self {
            status,
            values: None,
            objective: None,
        }
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.as_ref().and_then(|v| v.get(index).copied())
    }
}

pub trait LpSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, lp: &LinearProgram) -> LpSolution;
}

/// Dense simplex solver backed by `minilp`
#[derive(Debug, Clone, Copy, Default)]
pub struct MinilpSolver;

impl MinilpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl LpSolver for MinilpSolver {
    fn name(&self) -> &'static str {
        "minilp"
    }

    fn solve(&self, lp: &LinearProgram) -> LpSolution {
        // A program without variables reduces to checking each right-hand side
        // against zero.
        if lp.variables().is_empty() {
            let feasible = lp
                .constraints()
                .iter()
                .all(|c| c.relation.holds(0.0, c.rhs, TOLERANCE));
            return if feasible {
                LpSolution {
                    status: SolverStatus::Optimal,
                    values: Some(Vec::new()),
                    objective: Some(0.0),
                }
            } else {
                LpSolution::without_values(SolverStatus::Infeasible)
            };
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<_> = lp
            .variables()
            .iter()
            .map(|v| problem.add_var(v.cost, (v.lower, v.upper)))
            .collect();

        for constraint in lp.constraints() {
            let mut expr = LinearExpr::empty();
            for (var, coef) in &constraint.terms {
                expr.add(vars[var.index()], *coef);
            }
            let op = match constraint.relation {
                Relation::LessEq => ComparisonOp::Le,
                Relation::GreaterEq => ComparisonOp::Ge,
                Relation::Equal => ComparisonOp::Eq,
            };
            problem.add_constraint(expr, op, constraint.rhs);
        }

        debug!(
            variables = lp.variables().len(),
            constraints = lp.constraints().len(),
            "solving linear program"
        );

        match problem.solve() {
            Ok(solution) => LpSolution {
                status: SolverStatus::Optimal,
                values: Some(vars.iter().map(|&v| solution[v]).collect()),
                objective: Some(solution.objective()),
            },
            Err(minilp::Error::Infeasible) => LpSolution::without_values(SolverStatus::Infeasible),
            Err(minilp::Error::Unbounded) => LpSolution::without_values(SolverStatus::Unbounded),
            #[allow(unreachable_patterns)]
            Err(_) => LpSolution::without_values(SolverStatus::Undetermined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_small_program() {
        // min x + y  s.t. x + y >= 4, x <= 1
        let mut lp = LinearProgram::new();
        let x = lp.add_non_negative("x", 1.0);
        let y = lp.add_non_negative("y", 1.0);
        lp.add_constraint(vec![(x, 1.0), (y, 1.0)], Relation::GreaterEq, 4.0);
        lp.add_constraint(vec![(x, 1.0)], Relation::LessEq, 1.0);

        let solution = MinilpSolver.solve(&lp);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert!((solution.objective.unwrap() - 4.0).abs() < 1e-6);
        assert!(lp.is_feasible(solution.values.as_ref().unwrap(), 1e-6));
    }

    #[test]
    fn test_reports_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_non_negative("x", 1.0);
        lp.add_constraint(vec![(x, 1.0)], Relation::LessEq, -5.0);

        let solution = MinilpSolver.solve(&lp);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.values.is_none());
    }

    #[test]
    fn test_reports_unbounded() {
        let mut lp = LinearProgram::new();
        lp.add_variable("x", -1.0, 0.0, f64::INFINITY);

        let solution = MinilpSolver.solve(&lp);
        assert_eq!(solution.status, SolverStatus::Unbounded);
    }

    #[test]
    fn test_program_without_variables() {
        let mut lp = LinearProgram::new();
        lp.add_constraint(Vec::new(), Relation::LessEq, 10.0);
        assert_eq!(MinilpSolver.solve(&lp).status, SolverStatus::Optimal);

        lp.add_constraint(Vec::new(), Relation::LessEq, -1.0);
        assert_eq!(MinilpSolver.solve(&lp).status, SolverStatus::Infeasible);
    }
}
