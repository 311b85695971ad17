//! Budget allocation as a least-absolute-deviation linear program
//!
//! One non-negative allocation per forecast category. The objective is the
//! total absolute deviation from the forecast. The allocations must fit in
//! `income - savings_target` and respect the per-category bounds.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::lp::{add_absolute_deviation, LinearProgram, Relation, VarId};
use super::solver::{LpSolver, MinilpSolver};
use crate::config::BudgetSettings;
use crate::error::{SpendError, SpendResult};
use crate::models::{BudgetAllocation, SolverStatus};

/// Per-category bounds on the allocation
///
/// Entries for categories missing from the forecast are ignored. Fixed and
/// soft minimums are lower bounds that only apply when positive; soft maximums
/// are upper bounds that only apply when positive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetBounds {
    /// Committed amounts such as rent or bills
    pub fixed_minimums: BTreeMap<String, f64>,
    pub soft_minimums: BTreeMap<String, f64>,
    pub soft_maximums: BTreeMap<String, f64>,
}

impl BudgetBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed(mut self, category: impl Into<String>, amount: f64) -> Self {
        self.fixed_minimums.insert(category.into(), amount);
        self
    }

    pub fn with_min(mut self, category: impl Into<String>, amount: f64) -> Self {
        self.soft_minimums.insert(category.into(), amount);
        self
    }

    pub fn with_max(mut self, category: impl Into<String>, amount: f64) -> Self {
        self.soft_maximums.insert(category.into(), amount);
        self
    }

    fn validate(&self) -> SpendResult<()> {
        let all = self
            .fixed_minimums
            .iter()
            .chain(&self.soft_minimums)
            .chain(&self.soft_maximums);
        for (category, amount) in all {
            if !amount.is_finite() {
                return Err(SpendError::Validation(format!(
                    "bound for '{}' must be a finite number",
                    category
                )));
            }
        }
        Ok(())
    }
}

/// Optimizer over a pluggable LP backend
#[derive(Debug, Clone, Default)]
pub struct BudgetOptimizer<S = MinilpSolver> {
    solver: S,
}

impl BudgetOptimizer<MinilpSolver> {
    pub fn new() -> Self {
        Self::with_solver(MinilpSolver)
    }
}

impl<S: LpSolver> BudgetOptimizer<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Amount that may be allocated across all categories
    pub fn available(monthly_income: f64, savings_target: f64) -> f64 {
        monthly_income - savings_target
    }

    /// Build the program without solving it
    ///
    /// Returns the allocation variable of every forecast category alongside.
    pub fn build_program(
        &self,
        forecast: &BTreeMap<String, f64>,
        monthly_income: f64,
        savings_target: f64,
        bounds: &BudgetBounds,
    ) -> (LinearProgram, Vec<(String, VarId)>) {
        let mut lp = LinearProgram::new();
        let allocations: Vec<(String, VarId)> = forecast
            .keys()
            .map(|category| (category.clone(), lp.add_non_negative(category.as_str(), 0.0)))
            .collect();

        for ((_, var), baseline) in allocations.iter().zip(forecast.values()) {
            add_absolute_deviation(&mut lp, *var, *baseline, 1.0);
        }

        lp.add_constraint(
            allocations.iter().map(|(_, var)| (*var, 1.0)).collect(),
            Relation::LessEq,
            Self::available(monthly_income, savings_target),
        );

        let lookup: BTreeMap<&str, VarId> =
            allocations.iter().map(|(c, v)| (c.as_str(), *v)).collect();
        let bound_sets = [
            (&bounds.fixed_minimums, Relation::GreaterEq, "fixed minimum"),
            (&bounds.soft_minimums, Relation::GreaterEq, "minimum"),
            (&bounds.soft_maximums, Relation::LessEq, "maximum"),
        ];
        for (entries, relation, kind) in bound_sets {
            for (category, &amount) in entries {
                let Some(&var) = lookup.get(category.as_str()) else {
                    debug!(category = %category, kind, "ignoring bound for category without forecast");
                    continue;
                };
                if amount > 0.0 {
                    lp.add_constraint(vec![(var, 1.0)], relation, amount);
                }
            }
        }

        (lp, allocations)
    }

    /// Allocate `monthly_income - savings_target` across the forecast
    /// categories
    ///
    /// Fails only on non-finite inputs. Infeasible or unbounded programs are
    /// reported through the status; in that case every category maps to 0.0.
    pub fn optimize(
        &self,
        forecast: &BTreeMap<String, f64>,
        monthly_income: f64,
        savings_target: f64,
        bounds: &BudgetBounds,
    ) -> SpendResult<BudgetAllocation> {
        if !monthly_income.is_finite() || !savings_target.is_finite() {
            return Err(SpendError::Validation(
                "income and savings target must be finite numbers".into(),
            ));
        }
        if let Some((category, _)) = forecast.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SpendError::Validation(format!(
                "forecast for '{}' must be a finite number",
                category
            )));
        }
        bounds.validate()?;

        let (lp, allocations) = self.build_program(forecast, monthly_income, savings_target, bounds);
        let solution = self.solver.solve(&lp);

        let result: BTreeMap<String, f64> = allocations
            .into_iter()
            .map(|(category, var)| {
                let value = solution.value(var.index()).unwrap_or(0.0).max(0.0);
                (category, value)
            })
            .collect();

        match solution.status {
            SolverStatus::Optimal => info!(
                solver = self.solver.name(),
                categories = result.len(),
                deviation = solution.objective.unwrap_or(0.0),
                "budget optimized"
            ),
            status => warn!(
                solver = self.solver.name(),
                status = status.as_str(),
                available = Self::available(monthly_income, savings_target),
                "budget optimization did not find an optimal allocation"
            ),
        }

        Ok(BudgetAllocation::new(solution.status, result))
    }

    /// [`optimize`](Self::optimize) with income and savings from settings
    pub fn optimize_with_settings(
        &self,
        forecast: &BTreeMap<String, f64>,
        settings: &BudgetSettings,
        bounds: &BudgetBounds,
    ) -> SpendResult<BudgetAllocation> {
        self.optimize(
            forecast,
            settings.monthly_income,
            settings.savings_target,
            bounds,
        )
    }
}

/// Optimize with the default backend
pub fn optimize_budget(
    forecast: &BTreeMap<String, f64>,
    monthly_income: f64,
    savings_target: f64,
    bounds: &BudgetBounds,
) -> SpendResult<BudgetAllocation> {
    BudgetOptimizer::new().optimize(forecast, monthly_income, savings_target, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::solver::LpSolution;

    const EPS: f64 = 1e-6;

    fn forecast(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(c, v)| (c.to_string(), *v)).collect()
    }

    #[test]
    fn test_fits_forecast_when_affordable() {
        let f = forecast(&[("food", 800.0), ("transport", 300.0)]);
        let result = optimize_budget(&f, 2000.0, 500.0, &BudgetBounds::new()).unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.get("food") - 800.0).abs() < EPS);
        assert!((result.get("transport") - 300.0).abs() < EPS);
    }

    #[test]
    fn test_negative_availability_with_fixed_minimum_is_infeasible() {
        let f = forecast(&[("rent", 50.0), ("food", 30.0)]);
        let bounds = BudgetBounds::new().with_fixed("rent", 10.0);
        let result = optimize_budget(&f, 100.0, 200.0, &bounds).unwrap();

        assert_eq!(result.status, SolverStatus::Infeasible);
        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.get("rent"), 0.0);
        assert_eq!(result.get("food"), 0.0);
    }

    #[test]
    fn test_zero_availability_with_fixed_minimum_is_infeasible() {
        let f = forecast(&[("rent", 50.0)]);
        let bounds = BudgetBounds::new().with_fixed("rent", 10.0);
        let result = optimize_budget(&f, 500.0, 500.0, &bounds).unwrap();
        assert_eq!(result.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_zero_availability_without_minimums_allocates_nothing() {
        let f = forecast(&[("food", 120.0), ("fun", 40.0)]);
        let result = optimize_budget(&f, 500.0, 500.0, &BudgetBounds::new()).unwrap();
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.total().abs() < EPS);
    }

    #[test]
    fn test_shortfall_respects_cap_and_minimums() {
        let f = forecast(&[("rent", 1200.0), ("food", 600.0), ("fun", 400.0)]);
        let bounds = BudgetBounds::new()
            .with_fixed("rent", 1200.0)
            .with_min("food", 300.0);
        let result = optimize_budget(&f, 2000.0, 400.0, &bounds).unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.total() <= 1600.0 + EPS);
        assert!(result.get("rent") >= 1200.0 - EPS);
        assert!(result.get("food") >= 300.0 - EPS);
        for value in result.allocations.values() {
            assert!(*value >= 0.0);
        }
        // total deviation is the shortfall: 2200 - 1600
        let deviation: f64 = f.iter().map(|(c, v)| (result.get(c) - v).abs()).sum();
        assert!((deviation - 600.0).abs() < 1e-4);
    }

    #[test]
    fn test_soft_maximum_caps_allocation() {
        let f = forecast(&[("fun", 400.0), ("food", 200.0)]);
        let bounds = BudgetBounds::new().with_max("fun", 150.0).with_max("food", 0.0);
        let result = optimize_budget(&f, 5000.0, 0.0, &bounds).unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.get("fun") - 150.0).abs() < EPS);
        // a zero maximum is not a bound
        assert!((result.get("food") - 200.0).abs() < EPS);
    }

    #[test]
    fn test_bounds_for_unknown_categories_are_ignored() {
        let f = forecast(&[("food", 100.0)]);
        let bounds = BudgetBounds::new().with_fixed("travel", 5000.0);
        let result = optimize_budget(&f, 1000.0, 0.0, &bounds).unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(!result.allocations.contains_key("travel"));
    }

    #[test]
    fn test_empty_forecast() {
        let result = optimize_budget(&BTreeMap::new(), 1000.0, 100.0, &BudgetBounds::new()).unwrap();
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.allocations.is_empty());

        let result = optimize_budget(&BTreeMap::new(), 100.0, 200.0, &BudgetBounds::new()).unwrap();
        assert_eq!(result.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let f = forecast(&[("food", f64::NAN)]);
        assert!(optimize_budget(&f, 1000.0, 0.0, &BudgetBounds::new()).is_err());
        let f = forecast(&[("food", 10.0)]);
        assert!(optimize_budget(&f, f64::INFINITY, 0.0, &BudgetBounds::new()).is_err());
    }

    #[test]
    fn test_same_input_same_result() {
        let f = forecast(&[("a", 300.0), ("b", 300.0), ("c", 300.0)]);
        let first = optimize_budget(&f, 700.0, 0.0, &BudgetBounds::new()).unwrap();
        let second = optimize_budget(&f, 700.0, 0.0, &BudgetBounds::new()).unwrap();
        assert_eq!(first, second);
    }

    struct Stuck;

    impl LpSolver for Stuck {
        fn name(&self) -> &'static str {
            "stuck"
        }

        fn solve(&self, _lp: &LinearProgram) -> LpSolution {
            LpSolution {
                status: SolverStatus::Undetermined,
                values: None,
                objective: None,
            }
        }
    }

    #[test]
    fn test_status_passes_through_from_backend() {
        let f = forecast(&[("food", 100.0)]);
        let result = BudgetOptimizer::with_solver(Stuck)
            .optimize(&f, 1000.0, 0.0, &BudgetBounds::new())
            .unwrap();
        assert_eq!(result.status, SolverStatus::Undetermined);
        assert_eq!(result.get("food"), 0.0);
        assert_eq!(result.allocations.len(), 1);
    }

    #[test]
    fn test_program_shape() {
        let f = forecast(&[("food", 100.0), ("rent", 900.0)]);
        let bounds = BudgetBounds::new().with_fixed("rent", 900.0).with_min("food", 0.0);
        let (lp, vars) = BudgetOptimizer::new().build_program(&f, 2000.0, 0.0, &bounds);

        assert_eq!(vars.len(), 2);
        // allocation + two slacks per category
        assert_eq!(lp.variables().len(), 6);
        // two deviation rows, the cap, one fixed minimum
        assert_eq!(lp.constraints().len(), 4);
    }
}
