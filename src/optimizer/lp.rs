//! Backend-independent linear program model
//!
//! A [`LinearProgram`] is a minimization problem over bounded continuous
//! variables with linear constraints. Solvers implement
//! [`LpSolver`](super::solver::LpSolver) to consume it.

use std::fmt;

/// Handle to a variable inside one [`LinearProgram`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl Relation {
    /// Whether `lhs (relation) rhs` holds within `tolerance`
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Self::LessEq => lhs <= rhs + tolerance,
            Self::GreaterEq => lhs >= rhs - tolerance,
            Self::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Equal => "=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Objective coefficient
    pub cost: f64,
    pub lower: f64,
    /// `f64::INFINITY` when unbounded above
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side evaluated at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coef)| coef * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.relation.holds(self.lhs(values), self.rhs, tolerance)
    }
}

/// Minimize `sum(cost * x)` subject to the constraints and variable bounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>, cost: f64, lower: f64, upper: f64) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            cost,
            lower,
            upper,
        });
        VarId(self.variables.len() - 1)
    }

    /// Variable with bounds `[0, inf)`
    pub fn add_non_negative(&mut self, name: impl Into<String>, cost: f64) -> VarId {
        self.add_variable(name, cost, 0.0, f64::INFINITY)
    }

    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            terms,
            relation,
            rhs,
        });
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, value)| var.cost * value)
            .sum()
    }

    /// Whether `values` satisfies every bound and constraint within `tolerance`
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, &v)| v >= var.lower - tolerance && v <= var.upper + tolerance)
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, tolerance))
    }
}

/// Slack pair measuring `|var - target|`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteDeviation {
    /// Amount by which `var` exceeds the target
    pub over: VarId,
    /// Amount by which `var` falls short of the target
    pub under: VarId,
}

impl AbsoluteDeviation {
    pub fn value(&self, values: &[f64]) -> f64 {
        let get = |id: VarId| values.get(id.index()).copied().unwrap_or(0.0);
        get(self.over) + get(self.under)
    }
}

/// Add `weight * |var - target|` to the objective
///
/// Introduces two non-negative slacks with `over - under = var - target`. When
/// minimizing with a positive weight at most one of them is non-zero at the
/// optimum, so their sum equals the absolute deviation.
pub fn add_absolute_deviation(
    lp: &mut LinearProgram,
    var: VarId,
    target: f64,
    weight: f64,
) -> AbsoluteDeviation {
    let base = lp
        .variable(var)
        .map(|v| v.name.clone())
        .unwrap_or_else(|| format!("x{}", var.index()));
    let over = lp.add_non_negative(format!("{base}_over"), weight);
    let under = lp.add_non_negative(format!("{base}_under"), weight);
    lp.add_constraint(
        vec![(var, 1.0), (over, -1.0), (under, 1.0)],
        Relation::Equal,
        target,
    );
    AbsoluteDeviation { over, under }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deviation_constraint_shape() {
        let mut lp = LinearProgram::new();
        let x = lp.add_non_negative("food", 0.0);
        let dev = add_absolute_deviation(&mut lp, x, 100.0, 1.0);

        assert_eq!(lp.variables().len(), 3);
        assert_eq!(lp.variable(dev.over).unwrap().name, "food_over");
        assert_eq!(lp.variable(dev.under).unwrap().cost, 1.0);

        // x = 120 -> over 20, under 0
        let values = [120.0, 20.0, 0.0];
        assert!(lp.is_feasible(&values, 1e-9));
        assert_eq!(dev.value(&values), 20.0);
        assert_eq!(lp.objective_value(&values), 20.0);

        // slacks inconsistent with x
        assert!(!lp.is_feasible(&[120.0, 0.0, 0.0], 1e-9));
    }

    #[test]
    fn test_relation_tolerance() {
        assert!(Relation::LessEq.holds(1.0 + 1e-10, 1.0, 1e-9));
        assert!(!Relation::GreaterEq.holds(0.5, 1.0, 1e-9));
        assert!(Relation::Equal.holds(2.0, 2.0, 0.0));
        assert_eq!(Relation::LessEq.to_string(), "<=");
    }

    #[test]
    fn test_bounds_checked() {
        let mut lp = LinearProgram::new();
        lp.add_variable("x", 1.0, 0.0, 10.0);
        assert!(lp.is_feasible(&[5.0], 0.0));
        assert!(!lp.is_feasible(&[11.0], 0.0));
        assert!(!lp.is_feasible(&[-1.0], 0.0));
        assert!(!lp.is_feasible(&[], 0.0));
    }
}
