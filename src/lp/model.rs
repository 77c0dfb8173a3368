//! Linear 0/1 model definition.

use std::fmt;

/// Index of a boolean variable within a [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Relation between a linear expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `Σ aᵢxᵢ ≤ b`
    LessEq,
    /// `Σ aᵢxᵢ ≥ b`
    GreaterEq,
    /// `Σ aᵢxᵢ = b`
    Equal,
}

/// A linear constraint over boolean variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(variable, coefficient)` pairs.
    pub terms: Vec<(VarId, i64)>,
    /// Relation.
    pub comparison: Comparison,
    /// Right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    /// Creates a constraint.
    pub fn new(terms: Vec<(VarId, i64)>, comparison: Comparison, rhs: i64) -> Self {
        Self {
            terms,
            comparison,
            rhs,
        }
    }

    /// Evaluates the left-hand side under an assignment.
    pub fn activity(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.index()])
            .map(|(_, coef)| coef)
            .sum()
    }

    /// Whether an assignment satisfies the constraint.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs = self.activity(values);
        match self.comparison {
            Comparison::LessEq => lhs <= self.rhs,
            Comparison::GreaterEq => lhs >= self.rhs,
            Comparison::Equal => lhs == self.rhs,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

/// Linear objective `Σ cᵢxᵢ`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    /// Direction.
    pub sense: Sense,
    /// `(variable, coefficient)` pairs. A variable may appear more than once.
    pub terms: Vec<(VarId, i64)>,
}

impl Objective {
    /// Evaluates the objective under an assignment.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.index()])
            .map(|(_, coef)| coef)
            .sum()
    }
}

/// A 0/1 linear model.
///
/// # Examples
///
/// ```
/// use u_timetable::lp::{LinearModel, Sense};
///
/// let mut model = LinearModel::new("pick-one");
/// let a = model.add_var("a");
/// let b = model.add_var("b");
/// model.add_exactly_one(&[a, b]);
/// model.add_objective_term(a, 5);
/// model.add_objective_term(b, 3);
/// assert_eq!(model.objective.sense, Sense::Minimize);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearModel {
    /// Model name.
    pub name: String,
    /// Variable names, indexed by [`VarId`].
    pub var_names: Vec<String>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective.
    pub objective: Objective,
}

impl LinearModel {
    /// Creates an empty minimization model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a boolean variable.
    pub fn add_var(&mut self, name: impl Into<String>) -> VarId {
        self.var_names.push(name.into());
        VarId(self.var_names.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: exactly one of `vars` is true.
    pub fn add_exactly_one(&mut self, vars: &[VarId]) {
        self.add_constraint(LinearConstraint::new(
            vars.iter().map(|&v| (v, 1)).collect(),
            Comparison::Equal,
            1,
        ));
    }

    /// Convenience: at most one of `vars` is true.
    pub fn add_at_most_one(&mut self, vars: &[VarId]) {
        self.add_constraint(LinearConstraint::new(
            vars.iter().map(|&v| (v, 1)).collect(),
            Comparison::LessEq,
            1,
        ));
    }

    /// Convenience: `indicator ≥ a + b − 1`, i.e. forced true when both are.
    pub fn add_both_implies(&mut self, a: VarId, b: VarId, indicator: VarId) {
        self.add_constraint(LinearConstraint::new(
            vec![(a, 1), (b, 1), (indicator, -1)],
            Comparison::LessEq,
            1,
        ));
    }

    /// Convenience: `indicator ≤ a` and `indicator ≤ b`, i.e. true only if both are.
    pub fn add_only_if_both(&mut self, a: VarId, b: VarId, indicator: VarId) {
        for source in [a, b] {
            self.add_constraint(LinearConstraint::new(
                vec![(indicator, 1), (source, -1)],
                Comparison::LessEq,
                0,
            ));
        }
    }

    /// Adds `coef · var` to the objective.
    pub fn add_objective_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.objective.terms.push((var, coef));
        }
    }

    /// Sets the optimization direction.
    pub fn set_sense(&mut self, sense: Sense) {
        self.objective.sense = sense;
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.var_names.len();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some((var, _)) = constraint.terms.iter().find(|(v, _)| v.index() >= n) {
                return Err(format!("constraint {i}: undefined variable {var}"));
            }
        }
        if let Some((var, _)) = self.objective.terms.iter().find(|(v, _)| v.index() >= n) {
            return Err(format!("objective: undefined variable {var}"));
        }
        Ok(())
    }

    /// Whether an assignment satisfies every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.var_names.len()
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
