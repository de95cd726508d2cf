//! A thin integer-program facade over the Z3 optimizer.
//!
//! The rest of the crate only needs a small constraint vocabulary: binary and integer
//! variables, linear sums with constant coefficients, (in)equalities, indicator constraints
//! (`b ⇒ constraint`), logical OR over binary variables, a single minimization objective and
//! the optimal/infeasible/unknown outcome of a solve. Keeping this vocabulary in one place
//! means the synthesis and enumeration models read as linear programs rather than as Z3 code.

use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model, Optimize, SatResult};

/// Outcome of [`IntegerProgram::solve`].
pub enum SolveStatus<'ctx> {
    Optimal(Model<'ctx>),
    Infeasible,
    Unknown(String),
}

/// An integer program under construction.
pub struct IntegerProgram<'ctx> {
    ctx: &'ctx Context,
    optimize: Optimize<'ctx>,
}

impl<'ctx> IntegerProgram<'ctx> {
    pub fn new(ctx: &'ctx Context) -> IntegerProgram<'ctx> {
        IntegerProgram {
            ctx,
            optimize: Optimize::new(ctx),
        }
    }

    /// A new binary (0/1) variable, represented as a Boolean.
    pub fn binary(&self, name: &str) -> Bool<'ctx> {
        Bool::new_const(self.ctx, name)
    }

    /// A new unbounded integer variable.
    pub fn integer(&self, name: &str) -> Int<'ctx> {
        Int::new_const(self.ctx, name)
    }

    pub fn constant(&self, value: i64) -> Int<'ctx> {
        Int::from_i64(self.ctx, value)
    }

    pub fn truth(&self, value: bool) -> Bool<'ctx> {
        Bool::from_bool(self.ctx, value)
    }

    /// The 0/1 integer value of a binary variable.
    pub fn as_int(&self, value: &Bool<'ctx>) -> Int<'ctx> {
        value.ite(&self.constant(1), &self.constant(0))
    }

    /// The sum of `terms`, or the constant `0` for an empty slice.
    pub fn sum(&self, terms: &[Int<'ctx>]) -> Int<'ctx> {
        if terms.is_empty() {
            return self.constant(0);
        }
        let refs = terms.iter().collect::<Vec<_>>();
        Int::add(self.ctx, &refs)
    }

    /// The linear combination `Σ coefficient · term`. Zero coefficients are skipped.
    pub fn weighted_sum(&self, terms: &[(i64, Int<'ctx>)]) -> Int<'ctx> {
        let products = terms
            .iter()
            .filter(|(coefficient, _)| *coefficient != 0)
            .map(|(coefficient, term)| {
                if *coefficient == 1 {
                    term.clone()
                } else {
                    Int::mul(self.ctx, &[&self.constant(*coefficient), term])
                }
            })
            .collect::<Vec<_>>();
        self.sum(&products)
    }

    /// Logical OR of `terms`; `false` for an empty slice.
    pub fn or(&self, terms: &[Bool<'ctx>]) -> Bool<'ctx> {
        let refs = terms.iter().collect::<Vec<_>>();
        Bool::or(self.ctx, &refs)
    }

    /// Logical AND of `terms`; `true` for an empty slice.
    pub fn and(&self, terms: &[Bool<'ctx>]) -> Bool<'ctx> {
        let refs = terms.iter().collect::<Vec<_>>();
        Bool::and(self.ctx, &refs)
    }

    pub fn eq(&self, left: &Int<'ctx>, right: &Int<'ctx>) -> Bool<'ctx> {
        left._eq(right)
    }

    /// Add a hard constraint.
    pub fn require(&self, constraint: &Bool<'ctx>) {
        self.optimize.assert(constraint);
    }

    /// Add an indicator constraint: whenever `indicator` holds, so does `constraint`.
    pub fn indicator(&self, indicator: &Bool<'ctx>, constraint: &Bool<'ctx>) {
        self.optimize.assert(&indicator.implies(constraint));
    }

    pub fn minimize(&self, objective: &Int<'ctx>) {
        self.optimize.minimize(objective);
    }

    pub fn solve(&self) -> SolveStatus<'ctx> {
        match self.optimize.check(&[]) {
            SatResult::Sat => match self.optimize.get_model() {
                Some(model) => SolveStatus::Optimal(model),
                None => SolveStatus::Unknown("no model available".to_string()),
            },
            SatResult::Unsat => SolveStatus::Infeasible,
            SatResult::Unknown => SolveStatus::Unknown("solver returned unknown".to_string()),
        }
    }
}

/// Read the value of an integer term from a model (unassigned terms default to `0`).
pub fn model_int(model: &Model<'_>, term: &Int<'_>) -> i64 {
    model
        .eval(term, true)
        .and_then(|it| it.as_i64())
        .unwrap_or(0)
}

/// Read the value of a binary term from a model (unassigned terms default to `false`).
pub fn model_bool(model: &Model<'_>, term: &Bool<'_>) -> bool {
    model
        .eval(term, true)
        .and_then(|it| it.as_bool())
        .unwrap_or(false)
}
