//! Update functions as binary decision diagrams.
//!
//! A network keeps one [`FunctionContext`] with a BDD variable per declared variable (in
//! declaration order) and represents every update function as a [`Bdd`] in this context.
//! Equivalent functions are therefore equal, the parents of a function are exactly the
//! variables of its support set, and folding a removed variable into its successors is a
//! [`Bdd::substitute`].
//!
//! Expressions use the `biodivine_lib_bdd` syntax (`!`, `&`, `|`, `^`, `=>`, `<=>`, `true`,
//! `false`), with `~` accepted in place of `!`.


use biodivine_lib_bdd::boolean_expression::BooleanExpression;
use biodivine_lib_bdd::{Bdd, BddValuation, BddVariable, BddVariableSet};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// Characters with a meaning in the expression syntax.
const RESERVED: [char; 12] = ['!', '~', '&', '|', '^', '=', '<', '>', '(', ')', '?', ':'];

/// One BDD variable is reserved for the proxy of [`Bdd::substitute`].
const MAX_VARIABLES: usize = (u16::MAX - 2) as usize;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("malformed expression: {0}")]
    Malformed(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("`{0}` is not a valid variable name")]
    InvalidName(String),
    #[error("variable `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("at most {0} variables are supported")]
    TooManyVariables(usize),
}

/// Parse a Boolean expression over named variables.
pub fn parse_expression(text: &str) -> Result<BooleanExpression, ExpressionError> {
    BooleanExpression::try_from(text.replace('~', "!").as_str()).map_err(ExpressionError::Malformed)
}

/// Returns `true` if `name` can be used as a variable in an expression.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "true"
        && name != "false"
        && !name
            .chars()
            .any(|c| c.is_whitespace() || RESERVED.contains(&c))
}

/// The BDD variables of one network, used to build, inspect and render its update functions.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionContext {
    variables: BddVariableSet,
}

impl PartialEq for FunctionContext {
    fn eq(&self, other: &Self) -> bool {
        self.variables.variable_names_ref() == other.variables.variable_names_ref()
    }
}

impl Eq for FunctionContext {}

impl FunctionContext {
    pub fn new(names: &[&str]) -> Result<FunctionContext, ExpressionError> {
        if names.len() > MAX_VARIABLES {
            return Err(ExpressionError::TooManyVariables(MAX_VARIABLES));
        }
        let mut seen = HashSet::new();
        for name in names {
            if !is_valid_name(name) {
                return Err(ExpressionError::InvalidName(name.to_string()));
            }
            if !seen.insert(*name) {
                return Err(ExpressionError::DuplicateName(name.to_string()));
            }
        }
        Ok(FunctionContext {
            variables: BddVariableSet::new(names),
        })
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> &[String] {
        self.variables.variable_names_ref()
    }

    pub fn len(&self) -> usize {
        usize::from(self.variables.num_vars())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, name: &str) -> Result<BddVariable, ExpressionError> {
        self.variables
            .var_by_name(name)
            .ok_or_else(|| ExpressionError::UnknownVariable(name.to_string()))
    }

    pub fn mk_const(&self, value: bool) -> Bdd {
        if value {
            self.variables.mk_true()
        } else {
            self.variables.mk_false()
        }
    }

    pub fn mk_var(&self, name: &str) -> Result<Bdd, ExpressionError> {
        Ok(self.variables.mk_var(self.find(name)?))
    }

    /// Build the function of a parsed expression. All its variables must be declared.
    pub fn eval(&self, expression: &BooleanExpression) -> Result<Bdd, ExpressionError> {
        let unknown = expression
            .support_set()
            .into_iter()
            .filter(|it| self.variables.var_by_name(it).is_none())
            .min();
        if let Some(name) = unknown {
            return Err(ExpressionError::UnknownVariable(name));
        }
        self.variables
            .safe_eval_expression(expression)
            .ok_or_else(|| ExpressionError::Malformed(expression.to_string()))
    }

    /// Parse and build a function in one step.
    pub fn parse(&self, text: &str) -> Result<Bdd, ExpressionError> {
        self.eval(&parse_expression(text)?)
    }

    /// Names of the variables `function` depends on.
    pub fn parents(&self, function: &Bdd) -> BTreeSet<String> {
        function
            .support_set()
            .into_iter()
            .map(|it| self.variables.name_of(it))
            .collect()
    }

    pub fn depends_on(&self, function: &Bdd, name: &str) -> bool {
        self.variables
            .var_by_name(name)
            .is_some_and(|it| function.support_set_contains(&it))
    }

    /// Replace every occurrence of `name` in `function` with `replacement`.
    pub fn substitute(&self, function: &Bdd, name: &str, replacement: &Bdd) -> Bdd {
        match self.variables.var_by_name(name) {
            Some(var) => function.substitute(var, replacement),
            None => function.clone(),
        }
    }

    /// Fix the variables in `values`; names that are not declared are ignored.
    pub fn restrict(&self, function: &Bdd, values: &HashMap<String, bool>) -> Bdd {
        let assignment = values
            .iter()
            .filter_map(|(name, value)| self.variables.var_by_name(name).map(|it| (it, *value)))
            .collect::<Vec<_>>();
        function.restrict(&assignment)
    }

    /// Evaluate `function` with parent values provided by `value`.
    ///
    /// Fails on the first (by declaration order) parent without a value.
    pub fn evaluate<F>(&self, function: &Bdd, value: F) -> Result<bool, ExpressionError>
    where
        F: Fn(&str) -> Option<bool>,
    {
        let mut support = function.support_set().into_iter().collect::<Vec<_>>();
        support.sort();
        let mut valuation = BddValuation::all_false(self.variables.num_vars());
        for var in support {
            let name = self.variables.name_of_str(var);
            let value =
                value(name).ok_or_else(|| ExpressionError::UnknownVariable(name.to_string()))?;
            valuation.set_value(var, value);
        }
        Ok(function.eval_in(&valuation))
    }

    /// Render `function` as a disjunctive normal form, using `not` as the negation operator.
    pub fn render(&self, function: &Bdd, not: &str) -> String {
        if let Some(value) = function.as_bool() {
            return value.to_string();
        }
        let clauses = function.to_optimized_dnf();
        clauses
            .iter()
            .map(|clause| {
                let literals = clause
                    .to_values()
                    .into_iter()
                    .map(|(var, value)| {
                        let name = self.variables.name_of_str(var);
                        if value {
                            name.to_string()
                        } else {
                            format!("{not}{name}")
                        }
                    })
                    .collect::<Vec<_>>();
                if literals.len() > 1 && clauses.len() > 1 {
                    format!("({})", literals.join(" & "))
                } else {
                    literals.join(" & ")
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
