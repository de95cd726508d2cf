//! The network graph model: an arena of variables addressed by integer ids, partitioned into
//! four ordered blocks.
//!
//! Variables are never referenced through pointers. Update functions are BDDs over the
//! network's [`FunctionContext`] (one BDD variable per declared variable, in declaration
//! order), and every relation (parents, successors) is derived from their support sets and
//! re-resolved through the name-to-id table, because [`Network::reduce`] reclassifies
//! variables and reassigns ids.
//!
//! After every reduction pass the ids are contiguous and ordered as follows:
//!
//! | block                     | ids                                      |
//! |---------------------------|------------------------------------------|
//! | state                     | `0 .. state_size`                        |
//! | external                  | `state_size .. state_size + ext_size`    |
//! | external-only-dependent   | following the external block             |
//! | hole                      | following the external-only-dependent    |
//!
//! As such, "is this a state variable" is a simple range test.

mod import;
mod parser;
mod reduction;

#[cfg(test)]
mod tests;

use crate::symbolic::{ExpressionError, FunctionContext, is_valid_name};
use crate::threshold::ThresholdFunction;
use biodivine_lib_bdd::Bdd;
use biodivine_lib_bdd::boolean_expression::BooleanExpression;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Range;
use thiserror::Error;

pub use reduction::ReductionConfig;

/// The role of a variable in the (reduced) network.
///
/// The declaration order is the order of the id blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableKind {
    /// A free dynamical variable.
    State,
    /// A variable without internal drivers, acting as a constant input.
    External,
    /// A state variable without state parents that was folded into its successors.
    ExternalOnlyDependent,
    /// A state variable without state successors that was folded into its successors and
    /// still depends on some state variable.
    Hole,
}

/// A single network variable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub id: usize,
    pub name: String,
    /// The current update function. Mutated whenever a removed variable is substituted into it.
    pub function: Bdd,
    pub kind: VariableKind,
    /// Static variables are forced to be fixed in every trap space.
    pub is_static: bool,
    /// The synthesized threshold function (only for state variables, after synthesis).
    pub threshold: Option<ThresholdFunction>,
}

/// A variable as declared in a network file, before its expression is turned into a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub name: String,
    pub expression: BooleanExpression,
    pub kind: VariableKind,
}

impl VariableDeclaration {
    pub fn new(name: &str, expression: BooleanExpression, kind: VariableKind) -> Self {
        VariableDeclaration {
            name: name.to_string(),
            expression,
            kind,
        }
    }

    /// An external variable, i.e. one whose update function is its own value.
    pub fn external(name: &str) -> Self {
        let expression = BooleanExpression::Variable(name.to_string());
        VariableDeclaration::new(name, expression, VariableKind::External)
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cannot read network file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid update expression of `{name}`: {source}")]
    InvalidExpression {
        name: String,
        #[source]
        source: ExpressionError,
    },
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),
    #[error("`{0}` is not a valid variable name")]
    InvalidName(String),
    #[error("cannot declare variables: {0}")]
    Variables(#[source] ExpressionError),
    #[error("variable `{0}` is used but never declared")]
    UndeclaredVariable(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{0}` has an unsupported update function: {1}")]
    Unsupported(String, String),
    #[error("network has no variables")]
    Empty,
}

/// A Boolean network with a fixed partition of its variables into the four blocks
/// described in the module documentation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Network {
    context: FunctionContext,
    variables: Vec<Variable>,
    name_to_id: HashMap<String, usize>,
}

impl Network {
    /// Build a network from variable declarations. The order of the variables within each block
    /// is preserved, and ids are assigned accordingly.
    pub fn from_declarations(
        declarations: Vec<VariableDeclaration>,
    ) -> Result<Network, NetworkError> {
        if declarations.is_empty() {
            return Err(NetworkError::Empty);
        }
        let mut names = HashSet::new();
        for declaration in &declarations {
            if !is_valid_name(&declaration.name) {
                return Err(NetworkError::InvalidName(declaration.name.clone()));
            }
            if !names.insert(declaration.name.as_str()) {
                return Err(NetworkError::DuplicateVariable(declaration.name.clone()));
            }
        }
        let ordered = declarations
            .iter()
            .map(|it| it.name.as_str())
            .collect::<Vec<_>>();
        let context = FunctionContext::new(&ordered).map_err(NetworkError::Variables)?;

        let mut variables = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let function = context
                .eval(&declaration.expression)
                .map_err(|source| match source {
                    ExpressionError::UnknownVariable(name) => NetworkError::UndeclaredVariable(name),
                    source => NetworkError::InvalidExpression {
                        name: declaration.name.clone(),
                        source,
                    },
                })?;
            variables.push(Variable {
                id: 0,
                name: declaration.name,
                function,
                kind: declaration.kind,
                is_static: false,
                threshold: None,
            });
        }
        let mut network = Network {
            context,
            variables,
            name_to_id: HashMap::new(),
        };
        network.reassign_ids();
        Ok(network)
    }

    /// Sort variables into their blocks (keeping the relative order within each block) and
    /// recompute all ids.
    pub(crate) fn reassign_ids(&mut self) {
        self.variables.sort_by_key(|it| it.kind);
        self.name_to_id.clear();
        for (id, var) in self.variables.iter_mut().enumerate() {
            var.id = id;
            self.name_to_id.insert(var.name.clone(), id);
        }
    }

    /// Total number of variables (all four blocks).
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn block_size(&self, kind: VariableKind) -> usize {
        self.variables.iter().filter(|it| it.kind == kind).count()
    }

    fn block(&self, kind: VariableKind) -> Range<usize> {
        let start = self.variables.iter().take_while(|it| it.kind < kind).count();
        start..(start + self.block_size(kind))
    }

    pub fn state_size(&self) -> usize {
        self.block_size(VariableKind::State)
    }

    pub fn external_size(&self) -> usize {
        self.block_size(VariableKind::External)
    }

    /// Ids of the state variables.
    pub fn state_ids(&self) -> Range<usize> {
        self.block(VariableKind::State)
    }

    /// Ids of the external variables.
    pub fn external_ids(&self) -> Range<usize> {
        self.block(VariableKind::External)
    }

    /// Ids of the variables removed by the reduction (external-only-dependent, then holes).
    pub fn removed_ids(&self) -> Range<usize> {
        self.block(VariableKind::ExternalOnlyDependent).start..self.variables.len()
    }

    pub fn is_state(&self, id: usize) -> bool {
        self.state_ids().contains(&id)
    }

    pub fn is_external(&self, id: usize) -> bool {
        self.external_ids().contains(&id)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: usize) -> &Variable {
        &self.variables[id]
    }

    pub(crate) fn variable_mut(&mut self, id: usize) -> &mut Variable {
        &mut self.variables[id]
    }

    pub fn find_variable(&self, name: &str) -> Option<&Variable> {
        self.name_to_id.get(name).map(|id| &self.variables[*id])
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    pub fn name_of(&self, id: usize) -> &str {
        self.variables[id].name.as_str()
    }

    pub fn name_to_id(&self) -> &HashMap<String, usize> {
        &self.name_to_id
    }

    /// Names of all variables of the given kind, in id order.
    pub fn names_of_kind(&self, kind: VariableKind) -> Vec<String> {
        self.variables
            .iter()
            .filter(|it| it.kind == kind)
            .map(|it| it.name.clone())
            .collect()
    }

    /// The BDD variables of the update functions.
    pub fn context(&self) -> &FunctionContext {
        &self.context
    }

    /// Names of the variables the update function of `id` depends on.
    pub fn parent_names(&self, id: usize) -> BTreeSet<String> {
        self.context.parents(&self.variables[id].function)
    }

    /// Ids of the variables the update function of `id` depends on.
    pub fn parent_ids(&self, id: usize) -> Vec<usize> {
        self.parent_names(id)
            .iter()
            .filter_map(|it| self.id_of(it))
            .collect()
    }

    /// Names of the variables whose update function depends on `name`.
    pub fn successors(&self, name: &str) -> Vec<String> {
        self.variables
            .iter()
            .filter(|it| self.context.depends_on(&it.function, name))
            .map(|it| it.name.clone())
            .collect()
    }

    /// Evaluate the update function of `id` in a state given as values indexed by id.
    /// Entries missing from `state` are `false`.
    pub fn evaluate(&self, id: usize, state: &[bool]) -> bool {
        let value = |name: &str| {
            self.id_of(name)
                .map(|it| state.get(it).copied().unwrap_or(false))
        };
        // Every context variable is a network variable, so no parent is ever missing.
        self.context
            .evaluate(&self.variables[id].function, value)
            .unwrap_or(false)
    }

    /// Mark a variable as static, i.e. forced to be fixed in every trap space.
    pub fn set_static(&mut self, name: &str) -> Result<(), NetworkError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))?;
        self.variables[id].is_static = true;
        Ok(())
    }

    /// Replace `name` with `replacement` in the update functions of every other variable.
    pub(crate) fn substitute_everywhere(&mut self, name: &str, replacement: &Bdd) {
        for var in self.variables.iter_mut() {
            if var.name != name && self.context.depends_on(&var.function, name) {
                var.function = self.context.substitute(&var.function, name, replacement);
            }
        }
    }

    /// Write the network in the `name*=expression` text format, in declaration order.
    pub fn to_text(&self) -> String {
        let mut result = String::new();
        for name in self.context.names() {
            if let Some(var) = self.find_variable(name) {
                let expression = self.context.render(&var.function, "~");
                result.push_str(&format!("{}*={}\n", var.name, expression));
            }
        }
        result
    }
}
