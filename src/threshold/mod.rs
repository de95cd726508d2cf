//! Synthesis of linear threshold functions from Boolean update functions.
//!
//! For a function over `k` inputs, the synthesizer samples the full truth table
//! (`2^k` rows) and solves an integer program with one integer weight `w_i` and one
//! absolute-value variable `a_i ≥ |w_i|` per input and a single integer threshold `T`:
//!
//! ```text
//! minimize Σ a_i
//! subject to  Σ w_i·x_i ≥ T       for every row where the function is true
//!             Σ w_i·x_i ≤ T - 1   for every row where the function is false
//! ```
//!
//! Functions that are not linearly separable (e.g. XOR) have no solution. This is reported
//! as [`SynthesisError::NotThresholdRealizable`] and callers reject such networks.

mod threshold_function;


use crate::TrapSpaceError;
use crate::ilp::{IntegerProgram, SolveStatus, model_int};
use crate::network::Network;
use crate::symbolic::{ExpressionError, FunctionContext};
use biodivine_lib_bdd::Bdd;
use cancel_this::{Cancelled, is_cancelled};
use log::{info, trace};
use std::collections::HashMap;
use thiserror::Error;
use z3::{Config, Context};

pub use threshold_function::ThresholdFunction;

/// A "flat" configuration object for threshold synthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynthesisConfig {
    /// Refuse to sample truth tables of functions with more inputs (default: `20`).
    pub max_inputs: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig::new()
    }
}

impl SynthesisConfig {
    pub fn new() -> SynthesisConfig {
        SynthesisConfig { max_inputs: 20 }
    }
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("cannot evaluate truth table: {0}")]
    Expression(#[from] ExpressionError),
    #[error("function is not realizable as a linear threshold function")]
    NotThresholdRealizable,
    #[error("solver failed: {0}")]
    SolverUnknown(String),
    #[error("function has {inputs} inputs (at most {max} supported)")]
    TooManyInputs { inputs: usize, max: usize },
    #[error("{0}")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for SynthesisError {
    fn from(value: Cancelled) -> Self {
        SynthesisError::Cancelled(value)
    }
}

/// Compute the truth table of `function` over its parents.
///
/// Returns the input ids (sorted) and one output value per row, where row `r` assigns
/// `(r >> i) & 1` to the `i`-th input.
pub fn truth_table(
    context: &FunctionContext,
    function: &Bdd,
    name_to_id: &HashMap<String, usize>,
) -> Result<(Vec<usize>, Vec<bool>), SynthesisError> {
    let mut inputs = Vec::new();
    for name in context.parents(function) {
        let id = name_to_id
            .get(&name)
            .copied()
            .ok_or(ExpressionError::UnknownVariable(name))?;
        inputs.push(id);
    }
    inputs.sort();

    let mut outputs = Vec::with_capacity(1 << inputs.len());
    for row in 0..(1usize << inputs.len()) {
        is_cancelled!()?;
        let value = |name: &str| {
            let id = name_to_id.get(name)?;
            let position = inputs.binary_search(id).ok()?;
            Some((row >> position) & 1 == 1)
        };
        outputs.push(context.evaluate(function, value)?);
    }
    Ok((inputs, outputs))
}

/// Find a minimum-weight threshold function realizing `function`.
pub fn synthesize(
    ctx: &Context,
    context: &FunctionContext,
    function: &Bdd,
    name_to_id: &HashMap<String, usize>,
    network_size: usize,
    config: &SynthesisConfig,
) -> Result<ThresholdFunction, SynthesisError> {
    let input_count = function.support_set().len();
    if input_count > config.max_inputs {
        return Err(SynthesisError::TooManyInputs {
            inputs: input_count,
            max: config.max_inputs,
        });
    }

    let (inputs, outputs) = truth_table(context, function, name_to_id)?;

    let program = IntegerProgram::new(ctx);
    let weights = inputs
        .iter()
        .map(|id| program.integer(&format!("w_{id}")))
        .collect::<Vec<_>>();
    let threshold = program.integer("T");
    let mut magnitudes = Vec::new();
    for (i, weight) in weights.iter().enumerate() {
        let magnitude = program.integer(&format!("abs_{i}"));
        program.require(&magnitude.ge(weight));
        program.require(&magnitude.ge(&weight.unary_minus()));
        magnitudes.push(magnitude);
    }

    let below = program.sum(&[threshold.clone(), program.constant(-1)]);
    for (row, output) in outputs.iter().enumerate() {
        is_cancelled!()?;
        let active = weights
            .iter()
            .enumerate()
            .filter(|(i, _)| (row >> i) & 1 == 1)
            .map(|(_, w)| w.clone())
            .collect::<Vec<_>>();
        let sum = program.sum(&active);
        if *output {
            program.require(&sum.ge(&threshold));
        } else {
            program.require(&sum.le(&below));
        }
    }
    program.minimize(&program.sum(&magnitudes));

    match program.solve() {
        SolveStatus::Optimal(model) => {
            let mut result = ThresholdFunction::zero(network_size);
            for (id, weight) in inputs.iter().zip(&weights) {
                result.weights[*id] = model_int(&model, weight);
            }
            result.threshold = model_int(&model, &threshold);
            Ok(result)
        }
        SolveStatus::Infeasible => Err(SynthesisError::NotThresholdRealizable),
        SolveStatus::Unknown(reason) => Err(SynthesisError::SolverUnknown(reason)),
    }
}

/// Synthesize threshold functions of all state variables of a (reduced) network.
///
/// The first failure rejects the whole network, naming the offending variable.
pub fn synthesize_network(
    network: &mut Network,
    config: &SynthesisConfig,
) -> Result<(), TrapSpaceError> {
    let ctx = Context::new(&Config::new());
    let size = network.len();
    for id in network.state_ids() {
        let name = network.name_of(id).to_string();
        let update = &network.variable(id).function;
        let ids = network.name_to_id();
        let function = synthesize(&ctx, network.context(), update, ids, size, config)
            .map_err(|source| match source {
                SynthesisError::Cancelled(cancelled) => TrapSpaceError::Cancelled(cancelled),
                source => TrapSpaceError::Synthesis {
                    variable: name.clone(),
                    source,
                },
            })?;
        trace!("Threshold function of `{name}`: {function}.");
        network.variable_mut(id).threshold = Some(function);
    }
    info!(
        "Threshold synthesis finished ({} state variables; {} non-zero weights).",
        network.state_size(),
        network
            .variables()
            .iter()
            .filter_map(|it| it.threshold.as_ref())
            .map(|it| it.parents().count())
            .sum::<usize>()
    );
    Ok(())
}

/// Collect the synthesized threshold functions of all state variables, indexed by id.
pub fn state_functions(network: &Network) -> Result<Vec<ThresholdFunction>, TrapSpaceError> {
    network
        .state_ids()
        .map(|id| {
            let variable = network.variable(id);
            variable
                .threshold
                .clone()
                .ok_or_else(|| TrapSpaceError::MissingThreshold(variable.name.clone()))
        })
        .collect()
}
