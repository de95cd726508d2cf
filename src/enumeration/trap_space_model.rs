use crate::enumeration::{EnumerationConfig, TrapSpaceCandidate};
use crate::ilp::{IntegerProgram, SolveStatus, model_bool};
use log::trace;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use z3::ast::{Ast, Bool};
use z3::{Config, Context, Model};

thread_local! {
    /// Models of the enumeration outlive a single step, so they need a context that lives
    /// as long as the thread. It is created once per thread.
    static SOLVER_CONTEXT: &'static Context = Box::leak(Box::new(Context::new(&Config::new())));
}

fn solver_context() -> &'static Context {
    SOLVER_CONTEXT.with(|it| *it)
}

/// The integer program of the current fixed-set size, kept between enumeration steps.
///
/// The cache is derived from the size and the exclusion cuts of the enumeration state and
/// is therefore not serialized: a cloned or deserialized state starts with an empty cache
/// and rebuilds the program on its next step. Equality ignores the cache.
#[derive(Default)]
pub struct ModelCache {
    model: Option<TrapSpaceModel<'static>>,
    builds: usize,
}

impl Clone for ModelCache {
    fn clone(&self) -> Self {
        ModelCache::default()
    }
}

impl PartialEq for ModelCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ModelCache {}

impl Debug for ModelCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("size", &self.model.as_ref().map(|it| it.size))
            .field("builds", &self.builds)
            .finish()
    }
}

impl ModelCache {
    /// How many programs were built so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Drop the program, e.g. because the size changed.
    pub fn clear(&mut self) {
        self.model = None;
    }

    /// The program of `size` with every cut of `exclusions`. An existing program of the same
    /// size only receives the cuts it has not seen yet.
    pub(crate) fn prepare(
        &mut self,
        context: &EnumerationConfig,
        size: usize,
        exclusions: &[BTreeMap<usize, bool>],
    ) -> &TrapSpaceModel<'static> {
        let reusable = self
            .model
            .as_ref()
            .is_some_and(|it| it.size == size && it.cuts <= exclusions.len());
        if !reusable {
            trace!("[size:{size}] Building the integer program.");
            self.builds += 1;
        }
        let model = match self.model.take() {
            Some(model) if reusable => model,
            _ => TrapSpaceModel::build(solver_context(), context, size),
        };
        let model = self.model.insert(model);
        let full = size == context.state_size();
        for exclusion in &exclusions[model.cuts..] {
            model.exclude(exclusion, full);
        }
        model.cuts = exclusions.len();
        model
    }
}

/// The integer program describing trap spaces with exactly `size` fixed state variables.
pub(crate) struct TrapSpaceModel<'ctx> {
    size: usize,
    /// Number of exclusion cuts added to the program.
    cuts: usize,
    program: IntegerProgram<'ctx>,
    values: Vec<Bool<'ctx>>,
    fixed: Vec<Bool<'ctx>>,
    externals: Vec<Bool<'ctx>>,
}

impl<'ctx> TrapSpaceModel<'ctx> {
    fn build(ctx: &'ctx Context, context: &EnumerationConfig, size: usize) -> TrapSpaceModel<'ctx> {
        let program = IntegerProgram::new(ctx);
        let state_size = context.state_size();
        let network = &context.network;
        let values = (0..state_size)
            .map(|i| program.binary(&format!("value_{i}")))
            .collect::<Vec<_>>();
        let fixed = (0..state_size)
            .map(|i| program.binary(&format!("fixed_{i}")))
            .collect::<Vec<_>>();
        let externals = network
            .external_ids()
            .map(|i| program.binary(&format!("external_{i}")))
            .collect::<Vec<_>>();

        for (s, function) in context.functions.iter().enumerate() {
            // Effective parent values in the least and the most favourable state of the
            // subspace. A fixed parent always contributes its value.
            let mut min_terms = Vec::new();
            let mut max_terms = Vec::new();
            for (p, weight) in function.parents() {
                if p < state_size {
                    let min_target = weight < 0 || p == s;
                    let max_target = weight > 0 && p != s;
                    let value = program.as_int(&values[p]);
                    let x_min = fixed[p].ite(&value, &program.constant(i64::from(min_target)));
                    let x_max = fixed[p].ite(&value, &program.constant(i64::from(max_target)));
                    min_terms.push((weight, x_min));
                    max_terms.push((weight, x_max));
                } else if network.is_external(p) {
                    let value = program.as_int(&externals[p - state_size]);
                    min_terms.push((weight, value.clone()));
                    max_terms.push((weight, value));
                } else {
                    trace!("Ignoring removed variable {p} in the function of {s}.");
                }
            }
            let y_min = program.weighted_sum(&min_terms);
            let y_max = program.weighted_sum(&max_terms);
            let threshold = program.constant(function.threshold);
            let below = program.constant(function.threshold - 1);

            let over = program.binary(&format!("over_{s}"));
            let under = program.binary(&format!("under_{s}"));
            program.require(&over._eq(&y_min.ge(&threshold)));
            program.require(&under._eq(&y_max.le(&below)));
            program.require(&program.and(&[over.clone(), under.clone()]).not());
            program.require(&fixed[s]._eq(&program.or(&[over.clone(), under])));
            program.require(&values[s]._eq(&over));

            if network.variable(s).is_static {
                program.require(&fixed[s]);
            }
        }

        let fixed_count = fixed.iter().map(|it| program.as_int(it)).collect::<Vec<_>>();
        program.require(&program.eq(
            &program.sum(&fixed_count),
            &program.constant(i64::try_from(size).unwrap_or(i64::MAX)),
        ));

        TrapSpaceModel {
            size,
            cuts: 0,
            program,
            values,
            fixed,
            externals,
        }
    }

    /// Exclude a known trap space. With `full == true`, at least one stable value must differ.
    /// Otherwise, a different set of fixed variables also suffices.
    fn exclude(&self, stable: &BTreeMap<usize, bool>, full: bool) {
        let mut differs = stable
            .iter()
            .map(|(i, value)| {
                if *value {
                    self.values[*i].not()
                } else {
                    self.values[*i].clone()
                }
            })
            .collect::<Vec<_>>();
        if !full {
            for (i, fixed) in self.fixed.iter().enumerate() {
                if stable.contains_key(&i) {
                    differs.push(fixed.not());
                } else {
                    differs.push(fixed.clone());
                }
            }
        }
        self.program.require(&self.program.or(&differs));
    }

    pub(crate) fn solve(&self) -> SolveStatus<'ctx> {
        self.program.solve()
    }

    pub(crate) fn extract(&self, model: &Model<'ctx>) -> TrapSpaceCandidate {
        let stable = self
            .fixed
            .iter()
            .enumerate()
            .filter(|(_, fixed)| model_bool(model, fixed))
            .map(|(i, _)| (i, model_bool(model, &self.values[i])))
            .collect();
        let externals = self
            .externals
            .iter()
            .map(|it| Some(model_bool(model, it)))
            .collect();
        TrapSpaceCandidate { stable, externals }
    }
}
