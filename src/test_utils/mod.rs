use crate::network::{Network, ReductionConfig, VariableKind};
use crate::threshold::{SynthesisConfig, synthesize_network};
use biodivine_lib_param_bn::biodivine_std::traits::Set;
use biodivine_lib_param_bn::symbolic_async_graph::SymbolicAsyncGraph;
use biodivine_lib_param_bn::{BooleanNetwork, VariableId};
use std::collections::{BTreeMap, HashMap};

/// Trace-level logging of this crate in tests (other crates only warn). `RUST_LOG` still
/// applies on top. Repeated calls are no-ops.
pub fn init_logger() {
    let this_crate = module_path!().split("::").next().unwrap_or_default();
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module(this_crate, log::LevelFilter::Trace)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// Load a network from text, reduce it with the given configuration and synthesize its
/// threshold functions.
pub fn prepare_network(text: &str, reduction: &ReductionConfig) -> Network {
    let mut network = Network::from_text(text).unwrap();
    network.reduce(reduction);
    synthesize_network(&mut network, &SynthesisConfig::default()).unwrap();
    network
}

/// Convert the state and external blocks of a network into an AEON model.
///
/// External variables get the identity update function. Regulations are declared as `-?` and
/// fixed afterward by [`BooleanNetwork::infer_valid_graph`].
pub fn to_aeon(network: &Network) -> String {
    let mut lines = Vec::new();
    for var in network.variables() {
        match var.kind {
            VariableKind::State => {
                let parents = network.parent_names(var.id);
                if parents.is_empty() {
                    lines.push(format!("{} -? {}", var.name, var.name));
                }
                for parent in parents {
                    lines.push(format!("{} -? {}", parent, var.name));
                }
                let function = network.context().render(&var.function, "!");
                lines.push(format!("${}: {}", var.name, function));
            }
            VariableKind::External => {
                lines.push(format!("{} -? {}", var.name, var.name));
                lines.push(format!("${}: {}", var.name, var.name));
            }
            VariableKind::ExternalOnlyDependent | VariableKind::Hole => {}
        }
    }
    lines.join("\n")
}

pub fn to_boolean_network(network: &Network) -> BooleanNetwork {
    BooleanNetwork::try_from(to_aeon(network).as_str())
        .and_then(|it| it.infer_valid_graph())
        .unwrap()
}

/// Checks trap spaces of a [`Network`] using the symbolic asynchronous graph of its AEON
/// counterpart.
pub struct TrapSpaceOracle<'a> {
    network: &'a Network,
    graph: SymbolicAsyncGraph,
    ids: HashMap<String, VariableId>,
}

impl<'a> TrapSpaceOracle<'a> {
    pub fn new(network: &'a Network) -> TrapSpaceOracle<'a> {
        let bn = to_boolean_network(network);
        let ids = bn
            .variables()
            .map(|it| (bn.get_variable_name(it).clone(), it))
            .collect::<HashMap<_, _>>();
        let graph = SymbolicAsyncGraph::new(&bn).unwrap();
        TrapSpaceOracle {
            network,
            graph,
            ids,
        }
    }

    fn variable(&self, id: usize) -> VariableId {
        self.ids[self.network.name_of(id)]
    }

    /// Returns `true` if no fixed state variable can leave the subspace given by `stable`
    /// and the concrete entries of `externals`.
    pub fn is_trap_space(&self, stable: &BTreeMap<usize, bool>, externals: &[Option<bool>]) -> bool {
        let state_size = self.network.state_size();
        let mut values = stable
            .iter()
            .map(|(id, value)| (self.variable(*id), *value))
            .collect::<Vec<_>>();
        for (i, value) in externals.iter().enumerate() {
            if let Some(value) = value {
                values.push((self.variable(state_size + i), *value));
            }
        }
        let subspace = self.graph.mk_subspace(&values);
        stable
            .keys()
            .all(|id| self.graph.var_can_post_out(self.variable(*id), &subspace).is_empty())
    }
}

/// Explicitly check a trap space using the update functions: every fixed variable must keep
/// its value in every state of the subspace.
pub fn is_trap_space_explicit(
    network: &Network,
    stable: &BTreeMap<usize, bool>,
    externals: &[Option<bool>],
) -> bool {
    let state_size = network.state_size();
    let mut known = (0..network.len()).map(|_| None).collect::<Vec<Option<bool>>>();
    for (id, value) in stable {
        known[*id] = Some(*value);
    }
    for (i, value) in externals.iter().enumerate() {
        known[state_size + i] = *value;
    }
    let free = network
        .state_ids()
        .chain(network.external_ids())
        .filter(|id| known[*id].is_none())
        .collect::<Vec<_>>();
    assert!(free.len() <= 16);
    for row in 0..(1usize << free.len()) {
        let mut bits = known.iter().map(|it| it.unwrap_or(false)).collect::<Vec<_>>();
        for (i, id) in free.iter().enumerate() {
            bits[*id] = (row >> i) & 1 == 1;
        }
        for (id, value) in stable {
            if network.evaluate(*id, &bits) != *value {
                return false;
            }
        }
    }
    true
}
