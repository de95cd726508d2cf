use crate::network::{Network, NetworkError, ReductionConfig, VariableDeclaration, VariableKind};
use crate::symbolic::parse_expression;
use crate::test_utils::init_logger;
use biodivine_lib_bdd::Bdd;
use biodivine_lib_param_bn::BooleanNetwork;

fn load(text: &str) -> Network {
    Network::from_text(text).unwrap()
}

/// Build `text` as a function of the variables of `network`.
fn function(network: &Network, text: &str) -> Bdd {
    network.context().parse(text).unwrap()
}

fn from_aeon(aeon: &str) -> Result<Network, NetworkError> {
    let bn = BooleanNetwork::try_from(aeon).unwrap();
    Network::try_from(&bn)
}

#[test]
fn parse_detects_externals() {
    init_logger();
    let network = load("A*=B & ~C\nB*=( B )\nC*=A | B\n");
    assert_eq!(network.len(), 3);
    assert_eq!(network.state_size(), 2);
    assert_eq!(network.external_size(), 1);
    // State variables come first, in declaration order.
    assert_eq!(network.name_of(0), "A");
    assert_eq!(network.name_of(1), "C");
    assert_eq!(network.name_of(2), "B");
    assert!(network.is_state(1));
    assert!(network.is_external(2));
    assert_eq!(network.external_ids(), 2..3);
    assert!(network.removed_ids().is_empty());
    assert_eq!(network.parent_ids(0), vec![2, 1]);
    assert_eq!(network.successors("B"), vec!["A", "C", "B"]);
}

#[test]
fn parse_skips_malformed_lines() {
    init_logger();
    let network = load("# comment\n\nA*=B\nthis line is ignored\nB*=A\n*=A\n");
    assert_eq!(network.len(), 2);
    assert_eq!(network.state_size(), 2);
}

#[test]
fn parse_errors() {
    init_logger();
    assert!(matches!(
        Network::from_text("A*=B\nA*=~B\nB*=A\n"),
        Err(NetworkError::DuplicateVariable(name)) if name == "A"
    ));
    assert!(matches!(
        Network::from_text("A*=B & X\nB*=A\n"),
        Err(NetworkError::UndeclaredVariable(name)) if name == "X"
    ));
    assert!(matches!(
        Network::from_text("A*=B &\nB*=A\n"),
        Err(NetworkError::InvalidExpression { name, .. }) if name == "A"
    ));
    assert!(matches!(
        Network::from_text("# nothing here\n"),
        Err(NetworkError::Empty)
    ));
    assert!(matches!(
        Network::from_text("A|B*=A\nA*=A\n"),
        Err(NetworkError::InvalidName(name)) if name == "A|B"
    ));
}

#[test]
fn functions_are_canonical() {
    init_logger();
    // `S` is redundant in the update function of `A`, so it is not a parent.
    let network = load("A*=(E & S) | (E & ~S)\nE*=E\nS*=A\n");
    let a = network.id_of("A").unwrap();
    assert_eq!(network.parent_ids(a), vec![network.id_of("E").unwrap()]);
    assert_eq!(network.successors("S"), Vec::<String>::new());
    assert_eq!(network.variable(a).function, function(&network, "E"));

    let network = load("A*=(B | C) & (~B | C) & (B | ~C) & (~B | ~C)\nB*=A\nC*=A\n");
    let a = network.id_of("A").unwrap();
    assert!(network.variable(a).function.is_false());
    assert!(network.parent_names(a).is_empty());
}

#[test]
fn text_format_round_trip() {
    init_logger();
    let network = load("A*=B & ~C\nB*=B\nC*=(A | B) & ~C\n");
    let reloaded = load(&network.to_text());
    assert_eq!(network, reloaded);
}

#[test]
fn static_variables() {
    init_logger();
    let mut network = load("A*=~B\nB*=~A\n");
    network.set_static("B").unwrap();
    assert!(network.find_variable("B").unwrap().is_static);
    assert!(!network.find_variable("A").unwrap().is_static);
    assert!(matches!(
        network.set_static("C"),
        Err(NetworkError::UnknownVariable(name)) if name == "C"
    ));
}

#[test]
fn reduction_keeps_the_last_state_variable() {
    init_logger();
    let mut network = load("A*=true\nB*=A | C\nC*=B\n");
    network.reduce(&ReductionConfig::default());

    assert_eq!(network.state_size(), 1);
    assert_eq!(network.name_of(0), "C");
    assert!(network.variable(0).function.is_true());
    assert_eq!(
        network.names_of_kind(VariableKind::ExternalOnlyDependent),
        vec!["A", "B"]
    );
    assert_eq!(network.removed_ids(), 1..3);
    // Removed variables keep their (substituted) functions for restoration.
    assert!(network.variable(2).function.is_true());
}

#[test]
fn reduction_respects_shared_parents() {
    init_logger();
    // `D` and its successor `A` share the parent `E`, so `D` cannot be folded.
    let mut network = load("A*=D & E & B\nB*=A\nD*=~E\nE*=E\n");
    network.reduce(&ReductionConfig::default());
    assert_eq!(network.names_of_kind(VariableKind::State), vec!["A", "B", "D"]);

    let mut network = load("A*=D & B\nB*=A\nD*=~E\nE*=E\n");
    network.reduce(&ReductionConfig::default());
    assert_eq!(network.names_of_kind(VariableKind::State), vec!["A", "B"]);
    assert_eq!(
        network.find_variable("A").unwrap().function,
        function(&network, "~E & B")
    );
}

#[test]
fn reduction_respects_parent_budget() {
    init_logger();
    let text = "A*=D & B\nB*=A\nD*=~E\nE*=E\n";
    let mut network = load(text);
    let config = ReductionConfig {
        merge_parent_budget: 2,
        ..ReductionConfig::default()
    };
    network.reduce(&config);
    assert_eq!(network.state_size(), 3);

    let mut network = load(text);
    let config = ReductionConfig {
        merge_parent_budget: 3,
        ..ReductionConfig::default()
    };
    network.reduce(&config);
    assert_eq!(network.state_size(), 2);
}

#[test]
fn holes_are_removed_in_large_networks() {
    init_logger();
    let text = "A*=B\nB*=A\nC*=A & E\nE*=E\n";
    let mut network = load(text);
    network.reduce(&ReductionConfig::default());
    assert_eq!(network.state_size(), 3);

    let mut network = load(text);
    let config = ReductionConfig {
        hole_reduction_threshold: 0,
        ..ReductionConfig::default()
    };
    network.reduce(&config);
    assert_eq!(network.names_of_kind(VariableKind::State), vec!["A", "B"]);
    assert_eq!(network.names_of_kind(VariableKind::External), vec!["E"]);
    assert_eq!(network.names_of_kind(VariableKind::Hole), vec!["C"]);
    assert_eq!(network.id_of("C"), Some(3));
    assert_eq!(network.removed_ids(), 3..4);
}

#[test]
fn holes_with_only_state_parents_are_promoted() {
    init_logger();
    let mut network = load("A*=B\nB*=A\nC*=A & B\n");
    let config = ReductionConfig {
        hole_reduction_threshold: 0,
        ..ReductionConfig::default()
    };
    network.reduce(&config);
    assert_eq!(network.names_of_kind(VariableKind::External), vec!["C"]);
    assert!(network.is_external(network.id_of("C").unwrap()));
    assert!(network.names_of_kind(VariableKind::Hole).is_empty());
}

#[test]
fn blocks_are_contiguous() {
    init_logger();
    let mut network = load("X*=E\nA*=X & B\nB*=A\nE*=E\nH*=A & E\n");
    let config = ReductionConfig {
        hole_reduction_threshold: 0,
        ..ReductionConfig::default()
    };
    network.reduce(&config);
    let kinds = network.variables().iter().map(|it| it.kind).collect::<Vec<_>>();
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
    for (id, var) in network.variables().iter().enumerate() {
        assert_eq!(var.id, id);
        assert_eq!(network.id_of(&var.name), Some(id));
    }
}

#[test]
fn from_declarations_assigns_block_order() {
    let network = Network::from_declarations(vec![
        VariableDeclaration::external("E"),
        VariableDeclaration::new("A", parse_expression("E").unwrap(), VariableKind::State),
    ])
    .unwrap();
    assert_eq!(network.id_of("A"), Some(0));
    assert_eq!(network.id_of("E"), Some(1));
    // The function context keeps the declaration order.
    assert_eq!(network.context().names(), ["E".to_string(), "A".to_string()]);
    assert!(network.evaluate(0, &[false, true]));
    assert!(!network.evaluate(0, &[true, false]));
}

#[test]
fn import_from_aeon() {
    init_logger();
    let network = from_aeon("E -> A\nB -| A\nA -> B\n$A: E & !B\n$B: A\n").unwrap();
    assert_eq!(network.names_of_kind(VariableKind::State), vec!["A", "B"]);
    assert_eq!(network.names_of_kind(VariableKind::External), vec!["E"]);
    assert_eq!(
        network.find_variable("A").unwrap().function,
        function(&network, "E & ~B")
    );
}

#[test]
fn import_keeps_xor() {
    init_logger();
    let network = from_aeon("A -? C\nB -? C\n$C: A ^ B\n").unwrap();
    let c = network.find_variable("C").unwrap();
    assert_eq!(c.kind, VariableKind::State);
    for a in [false, true] {
        for b in [false, true] {
            let valuation = |name: &str| match name {
                "A" => Some(a),
                "B" => Some(b),
                _ => None,
            };
            assert_eq!(network.context().evaluate(&c.function, valuation), Ok(a != b));
        }
    }
}

#[test]
fn import_rejects_implicit_functions() {
    init_logger();
    assert!(matches!(
        from_aeon("A -> B\n$A: true\n"),
        Err(NetworkError::Unsupported(name, _)) if name == "B"
    ));
}
