use crate::network::{Network, NetworkError, VariableDeclaration, VariableKind};
use biodivine_lib_bdd::boolean_expression::BooleanExpression;
use biodivine_lib_param_bn::{BinaryOp, BooleanNetwork, FnUpdate};

impl TryFrom<&BooleanNetwork> for Network {
    type Error = NetworkError;

    /// Convert a fully specified [`BooleanNetwork`] (e.g. loaded from `.aeon` or `.bnet`).
    ///
    /// Variables without an update function and without regulators are inputs and become
    /// external, as do variables whose update function is their own value. Parameters are
    /// not supported.
    fn try_from(bn: &BooleanNetwork) -> Result<Self, Self::Error> {
        let mut declarations = Vec::new();
        for var in bn.variables() {
            let name = bn.get_variable_name(var);
            let declaration = match bn.get_update_function(var) {
                None if bn.as_graph().regulators(var).is_empty() => {
                    VariableDeclaration::external(name)
                }
                None => {
                    return Err(NetworkError::Unsupported(
                        name.clone(),
                        "implicit update function".to_string(),
                    ));
                }
                Some(FnUpdate::Var(id)) if *id == var => VariableDeclaration::external(name),
                Some(update) => {
                    let expression = convert(bn, name, update)?;
                    VariableDeclaration::new(name, expression, VariableKind::State)
                }
            };
            declarations.push(declaration);
        }
        Network::from_declarations(declarations)
    }
}

fn convert(
    bn: &BooleanNetwork,
    name: &str,
    update: &FnUpdate,
) -> Result<BooleanExpression, NetworkError> {
    use BooleanExpression as E;
    Ok(match update {
        FnUpdate::Const(value) => E::Const(*value),
        FnUpdate::Var(id) => E::Variable(bn.get_variable_name(*id).clone()),
        FnUpdate::Param(_, _) => {
            return Err(NetworkError::Unsupported(
                name.to_string(),
                "uninterpreted parameters".to_string(),
            ));
        }
        FnUpdate::Not(inner) => E::Not(Box::new(convert(bn, name, inner)?)),
        FnUpdate::Binary(op, left, right) => {
            let left = Box::new(convert(bn, name, left)?);
            let right = Box::new(convert(bn, name, right)?);
            match op {
                BinaryOp::And => E::And(left, right),
                BinaryOp::Or => E::Or(left, right),
                BinaryOp::Xor => E::Xor(left, right),
                BinaryOp::Imp => E::Imp(left, right),
                BinaryOp::Iff => E::Iff(left, right),
            }
        }
    })
}
