use crate::network::{Network, NetworkError, VariableDeclaration, VariableKind};
use crate::symbolic::parse_expression;
use log::{debug, warn};
use std::path::Path;

impl Network {
    /// Load a network from the `name*=expression` text format.
    ///
    /// Lines without `*=` (and empty lines) are skipped with a warning. A variable whose
    /// expression, ignoring whitespace and parentheses, is exactly its own name is external.
    pub fn from_text(text: &str) -> Result<Network, NetworkError> {
        let mut declarations = Vec::new();
        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, body)) = line.split_once("*=") else {
                warn!("Skipping line {}: missing `*=` in `{line}`.", line_number + 1);
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                warn!("Skipping line {}: missing variable name.", line_number + 1);
                continue;
            }
            let expression =
                parse_expression(body).map_err(|source| NetworkError::InvalidExpression {
                    name: name.to_string(),
                    source,
                })?;
            let kind = if is_self_assignment(name, body) {
                VariableKind::External
            } else {
                VariableKind::State
            };
            declarations.push(VariableDeclaration::new(name, expression, kind));
        }
        let network = Network::from_declarations(declarations)?;
        debug!(
            "Loaded network with {} variables ({} external).",
            network.len(),
            network.external_size()
        );
        Ok(network)
    }

    /// Load a network from a file in the `name*=expression` text format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Network, NetworkError> {
        let text = std::fs::read_to_string(path)?;
        Network::from_text(&text)
    }
}

fn is_self_assignment(name: &str, body: &str) -> bool {
    let stripped = body
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect::<String>();
    stripped == name
}
