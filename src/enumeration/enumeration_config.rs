use crate::TrapSpaceError;
use crate::network::Network;
use crate::threshold::{ThresholdFunction, state_functions};

/// A "flat" configuration object for trap space enumeration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerationConfig {
    /// The reduced network. Only its state and external blocks are used.
    pub network: Network,
    /// Threshold functions of the state variables, indexed by state variable id.
    pub functions: Vec<ThresholdFunction>,
    /// The largest fixed-set size that is considered (default: all state variables).
    pub max_size: Option<usize>,
}

impl TryFrom<Network> for EnumerationConfig {
    type Error = TrapSpaceError;

    fn try_from(value: Network) -> Result<Self, Self::Error> {
        EnumerationConfig::new(value)
    }
}

impl TryFrom<&Network> for EnumerationConfig {
    type Error = TrapSpaceError;

    fn try_from(value: &Network) -> Result<Self, Self::Error> {
        EnumerationConfig::new(value.clone())
    }
}

impl EnumerationConfig {
    /// Create a new [`EnumerationConfig`] from a network with synthesized threshold functions.
    pub fn new(network: Network) -> Result<EnumerationConfig, TrapSpaceError> {
        let functions = state_functions(&network)?;
        Ok(EnumerationConfig {
            network,
            functions,
            max_size: None,
        })
    }

    pub fn state_size(&self) -> usize {
        self.functions.len()
    }

    /// The fixed-set size the enumeration starts with.
    pub fn initial_size(&self) -> usize {
        self.max_size
            .unwrap_or(self.state_size())
            .min(self.state_size())
    }
}
