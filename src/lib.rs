use cancel_this::Cancelled;
use thiserror::Error;

#[cfg(test)]
mod test_utils;

pub mod enumeration;
pub mod externals;
pub mod hierarchy;
pub mod ilp;
pub mod network;
pub mod pipeline;
pub mod reachability;
pub mod solutions;
pub mod symbolic;
pub mod threshold;

use network::NetworkError;
use solutions::StoreError;
use threshold::SynthesisError;

/// Errors that can terminate the trap space pipeline.
#[derive(Debug, Error)]
pub enum TrapSpaceError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("cannot synthesize threshold function of `{variable}`: {source}")]
    Synthesis {
        variable: String,
        #[source]
        source: SynthesisError,
    },
    #[error("state variable `{0}` has no threshold function")]
    MissingThreshold(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for TrapSpaceError {
    fn from(value: Cancelled) -> Self {
        TrapSpaceError::Cancelled(value)
    }
}

/// A utility method for printing useful metadata of a trap space.
fn log_space(fixed: usize, state_size: usize) -> String {
    format!("fixed={}; free={}", fixed, state_size.saturating_sub(fixed))
}

/// The last path segment of the name of `T`, used to label computation steps in log messages
/// (e.g. `BackwardExploration<5>`).
fn simple_type_name<T>() -> &'static str {
    std::any::type_name::<T>().split("::").last().unwrap_or("?")
}
