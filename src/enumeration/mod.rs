//! Enumeration of trap spaces by repeatedly solving an integer program.
//!
//! For each fixed-set size `k` (from the number of state variables down to zero), the
//! enumerator builds a program with a binary `value` and `fixed` variable per state variable
//! and a binary `value` per external variable. For every state variable `s` with threshold
//! function `Σ w_p·x_p ≥ T`, the program computes the weighted sum in the least favourable
//! state of the candidate subspace (`y_min`; unfixed parents with negative weight, and `s`
//! itself, take `1`) and in the most favourable one (`y_max`; unfixed parents with positive
//! weight other than `s` take `1`). Then:
//!
//! ```text
//! over_s  ⇔ y_min ≥ T          under_s ⇔ y_max ≤ T - 1
//! over_s + under_s ≤ 1         fixed_s = over_s ∨ under_s       value_s = over_s
//! Σ fixed = k                  fixed_s = 1 for static variables
//! ```
//!
//! Each solution is one trap space. Before the next solve it is excluded by a cut added to the
//! same program: for the full size, some stable value must differ; for smaller sizes, some
//! stable value or the set of fixed variables must differ. When the program of a size becomes
//! infeasible, it is dropped and the program of the next smaller size is built. If no trap
//! space is found at all, the empty trap space is reported.
//!
//! ```no_run
//! use biodivine_algo_threshold_traps::enumeration::{
//!     EnumerationConfig, EnumerationState, TrapSpaceEnumeration,
//! };
//! use biodivine_algo_threshold_traps::network::{Network, ReductionConfig};
//! use biodivine_algo_threshold_traps::threshold::{SynthesisConfig, synthesize_network};
//! use computation_process::Stateful;
//!
//! let mut network = Network::from_file("model.txt").unwrap();
//! network.reduce(&ReductionConfig::default());
//! synthesize_network(&mut network, &SynthesisConfig::default()).unwrap();
//!
//! let config = EnumerationConfig::new(network).unwrap();
//! let state = EnumerationState::from(&config);
//! for candidate in TrapSpaceEnumeration::configure(config, state) {
//!     println!("{:?}", candidate.unwrap().stable);
//! }
//! ```

mod enumeration_config;
mod enumeration_state;
mod step;
mod trap_space_model;


use cancel_this::Cancellable;
use computation_process::{Generator, Stateful};

pub use enumeration_config::EnumerationConfig;
pub use enumeration_state::EnumerationState;
pub use step::{EnumerationStep, TrapSpaceCandidate};
pub use trap_space_model::ModelCache;

/// Enumerate trap spaces ordered by decreasing fixed-set size.
pub type TrapSpaceEnumeration =
    Generator<EnumerationConfig, EnumerationState, TrapSpaceCandidate, EnumerationStep>;

/// Run the whole enumeration and collect all trap spaces.
pub fn enumerate_trap_spaces(config: EnumerationConfig) -> Cancellable<Vec<TrapSpaceCandidate>> {
    let state = EnumerationState::from(&config);
    TrapSpaceEnumeration::configure(config, state).collect()
}
