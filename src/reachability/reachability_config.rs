/// A "flat" configuration object for the verification of candidate inclusions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachabilityConfig {
    /// The largest number of free variables that is explored explicitly (default: `23`).
    ///
    /// Larger problems are not explored and the trap space is kept.
    pub max_variables: usize,
    /// If `false`, every trap space with at least one inclusion candidate is removed without
    /// checking reachability (default: `true`).
    pub verify_inclusions: bool,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        ReachabilityConfig::new()
    }
}

impl ReachabilityConfig {
    pub fn new() -> ReachabilityConfig {
        ReachabilityConfig {
            max_variables: 23,
            verify_inclusions: true,
        }
    }

    /// A configuration that removes every candidate inclusion without verification.
    pub fn without_verification() -> ReachabilityConfig {
        ReachabilityConfig {
            verify_inclusions: false,
            ..ReachabilityConfig::new()
        }
    }
}
