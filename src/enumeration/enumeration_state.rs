use crate::enumeration::{EnumerationConfig, ModelCache};
use std::collections::BTreeMap;

/// Internal state of [`crate::enumeration::TrapSpaceEnumeration`].
///
/// The integer program of the current size is cached in `model`, but it is fully determined
/// by `size` and `exclusions`. Only these plain fields are serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerationState {
    /// The current fixed-set size.
    pub size: usize,
    /// Trap spaces already found for the current size.
    pub exclusions: Vec<BTreeMap<usize, bool>>,
    /// Number of trap spaces found so far (all sizes).
    pub found: usize,
    /// Set once all sizes (down to zero) are exhausted.
    pub finished: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub model: ModelCache,
}

impl From<&EnumerationConfig> for EnumerationState {
    fn from(value: &EnumerationConfig) -> Self {
        EnumerationState {
            size: value.initial_size(),
            exclusions: Vec::new(),
            found: 0,
            finished: false,
            model: ModelCache::default(),
        }
    }
}
