//! Binary decision variables.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Marker trait for composite variable keys.
///
/// Any cloneable, hashable, debuggable type works, typically a tuple of
/// coordinates and a value label such as `(row, col, value)`.
pub trait VariableKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync + 'static> VariableKey for T {}

/// Handle to a variable inside one [`Model`](super::Model).
///
/// Handles are dense indices in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Returns the dense index of this variable.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A binary decision variable with domain {0, 1}.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable<K> {
    key: K,
    fixed: Option<bool>,
}

impl<K: VariableKey> Variable<K> {
    pub(crate) fn new(key: K, fixed: Option<bool>) -> Self {
        Self { key, fixed }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns true if the value is pinned and excluded from cuts.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Returns the pinned value, if any.
    pub fn fixed_value(&self) -> Option<bool> {
        self.fixed
    }

    pub(crate) fn set_fixed(&mut self, value: bool) {
        self.fixed = Some(value);
    }
}
