//! Name → index tables for axes and buttons.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps semantic control names (e.g. `"ax1_x"`, `"start"`) to slots in a
/// session's value array.
///
/// A mapping is immutable once built; sessions replace it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: HashMap<String, usize>,
}

impl Mapping {
    /// Builds a mapping from `(name, index)` pairs. Later duplicates win.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, idx)| (name.into(), idx))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index bound to `name`, if any.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    /// Control names ordered by index (ties broken by name).
    pub fn names(&self) -> Vec<String> {
        let mut pairs: Vec<(&String, &usize)> = self.entries.iter().collect();
        pairs.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        pairs.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Iterates `(name, index)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, idx)| (name.as_str(), *idx))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Mapping::new(iter)
    }
}
