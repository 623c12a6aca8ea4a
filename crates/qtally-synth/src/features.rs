//! Feature-name to qubit-index mapping.

use std::collections::BTreeMap;

use crate::error::{SynthError, SynthResult};

/// Ordered bijection from feature names to dense qubit indices.
///
/// Names have the form `<prefix>_<integer>`. Qubit indices follow the
/// numeric suffix, with ties broken by the full name, so `pixel_2` maps
/// below `pixel_10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureIndexMap {
    names: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl FeatureIndexMap {
    /// Build the map from a list of feature names.
    pub fn from_names<I, S>(names: I) -> SynthResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keyed = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let suffix = parse_suffix(&name)?;
                Ok((suffix, name))
            })
            .collect::<SynthResult<Vec<_>>>()?;
        keyed.sort();

        let mut index = BTreeMap::new();
        let mut ordered = Vec::with_capacity(keyed.len());
        for (i, (_, name)) in keyed.into_iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SynthError::InvalidFeatureName {
                    name,
                    reason: "duplicate feature name",
                });
            }
            ordered.push(name);
        }

        Ok(Self {
            names: ordered,
            index,
        })
    }

    /// Qubit index of a feature, if present.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Feature name at a qubit index.
    pub fn name(&self, qubit: usize) -> Option<&str> {
        self.names.get(qubit).map(String::as_str)
    }

    /// Names in qubit order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of mapped features.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(name, qubit)` pairs in qubit order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().enumerate().map(|(i, n)| (n.as_str(), i))
    }
}

fn parse_suffix(name: &str) -> SynthResult<u64> {
    let invalid = |reason| SynthError::InvalidFeatureName {
        name: name.to_string(),
        reason,
    };

    let (prefix, suffix) = name
        .rsplit_once('_')
        .ok_or_else(|| invalid("expected '<prefix>_<integer>'"))?;
    if prefix.is_empty() {
        return Err(invalid("empty prefix"));
    }
    suffix
        .parse::<u64>()
        .map_err(|_| invalid("suffix is not a non-negative integer"))
}
