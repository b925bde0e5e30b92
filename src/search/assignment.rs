//! Variable assignments: the genetic payload of an individual.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use super::config::SearchConfig;
use super::gene::generate_value;
use crate::error::Error;

/// Mapping from each free variable to a value.
///
/// Values are stored in the order of the shared name list, which is the
/// formula's free-variable order. The domain always equals that list: there
/// is no way to build an assignment with a missing or extra key.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl Assignment {
    /// Pairs `values[i]` with `names[i]`.
    ///
    /// # Errors
    ///
    /// [`Error::ArityMismatch`] if the lengths differ.
    pub fn new(names: Arc<[String]>, values: Vec<f64>) -> Result<Self, Error> {
        if names.len() != values.len() {
            return Err(Error::ArityMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// Builds an assignment from `(name, value)` pairs in any order.
    ///
    /// # Errors
    ///
    /// [`Error::AssignmentMismatch`] if the pairs do not cover `names`
    /// exactly once each.
    pub fn from_pairs<S: AsRef<str>>(
        names: Arc<[String]>,
        pairs: impl IntoIterator<Item = (S, f64)>,
    ) -> Result<Self, Error> {
        let mut values = vec![None; names.len()];
        let mut seen = Vec::new();
        let mut consistent = true;

        for (name, value) in pairs {
            let name = name.as_ref();
            seen.push(name.to_string());
            match names.iter().position(|n| n == name) {
                Some(i) if values[i].is_none() => values[i] = Some(value),
                _ => consistent = false,
            }
        }

        match values.into_iter().collect::<Option<Vec<f64>>>() {
            Some(values) if consistent => Ok(Self { names, values }),
            _ => Err(Error::AssignmentMismatch {
                expected: names.to_vec(),
                actual: seen,
            }),
        }
    }

    /// Draws every value independently.
    pub fn random<R: Rng + ?Sized>(names: Arc<[String]>, config: &SearchConfig, rng: &mut R) -> Self {
        let values = (0..names.len())
            .map(|_| generate_value(config, rng))
            .collect();
        Self { names, values }
    }

    /// Same variables, new values. `values` must match in length.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.names.len());
        Self {
            names: Arc::clone(&self.names),
            values,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Assignment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
