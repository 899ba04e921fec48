// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Model parameters, homogeneous or per-unit

use std::collections::BTreeMap;

use ndarray::Array1;

use super::error::{NeuralError, Result};

/// One parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Shared by every unit
    Scalar(f64),
    /// One value per unit (heterogeneous parameter)
    PerUnit(Array1<f64>),
}

impl ParamValue {
    /// Value seen by `unit`
    pub fn at(&self, unit: usize) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::PerUnit(values) => values.get(unit).copied(),
        }
    }

    /// Shared value, if homogeneous
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::PerUnit(_) => None,
        }
    }

    /// Whether this value varies per unit
    pub fn is_per_unit(&self) -> bool {
        matches!(self, ParamValue::PerUnit(_))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::PerUnit(Array1::from(v))
    }
}

impl From<Array1<f64>> for ParamValue {
    fn from(v: Array1<f64>) -> Self {
        ParamValue::PerUnit(v)
    }
}

/// Named parameter values of a model or group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply `updates` on top of these defaults for a group of `num` units
    ///
    /// Every update must name an existing parameter. Per-unit values are only
    /// accepted for names in `heterogeneous` and must carry exactly `num` entries.
    pub fn overridden(
        &self,
        updates: &ParameterSet,
        heterogeneous: &[String],
        num: usize,
    ) -> Result<ParameterSet> {
        let mut merged = self.clone();
        for (name, value) in updates.iter() {
            if !self.contains(name) {
                return Err(NeuralError::InvalidParameter {
                    name: name.to_string(),
                    reason: "not a declared model parameter".to_string(),
                });
            }
            if let ParamValue::PerUnit(values) = value {
                if !heterogeneous.iter().any(|h| h == name) {
                    return Err(NeuralError::InvalidParameter {
                        name: name.to_string(),
                        reason: "per-unit values are not allowed for this parameter".to_string(),
                    });
                }
                if values.len() != num {
                    return Err(NeuralError::InvalidParameter {
                        name: name.to_string(),
                        reason: format!("expected {num} per-unit values, got {}", values.len()),
                    });
                }
            }
            merged.values.insert(name.to_string(), value.clone());
        }
        Ok(merged)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ParameterSet {
        ParameterSet::new().with("tau", 10.0).with("v_th", 1.0)
    }

    #[test]
    fn test_override_scalar() {
        let merged = defaults()
            .overridden(&ParameterSet::new().with("tau", 20.0), &[], 4)
            .unwrap();
        assert_eq!(merged.get("tau"), Some(&ParamValue::Scalar(20.0)));
        assert_eq!(merged.get("v_th"), Some(&ParamValue::Scalar(1.0)));
    }

    #[test]
    fn test_override_unknown_name_fails() {
        let err = defaults()
            .overridden(&ParameterSet::new().with("gain", 2.0), &[], 4)
            .unwrap_err();
        assert!(matches!(err, NeuralError::InvalidParameter { ref name, .. } if name == "gain"));
    }

    #[test]
    fn test_per_unit_needs_heterogeneous_flag_and_length() {
        let update = ParameterSet::new().with("tau", vec![1.0, 2.0, 3.0]);
        assert!(defaults().overridden(&update, &[], 3).is_err());
        assert!(defaults()
            .overridden(&update, &["tau".to_string()], 4)
            .is_err());

        let merged = defaults()
            .overridden(&update, &["tau".to_string()], 3)
            .unwrap();
        let tau = merged.get("tau").unwrap();
        assert!(tau.is_per_unit());
        assert_eq!(tau.at(2), Some(3.0));
        assert_eq!(tau.at(3), None);
    }
}
