// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Model Descriptions
//!
//! A model is an immutable description: the state it requires, the step functions
//! that make up one time step, its layout, and its parameters. Groups instantiate
//! models; many groups may share one description.
//!
//! ```rust
//! use spikeflow_npu_engine::NeuType;
//! use spikeflow_npu_neural::{ParameterSet, StateTemplate, StepFunction};
//!
//! let leak = StepFunction::new("leak", ["ST", "tau", "dt"], |args| {
//!     let tau = args.param_value("tau")?;
//!     let dt = args.dt()?;
//!     args.state()?.var_mut("v")?.mapv_inplace(|v| v - v / tau * dt);
//!     Ok(())
//! });
//!
//! let lif = NeuType::builder("LIF")
//!     .requires(StateTemplate::new([("v", 1.0)]).unwrap())
//!     .step(leak)
//!     .parameters(ParameterSet::new().with("tau", 10.0))
//!     .build()
//!     .unwrap();
//! assert_eq!(lif.name(), "LIF");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use spikeflow_npu_neural::{ArgSource, Layout, ParameterSet, StateTemplate, StepFunction};

use crate::error::{Result, SimError};

/// Behaviour shared by every model kind
pub trait Model: Send + Sync + fmt::Debug {
    /// Kind name used in error messages ("NeuType", "SynType")
    fn type_name(&self) -> &'static str;

    /// Validated description
    fn base(&self) -> &BaseType;

    /// This model as a neuron model, if it is one
    fn as_neu_type(&self) -> Option<&NeuType> {
        None
    }

    fn name(&self) -> &str {
        self.base().name()
    }
}

/// Validated model description shared by neuron and synapse models
#[derive(Debug, Clone)]
pub struct BaseType {
    name: String,
    requires: StateTemplate,
    steps: Vec<StepFunction>,
    vector_based: bool,
    parameters: ParameterSet,
    heter_params_replace: BTreeSet<String>,
}

impl BaseType {
    /// Check the description is internally consistent
    ///
    /// Every declared step parameter must be a run-loop keyword or a declared model
    /// parameter, and every heterogeneous parameter must be declared.
    fn validate(self) -> Result<Self> {
        let invalid = |reason: String| SimError::InvalidModel {
            model: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("model name must not be empty".to_string()));
        }
        if self.requires.is_empty() {
            return Err(invalid("requires must declare at least one ST variable".to_string()));
        }
        if self.steps.is_empty() {
            return Err(invalid("at least one step function is required".to_string()));
        }
        for step in &self.steps {
            for param in step.params() {
                if ArgSource::keyword(param).is_none() && !self.parameters.contains(param) {
                    return Err(SimError::UnknownStepParameter {
                        step: step.name().to_string(),
                        param: param.clone(),
                    });
                }
            }
        }
        if let Some(name) = self
            .heter_params_replace
            .iter()
            .find(|name| !self.parameters.contains(name))
        {
            return Err(invalid(format!(
                "heterogeneous parameter \"{name}\" is not a declared parameter"
            )));
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template of the `ST` state
    pub fn requires(&self) -> &StateTemplate {
        &self.requires
    }

    /// Step functions of one time step, in order
    pub fn steps(&self) -> &[StepFunction] {
        &self.steps
    }

    pub fn vector_based(&self) -> bool {
        self.vector_based
    }

    pub fn layout(&self) -> Layout {
        Layout::from_vector_based(self.vector_based)
    }

    /// Default parameter values
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Parameters that may take one value per unit
    pub fn heter_params_replace(&self) -> &BTreeSet<String> {
        &self.heter_params_replace
    }
}

/// Builder for [`NeuType`] and [`SynType`]
pub struct ModelBuilder<M> {
    name: String,
    requires: Option<StateTemplate>,
    steps: Vec<StepFunction>,
    vector_based: bool,
    parameters: ParameterSet,
    heter_params_replace: BTreeSet<String>,
    _kind: PhantomData<M>,
}

impl<M> ModelBuilder<M> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: None,
            steps: Vec::new(),
            vector_based: true,
            parameters: ParameterSet::new(),
            heter_params_replace: BTreeSet::new(),
            _kind: PhantomData,
        }
    }

    /// State template bound to `ST`
    pub fn requires(mut self, template: StateTemplate) -> Self {
        self.requires = Some(template);
        self
    }

    /// Append a step function
    pub fn step(mut self, step: StepFunction) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = StepFunction>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// `true` (default): variables are arrays over units; `false`: per-unit scalars
    pub fn vector_based(mut self, vector_based: bool) -> Self {
        self.vector_based = vector_based;
        self
    }

    pub fn parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Parameters groups may override with one value per unit
    pub fn heter_params_replace<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.heter_params_replace = names.into_iter().map(Into::into).collect();
        self
    }

    fn into_base(self) -> Result<BaseType> {
        let requires = match self.requires {
            Some(template) => template,
            None => {
                return Err(SimError::InvalidModel {
                    model: self.name,
                    reason: "requires must define ST".to_string(),
                })
            }
        };
        BaseType {
            name: self.name,
            requires,
            steps: self.steps,
            vector_based: self.vector_based,
            parameters: self.parameters,
            heter_params_replace: self.heter_params_replace,
        }
        .validate()
    }
}

impl ModelBuilder<NeuType> {
    pub fn build(self) -> Result<NeuType> {
        let base = self.into_base()?;
        tracing::debug!(model = %base.name, steps = base.steps.len(), "built NeuType");
        Ok(NeuType { base })
    }
}

impl ModelBuilder<SynType> {
    pub fn build(self) -> Result<SynType> {
        let base = self.into_base()?;
        tracing::debug!(model = %base.name, steps = base.steps.len(), "built SynType");
        Ok(SynType { base })
    }
}

/// Neuron model description
#[derive(Debug, Clone)]
pub struct NeuType {
    base: BaseType,
}

impl NeuType {
    pub fn builder(name: impl Into<String>) -> ModelBuilder<NeuType> {
        ModelBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn requires(&self) -> &StateTemplate {
        self.base.requires()
    }

    pub fn steps(&self) -> &[StepFunction] {
        self.base.steps()
    }

    pub fn vector_based(&self) -> bool {
        self.base.vector_based()
    }

    pub fn layout(&self) -> Layout {
        self.base.layout()
    }

    pub fn parameters(&self) -> &ParameterSet {
        self.base.parameters()
    }

    pub fn heter_params_replace(&self) -> &BTreeSet<String> {
        self.base.heter_params_replace()
    }
}

impl Model for NeuType {
    fn type_name(&self) -> &'static str {
        "NeuType"
    }

    fn base(&self) -> &BaseType {
        &self.base
    }

    fn as_neu_type(&self) -> Option<&NeuType> {
        Some(self)
    }
}

/// Synapse model description
///
/// Same shape as a neuron model; connectivity is built elsewhere.
#[derive(Debug, Clone)]
pub struct SynType {
    base: BaseType,
}

impl SynType {
    pub fn builder(name: impl Into<String>) -> ModelBuilder<SynType> {
        ModelBuilder::new(name)
    }
}

impl Model for SynType {
    fn type_name(&self) -> &'static str {
        "SynType"
    }

    fn base(&self) -> &BaseType {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> StateTemplate {
        StateTemplate::new([("v", 0.0)]).unwrap()
    }

    fn noop(params: &[&str]) -> StepFunction {
        StepFunction::new("update", params.to_vec(), |_| Ok(()))
    }

    #[test]
    fn test_builder_defaults() {
        let model = NeuType::builder("m")
            .requires(template())
            .step(noop(&["ST"]))
            .build()
            .unwrap();
        assert!(model.vector_based());
        assert_eq!(model.layout(), Layout::Vector);
        assert_eq!(model.type_name(), "NeuType");
        assert!(model.as_neu_type().is_some());
    }

    #[test]
    fn test_missing_requires_or_steps() {
        let err = NeuType::builder("m").step(noop(&["ST"])).build().unwrap_err();
        assert!(matches!(err, SimError::InvalidModel { .. }));

        let err = NeuType::builder("m").requires(template()).build().unwrap_err();
        assert!(matches!(err, SimError::InvalidModel { .. }));
    }

    #[test]
    fn test_step_names_resolve_against_parameters() {
        let err = NeuType::builder("m")
            .requires(template())
            .step(noop(&["ST", "tau"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownStepParameter { ref param, .. } if param == "tau"));

        NeuType::builder("m")
            .requires(template())
            .step(noop(&["ST", "tau", "_t_"]))
            .parameters(ParameterSet::new().with("tau", 5.0))
            .build()
            .unwrap();
    }

    #[test]
    fn test_heterogeneous_parameter_must_be_declared() {
        let err = NeuType::builder("m")
            .requires(template())
            .step(noop(&["ST"]))
            .heter_params_replace(["tau"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel { .. }));
    }

    #[test]
    fn test_syn_type_is_not_a_neu_type() {
        let syn = SynType::builder("exp_syn")
            .requires(StateTemplate::new([("g", 0.0)]).unwrap())
            .step(noop(&["ST"]))
            .build()
            .unwrap();
        assert_eq!(syn.type_name(), "SynType");
        assert!(syn.as_neu_type().is_none());
        assert_eq!(syn.name(), "exp_syn");
    }
}
